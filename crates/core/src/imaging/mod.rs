//! Pixel-level operations shared by the segmentation stages.

pub mod color;
pub mod components;
pub mod gaussian;
pub mod morphology;
pub mod threshold;
