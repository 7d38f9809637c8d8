pub mod blurring;
pub mod imaging;
pub mod pipeline;
pub mod segmentation;
pub mod shared;
pub mod video;
