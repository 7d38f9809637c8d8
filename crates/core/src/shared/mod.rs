pub mod blur_radius;
pub mod constants;
pub mod errors;
pub mod frame;
pub mod mask;
pub mod source_info;
