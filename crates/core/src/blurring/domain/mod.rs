pub mod background_compositor;
pub mod frame_blurrer;
