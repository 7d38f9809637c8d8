use crate::shared::frame::Frame;

/// Displays composited frames.
pub trait FrameSink: Send {
    /// Shows one BGR frame. The sink handles any color conversion and
    /// scaling it needs.
    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Updates the display area. Only affects later calls to `present`.
    fn resize_viewport(&mut self, _width: u32, _height: u32) {}
}
