use crate::shared::frame::Frame;
use crate::shared::source_info::SourceInfo;

/// Produces frames for the pipeline, typically from a camera.
///
/// Frames are delivered in BGR order. Implementations own the device or
/// file handles; `close` must release them and be safe to call twice.
pub trait FrameSource: Send {
    /// Acquires the device and reports the negotiated format.
    fn open(&mut self) -> Result<SourceInfo, Box<dyn std::error::Error>>;

    /// Returns the next frame, or `None` when nothing could be read.
    fn try_read_frame(&mut self) -> Option<Frame>;

    fn close(&mut self);
}
