use crate::shared::blur_radius::BlurRadius;
use crate::shared::frame::Frame;

/// Domain interface for producing a blurred copy of a whole frame.
///
/// Implementations may cache kernels between calls, so they take `&self`
/// and use interior mutability for scratch buffers.
pub trait FrameBlurrer: Send {
    fn blur(&self, frame: &Frame, radius: BlurRadius) -> Frame;
}
