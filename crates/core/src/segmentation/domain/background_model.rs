use crate::shared::frame::Frame;
use crate::shared::mask::Mask;

/// Domain interface for an adaptive per-pixel background model.
///
/// `apply` classifies the frame against the current statistics and then
/// adapts them at `learning_rate` (`1.0` rebuilds the model from this frame,
/// a negative value lets the model choose its own rate). The returned mask
/// marks foreground with 255, background with 0, and may use intermediate
/// values for uncertain classes such as shadows.
pub trait BackgroundModel: Send {
    fn apply(&mut self, frame: &Frame, learning_rate: f64) -> Mask;

    /// Discards all learned statistics.
    fn reset(&mut self);

    /// Frames observed since construction or the last reset.
    fn frames_seen(&self) -> usize;
}
