use ndarray::{Axis, Zip};

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::blur_radius::BlurRadius;
use crate::shared::frame::Frame;
use crate::shared::mask::Mask;

/// Combines the sharp frame with a blurred copy of itself using a mask.
///
/// Per sample: `(frame & alpha) | (blurred & !alpha)`. Soft mask edges make
/// this bitwise split approximate a matte; it is not true alpha blending.
pub struct BackgroundCompositor {
    blurrer: Box<dyn FrameBlurrer>,
}

impl BackgroundCompositor {
    pub fn new(blurrer: Box<dyn FrameBlurrer>) -> Self {
        Self { blurrer }
    }

    pub fn composite(&self, frame: &Frame, alpha: &Mask, radius: BlurRadius) -> Frame {
        debug_assert!(alpha.same_size(frame), "mask and frame sizes must match");
        let blurred = self.blurrer.blur(frame, radius);
        combine(frame, &blurred, alpha)
    }
}

/// Bitwise foreground/background split with the mask broadcast over channels.
pub fn combine(frame: &Frame, blurred: &Frame, alpha: &Mask) -> Frame {
    let mut out = frame.clone();
    let channels = frame.channels() as usize;
    let shape = (frame.height() as usize, frame.width() as usize, channels);
    let alpha_view = alpha.as_ndarray().insert_axis(Axis(2));
    let Some(alpha3) = alpha_view.broadcast(shape) else {
        return out;
    };

    Zip::from(out.as_ndarray_mut())
        .and(frame.as_ndarray())
        .and(blurred.as_ndarray())
        .and(alpha3)
        .for_each(|o, &sharp, &soft, &a| {
            *o = (sharp & a) | (soft & !a);
        });
    out
}
