use crate::imaging::color::hsv_in_range;
use crate::imaging::components::filter_small_components;
use crate::imaging::morphology::{close, StructuringElement};
use crate::imaging::threshold::union;
use crate::shared::constants::{MIN_COMPONENT_AREA, SKIN_HSV_LOWER, SKIN_HSV_UPPER};
use crate::shared::frame::Frame;
use crate::shared::mask::Mask;

/// Recovers subject pixels the background model missed and drops noise.
///
/// Steps: skin-tone detection in HSV, union with the raw foreground,
/// elliptical close, then removal of shapes smaller than `min_area`.
/// Deterministic for identical inputs.
pub struct MaskRefiner {
    skin_lower: [u8; 3],
    skin_upper: [u8; 3],
    close_element: StructuringElement,
    min_area: usize,
}

impl MaskRefiner {
    pub fn new(skin_lower: [u8; 3], skin_upper: [u8; 3], min_area: usize) -> Self {
        Self {
            skin_lower,
            skin_upper,
            close_element: StructuringElement::ellipse(5, 5),
            min_area,
        }
    }

    pub fn refine(&self, frame: &Frame, raw: &Mask) -> Mask {
        debug_assert!(raw.same_size(frame), "mask and frame sizes must match");
        let skin = hsv_in_range(frame, self.skin_lower, self.skin_upper);
        let combined = union(raw, &skin);
        let closed = close(&combined, &self.close_element);
        filter_small_components(&closed, self.min_area)
    }
}

impl Default for MaskRefiner {
    fn default() -> Self {
        Self::new(SKIN_HSV_LOWER, SKIN_HSV_UPPER, MIN_COMPONENT_AREA)
    }
}
