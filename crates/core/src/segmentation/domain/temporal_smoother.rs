use ndarray::Zip;

use crate::shared::constants::{CURRENT_MASK_WEIGHT, PREVIOUS_MASK_WEIGHT};
use crate::shared::mask::Mask;

/// Per-pixel weighted blend of the current mask with the previous one.
///
/// Formula: `out = current_weight * refined + previous_weight * previous`,
/// rounded and saturated to a byte. Default weights: 0.7 / 0.3.
pub struct TemporalSmoother {
    current_weight: f32,
    previous_weight: f32,
}

impl TemporalSmoother {
    pub fn new(current_weight: f32, previous_weight: f32) -> Self {
        Self {
            current_weight,
            previous_weight,
        }
    }

    pub fn smooth(&self, refined: &Mask, previous: &Mask) -> Mask {
        debug_assert_eq!(
            (refined.width(), refined.height()),
            (previous.width(), previous.height()),
            "masks must have equal dimensions"
        );
        let mut out = refined.clone();
        Zip::from(out.as_ndarray_mut())
            .and(refined.as_ndarray())
            .and(previous.as_ndarray())
            .for_each(|o, &cur, &prev| {
                let v = self.current_weight * cur as f32 + self.previous_weight * prev as f32;
                *o = v.round().clamp(0.0, 255.0) as u8;
            });
        out
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(CURRENT_MASK_WEIGHT, PREVIOUS_MASK_WEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn expected(cur: u8, prev: u8) -> f64 {
        0.7 * cur as f64 + 0.3 * prev as f64
    }

    #[rstest]
    #[case::both_zero(0, 0)]
    #[case::current_only(255, 0)]
    #[case::previous_only(0, 255)]
    #[case::both_full(255, 255)]
    #[case::mixed(100, 200)]
    #[case::odd_values(13, 77)]
    fn test_blend_formula_within_rounding(#[case] cur: u8, #[case] prev: u8) {
        let smoother = TemporalSmoother::default();
        let out = smoother.smooth(&Mask::new_filled(3, 3, cur), &Mask::new_filled(3, 3, prev));
        for &v in out.data() {
            assert!((v as f64 - expected(cur, prev)).abs() <= 1.0);
        }
    }

    #[test]
    fn test_pointwise_over_varied_masks() {
        let refined = Mask::from_raw(4, 1, vec![0, 255, 128, 10]).unwrap();
        let previous = Mask::from_raw(4, 1, vec![255, 0, 64, 250]).unwrap();
        let out = TemporalSmoother::default().smooth(&refined, &previous);
        for i in 0..4 {
            let want = expected(refined.data()[i], previous.data()[i]);
            assert!((out.data()[i] as f64 - want).abs() <= 1.0);
        }
        assert_eq!((out.width(), out.height()), (4, 1));
    }

    #[test]
    fn test_repeated_smoothing_decays_towards_current() {
        let smoother = TemporalSmoother::default();
        let current = Mask::zeros(2, 2);
        let mut previous = Mask::new_filled(2, 2, 255);
        for _ in 0..6 {
            previous = smoother.smooth(&current, &previous);
        }
        assert!(previous.data().iter().all(|&v| v <= 1));
    }
}
