use crate::shared::mask::Mask;

/// Binarises a mask: samples strictly above `threshold` become 255, the rest 0.
pub fn threshold_binary(mask: &Mask, threshold: u8) -> Mask {
    let mut out = mask.clone();
    for v in out.data_mut() {
        *v = if *v > threshold { 255 } else { 0 };
    }
    out
}

/// Per-sample logical OR of two binary masks of equal size.
pub fn union(a: &Mask, b: &Mask) -> Mask {
    debug_assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    let mut out = a.clone();
    for (o, &other) in out.data_mut().iter_mut().zip(b.data()) {
        *o |= other;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let mask = Mask::from_raw(4, 1, vec![127, 250, 251, 255]).unwrap();
        let out = threshold_binary(&mask, 250);
        assert_eq!(out.data(), &[0, 0, 255, 255]);
    }

    #[test]
    fn test_union_combines_masks() {
        let a = Mask::from_raw(3, 1, vec![255, 0, 0]).unwrap();
        let b = Mask::from_raw(3, 1, vec![0, 255, 0]).unwrap();
        assert_eq!(union(&a, &b).data(), &[255, 255, 0]);
    }
}
