use ndarray::{ArrayView2, ArrayViewMut2};

use crate::shared::frame::Frame;

/// Single-channel coverage grid. `255` is fully foreground, `0` is background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Mask {
    pub fn new_filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            data: vec![value; (width as usize) * (height as usize)],
            width,
            height,
        }
    }

    pub fn zeros(width: u32, height: u32) -> Self {
        Self::new_filled(width, height, 0)
    }

    /// Empty mask with the same dimensions as `frame`.
    pub fn zeros_like(frame: &Frame) -> Self {
        Self::zeros(frame.width(), frame.height())
    }

    /// Wraps raw samples. Returns `None` if the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        let w = self.width as usize;
        self.data[(y as usize) * w + x as usize] = value;
    }

    pub fn same_size(&self, frame: &Frame) -> bool {
        self.width == frame.width() && self.height == frame.height()
    }

    /// Fraction of samples that are non-zero.
    pub fn coverage(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let on = self.data.iter().filter(|&&v| v > 0).count();
        on as f64 / self.data.len() as f64
    }

    pub fn as_ndarray(&self) -> ArrayView2<'_, u8> {
        ArrayView2::from_shape(self.shape(), &self.data)
            .expect("Mask data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut2<'_, u8> {
        let shape = self.shape();
        ArrayViewMut2::from_shape(shape, &mut self.data)
            .expect("Mask data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        assert!(Mask::from_raw(2, 2, vec![0; 3]).is_none());
        assert!(Mask::from_raw(2, 2, vec![0; 4]).is_some());
    }

    #[test]
    fn test_get_set_row_major() {
        let mut mask = Mask::zeros(3, 2);
        mask.set(2, 1, 200);
        assert_eq!(mask.get(2, 1), 200);
        assert_eq!(mask.data()[5], 200);
        assert_eq!(mask.as_ndarray()[[1, 2]], 200);
    }

    #[test]
    fn test_zeros_like_matches_frame() {
        let frame = Frame::solid(7, 5, [0, 0, 0], 0);
        let mask = Mask::zeros_like(&frame);
        assert!(mask.same_size(&frame));
        assert!(mask.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_coverage() {
        let mut mask = Mask::zeros(2, 2);
        assert_eq!(mask.coverage(), 0.0);
        mask.set(0, 0, 1);
        assert!((mask.coverage() - 0.25).abs() < f64::EPSILON);
    }
}
