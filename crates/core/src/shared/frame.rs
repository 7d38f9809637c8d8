use ndarray::{ArrayView3, ArrayViewMut3};

/// Channel order of a 3-channel frame.
///
/// The pipeline works in `Bgr` (the capture order). `Rgb` only appears at
/// source and sink boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorOrder {
    Bgr,
    Rgb,
}

/// A single captured frame: contiguous 8-bit samples in row-major order.
///
/// Format conversion happens at I/O boundaries only; the segmentation
/// and blurring layers treat pixel data as opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    order: ColorOrder,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        Self::with_order(data, width, height, channels, ColorOrder::Bgr, index)
    }

    pub fn with_order(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        order: ColorOrder,
        index: usize,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            order,
            index,
        }
    }

    /// Frame where every pixel has the same BGR value.
    pub fn solid(width: u32, height: u32, bgr: [u8; 3], index: usize) -> Self {
        let data = bgr
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 3)
            .collect();
        Self::new(data, width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn order(&self) -> ColorOrder {
        self.order
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns a copy with the first and third channels swapped if the
    /// requested order differs from the current one.
    pub fn to_color_order(&self, order: ColorOrder) -> Frame {
        let mut out = self.clone();
        if order != self.order && self.channels >= 3 {
            let channels = self.channels as usize;
            for px in out.data.chunks_exact_mut(channels) {
                px.swap(0, 2);
            }
            out.order = order;
        }
        out
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        let shape = self.shape();
        ArrayViewMut3::from_shape(shape, &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.order(), ColorOrder::Bgr);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::solid(2, 2, [100, 100, 100], 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_solid_repeats_pixel() {
        let frame = Frame::solid(3, 2, [1, 2, 3], 0);
        assert_eq!(frame.data().len(), 18);
        for px in frame.data().chunks_exact(3) {
            assert_eq!(px, &[1, 2, 3]);
        }
    }

    #[test]
    fn test_to_color_order_swaps_red_and_blue() {
        let frame = Frame::solid(2, 1, [10, 20, 30], 0);
        let rgb = frame.to_color_order(ColorOrder::Rgb);
        assert_eq!(rgb.order(), ColorOrder::Rgb);
        assert_eq!(rgb.data(), &[30, 20, 10, 30, 20, 10]);

        let back = rgb.to_color_order(ColorOrder::Bgr);
        assert_eq!(back, frame);
    }

    #[test]
    fn test_to_same_color_order_is_noop() {
        let frame = Frame::solid(2, 1, [10, 20, 30], 0);
        assert_eq!(frame.to_color_order(ColorOrder::Bgr), frame);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 BGR: set pixel (row=1, col=0) to blue
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_as_ndarray_mut_modification() {
        let mut frame = Frame::solid(2, 2, [0, 0, 0], 0);
        {
            let mut arr = frame.as_ndarray_mut();
            arr[[0, 1, 2]] = 128;
        }
        assert_eq!(frame.as_ndarray()[[0, 1, 2]], 128);
    }
}
