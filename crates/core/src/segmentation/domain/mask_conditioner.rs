use crate::imaging::gaussian;
use crate::imaging::morphology::{close, dilate, open, StructuringElement};
use crate::shared::mask::Mask;

const EDGE_BLUR_KERNEL: usize = 5;
const DILATE_ITERATIONS: usize = 2;

/// Turns the smoothed mask into a hole-free, soft-edged alpha mask.
///
/// Order is fixed: close (5×5 ellipse), open (3×3 ellipse), dilate twice
/// (3×3 ellipse), then a 5×5 Gaussian blur of the edge.
pub struct MaskConditioner {
    close_element: StructuringElement,
    small_element: StructuringElement,
    edge_kernel: Vec<f32>,
}

impl MaskConditioner {
    pub fn new() -> Self {
        Self {
            close_element: StructuringElement::ellipse(5, 5),
            small_element: StructuringElement::ellipse(3, 3),
            edge_kernel: gaussian::gaussian_kernel_1d(EDGE_BLUR_KERNEL),
        }
    }

    pub fn condition(&self, smoothed: &Mask) -> Mask {
        let closed = close(smoothed, &self.close_element);
        let opened = open(&closed, &self.small_element);
        let mut alpha = dilate(&opened, &self.small_element, DILATE_ITERATIONS);

        let width = alpha.width() as usize;
        let height = alpha.height() as usize;
        let mut temp = Vec::new();
        gaussian::separable_gaussian_blur_with_kernel(
            alpha.data_mut(),
            width,
            height,
            1,
            &self.edge_kernel,
            &mut temp,
        );
        alpha
    }
}

impl Default for MaskConditioner {
    fn default() -> Self {
        Self::new()
    }
}
