use std::cell::RefCell;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::imaging::gaussian;
use crate::shared::blur_radius::BlurRadius;
use crate::shared::frame::Frame;

/// Kernels derived from one blur radius, rebuilt only when the radius changes.
struct KernelSet {
    radius: BlurRadius,
    kernel: Vec<f32>,
    scale: usize,
    small_kernel: Vec<f32>,
}

impl KernelSet {
    fn new(radius: BlurRadius) -> Self {
        let kernel_size = radius.get();
        let scale = (kernel_size / 50).max(1);
        let small_k = (kernel_size / scale) | 1; // ensure odd
        Self {
            radius,
            kernel: gaussian::gaussian_kernel_1d(kernel_size),
            scale,
            small_kernel: gaussian::gaussian_kernel_1d(small_k),
        }
    }
}

/// CPU whole-frame blurrer using separable Gaussian blur.
///
/// Kernels of 100 or more samples are applied on a downscaled copy and
/// upscaled back, which keeps the widest slider positions within a tick.
pub struct CpuGaussianBlurrer {
    kernels: RefCell<Option<KernelSet>>,
    blur_temp: RefCell<Vec<f32>>,
}

impl CpuGaussianBlurrer {
    pub fn new() -> Self {
        Self {
            kernels: RefCell::new(None),
            blur_temp: RefCell::new(Vec::new()),
        }
    }
}

impl Default for CpuGaussianBlurrer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBlurrer for CpuGaussianBlurrer {
    fn blur(&self, frame: &Frame, radius: BlurRadius) -> Frame {
        let mut kernels = self.kernels.borrow_mut();
        if kernels.as_ref().map_or(true, |k| k.radius != radius) {
            log::debug!("Building Gaussian kernels for radius {radius}");
            *kernels = Some(KernelSet::new(radius));
        }
        let Some(set) = kernels.as_ref() else {
            return frame.clone();
        };

        let mut out = frame.clone();
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let channels = frame.channels() as usize;
        let mut temp = self.blur_temp.borrow_mut();
        gaussian::blur_in_place(
            out.data_mut(),
            width,
            height,
            channels,
            &set.kernel,
            &set.small_kernel,
            set.scale,
            &mut temp,
        );
        out
    }
}
