use std::path::PathBuf;

use crate::shared::frame::{ColorOrder, Frame};
use crate::video::domain::frame_sink::FrameSink;

/// Presents frames by writing numbered PNG files with the `image` crate.
///
/// When a viewport is set, each frame is scaled to fit inside it with the
/// aspect ratio preserved.
pub struct ImageFileSink {
    dir: PathBuf,
    viewport: Option<(u32, u32)>,
    presented: usize,
}

impl ImageFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            viewport: None,
            presented: 0,
        }
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    pub fn presented(&self) -> usize {
        self.presented
    }

    pub fn path_for(&self, n: usize) -> PathBuf {
        self.dir.join(format!("frame_{n:06}.png"))
    }
}

/// Largest size with the source aspect ratio that fits in the viewport.
pub fn fit_within(width: u32, height: u32, viewport: (u32, u32)) -> (u32, u32) {
    let (vw, vh) = viewport;
    if width == 0 || height == 0 || vw == 0 || vh == 0 {
        return (width, height);
    }
    let scale = (vw as f64 / width as f64).min(vh as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, vw);
    let h = ((height as f64 * scale).round() as u32).clamp(1, vh);
    (w, h)
}

impl FrameSink for ImageFileSink {
    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.dir)?;

        let rgb = frame.to_color_order(ColorOrder::Rgb);
        let img = image::RgbImage::from_raw(rgb.width(), rgb.height(), rgb.into_data())
            .ok_or("Failed to create image from frame data")?;

        let img = match self.viewport {
            Some(viewport) => {
                let (w, h) = fit_within(img.width(), img.height(), viewport);
                if (w, h) == img.dimensions() {
                    img
                } else {
                    image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle)
                }
            }
            None => img,
        };

        img.save(self.path_for(self.presented))?;
        self.presented += 1;
        Ok(())
    }

    fn resize_viewport(&mut self, width: u32, height: u32) {
        log::debug!("Viewport resized to {width}x{height}");
        self.viewport = Some((width, height));
    }
}
