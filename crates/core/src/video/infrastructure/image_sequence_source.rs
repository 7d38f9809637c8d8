use std::path::{Path, PathBuf};

use crate::shared::frame::{ColorOrder, Frame};
use crate::shared::source_info::SourceInfo;
use crate::video::domain::frame_source::FrameSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Adapts a directory of still images to the [`FrameSource`] interface.
///
/// Files are read in name order and decoded with the `image` crate.
/// Every frame must match the size of the first image; a mismatch or a
/// decode error is reported as a failed read. With `looping` enabled the
/// sequence restarts after the last file, which stands in for a camera
/// that never runs dry.
pub struct ImageSequenceSource {
    dir: PathBuf,
    fps: f64,
    looping: bool,
    paths: Vec<PathBuf>,
    cursor: usize,
    size: Option<(u32, u32)>,
    frames_read: usize,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>, fps: f64, looping: bool) -> Self {
        Self {
            dir: dir.into(),
            fps,
            looping,
            paths: Vec::new(),
            cursor: 0,
            size: None,
            frames_read: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.size.is_some()
    }

    fn list_images(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn decode(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        if let Some(expected) = self.size {
            if expected != (width, height) {
                return Err(format!(
                    "{} is {width}x{height}, expected {}x{}",
                    path.display(),
                    expected.0,
                    expected.1
                )
                .into());
            }
        }
        let rgb = Frame::with_order(
            img.into_raw(),
            width,
            height,
            3,
            ColorOrder::Rgb,
            self.frames_read,
        );
        Ok(rgb.to_color_order(ColorOrder::Bgr))
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<SourceInfo, Box<dyn std::error::Error>> {
        let paths = Self::list_images(&self.dir)?;
        let first = paths
            .first()
            .ok_or_else(|| format!("no images found in {}", self.dir.display()))?;
        let (width, height) = image::image_dimensions(first)?;

        self.paths = paths;
        self.cursor = 0;
        self.frames_read = 0;
        self.size = Some((width, height));

        log::debug!(
            "Opened {} images ({width}x{height}) from {}",
            self.paths.len(),
            self.dir.display()
        );

        Ok(SourceInfo {
            width,
            height,
            fps: self.fps,
            name: self.dir.display().to_string(),
        })
    }

    fn try_read_frame(&mut self) -> Option<Frame> {
        if self.size.is_none() {
            return None;
        }
        if self.cursor >= self.paths.len() {
            if !self.looping {
                return None;
            }
            self.cursor = 0;
        }

        let path = self.paths[self.cursor].clone();
        self.cursor += 1;
        match self.decode(&path) {
            Ok(frame) => {
                self.frames_read += 1;
                Some(frame)
            }
            Err(e) => {
                log::warn!("Failed to read frame from {}: {e}", path.display());
                None
            }
        }
    }

    fn close(&mut self) {
        self.paths.clear();
        self.cursor = 0;
        self.size = None;
        self.frames_read = 0;
    }
}
