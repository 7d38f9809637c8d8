use crate::shared::mask::Mask;

/// Binary structuring element with its anchor at the centre.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuringElement {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl StructuringElement {
    /// Raster ellipse inscribed in a `width × height` box.
    ///
    /// `3×3` yields a cross; `5×5` yields a square with its four corners cut.
    pub fn ellipse(width: usize, height: usize) -> Self {
        let mut cells = vec![false; width * height];
        let r = (height / 2) as f64;
        let c = (width / 2) as f64;
        let inv_r2 = if r > 0.0 { 1.0 / (r * r) } else { 0.0 };

        for i in 0..height {
            let dy = i as f64 - r;
            if dy.abs() > r {
                continue;
            }
            let dx = (c * ((r * r - dy * dy) * inv_r2).sqrt()).round();
            let j1 = (c - dx).max(0.0) as usize;
            let j2 = ((c + dx + 1.0) as usize).min(width);
            for j in j1..j2 {
                cells[i * width + j] = true;
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.width + col]
    }

    /// Offsets `(dx, dy)` of the active cells relative to the anchor.
    fn offsets(&self) -> Vec<(isize, isize)> {
        let ax = (self.width / 2) as isize;
        let ay = (self.height / 2) as isize;
        let mut offsets = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                if self.contains(row, col) {
                    offsets.push((col as isize - ax, row as isize - ay));
                }
            }
        }
        offsets
    }
}

#[derive(Clone, Copy)]
enum Extremum {
    Max,
    Min,
}

/// One min/max filter pass. Samples outside the mask are ignored.
fn rank_pass(src: &Mask, offsets: &[(isize, isize)], op: Extremum) -> Mask {
    let w = src.width() as isize;
    let h = src.height() as isize;
    let data = src.data();
    let mut out = src.clone();
    let dst = out.data_mut();

    for y in 0..h {
        for x in 0..w {
            let mut acc = match op {
                Extremum::Max => 0u8,
                Extremum::Min => 255u8,
            };
            for &(dx, dy) in offsets {
                let sx = x + dx;
                let sy = y + dy;
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                let v = data[(sy * w + sx) as usize];
                acc = match op {
                    Extremum::Max => acc.max(v),
                    Extremum::Min => acc.min(v),
                };
            }
            dst[(y * w + x) as usize] = acc;
        }
    }
    out
}

pub fn dilate(mask: &Mask, element: &StructuringElement, iterations: usize) -> Mask {
    let offsets = element.offsets();
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = rank_pass(&out, &offsets, Extremum::Max);
    }
    out
}

pub fn erode(mask: &Mask, element: &StructuringElement, iterations: usize) -> Mask {
    let offsets = element.offsets();
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = rank_pass(&out, &offsets, Extremum::Min);
    }
    out
}

/// Dilation followed by erosion: fills gaps narrower than the element.
pub fn close(mask: &Mask, element: &StructuringElement) -> Mask {
    erode(&dilate(mask, element, 1), element, 1)
}

/// Erosion followed by dilation: removes specks smaller than the element.
pub fn open(mask: &Mask, element: &StructuringElement) -> Mask {
    dilate(&erode(mask, element, 1), element, 1)
}
