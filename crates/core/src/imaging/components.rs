use std::collections::VecDeque;

use crate::shared::mask::Mask;

const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One filled external shape: its pixels, including any enclosed holes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    pub pixels: Vec<usize>,
}

impl Shape {
    pub fn area(&self) -> usize {
        self.pixels.len()
    }
}

/// Finds the filled external shapes of a mask.
///
/// Foreground is 8-connected and background 4-connected. Background not
/// reachable from the image border is a hole and belongs to the shape that
/// encloses it, together with anything nested inside the hole.
pub fn filled_shapes(mask: &Mask) -> Vec<Shape> {
    let w = mask.width() as usize;
    let h = mask.height() as usize;
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let outside = outside_background(mask);
    let mut visited = outside.clone();
    let mut shapes = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..w * h {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);
        let mut pixels = Vec::new();
        while let Some(idx) = queue.pop_front() {
            pixels.push(idx);
            for next in neighbors(idx, w, h, &NEIGHBORS_8) {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        shapes.push(Shape { pixels });
    }
    shapes
}

/// Keeps shapes whose filled area is at least `min_area`, drawn solid at 255.
pub fn filter_small_components(mask: &Mask, min_area: usize) -> Mask {
    let mut out = Mask::zeros(mask.width(), mask.height());
    let shapes = filled_shapes(mask);
    let data = out.data_mut();
    for shape in shapes.iter().filter(|s| s.area() >= min_area) {
        for &idx in &shape.pixels {
            data[idx] = 255;
        }
    }
    out
}

/// Flags background pixels 4-connected to the image border.
fn outside_background(mask: &Mask) -> Vec<bool> {
    let w = mask.width() as usize;
    let h = mask.height() as usize;
    let data = mask.data();
    let mut outside = vec![false; w * h];
    let mut queue = VecDeque::new();

    let border = (0..w)
        .flat_map(|x| [x, (h - 1) * w + x])
        .chain((0..h).flat_map(|y| [y * w, y * w + w - 1]));
    for idx in border {
        if data[idx] == 0 && !outside[idx] {
            outside[idx] = true;
            queue.push_back(idx);
        }
    }

    while let Some(idx) = queue.pop_front() {
        for next in neighbors(idx, w, h, &NEIGHBORS_4) {
            if data[next] == 0 && !outside[next] {
                outside[next] = true;
                queue.push_back(next);
            }
        }
    }
    outside
}

fn neighbors<'a>(
    idx: usize,
    w: usize,
    h: usize,
    offsets: &'a [(isize, isize)],
) -> impl Iterator<Item = usize> + 'a {
    let x = (idx % w) as isize;
    let y = (idx / w) as isize;
    offsets.iter().filter_map(move |&(dx, dy)| {
        let nx = x + dx;
        let ny = y + dy;
        if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
            None
        } else {
            Some(ny as usize * w + nx as usize)
        }
    })
}
