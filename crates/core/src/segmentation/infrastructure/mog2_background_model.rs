use crate::segmentation::domain::background_model::BackgroundModel;
use crate::shared::constants::{BACKGROUND_RATIO, HISTORY_FRAMES, MIXTURE_COUNT, VARIANCE_THRESHOLD};
use crate::shared::frame::Frame;
use crate::shared::mask::Mask;

/// Tuning for [`Mog2BackgroundModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct Mog2Params {
    /// Frames used to derive the automatic learning rate.
    pub history: usize,
    /// Max Gaussian modes kept per pixel.
    pub n_mixtures: usize,
    /// Squared Mahalanobis distance under which a sample is background.
    pub var_threshold: f32,
    /// Squared distance under which a sample updates an existing mode.
    pub var_threshold_gen: f32,
    /// Cumulative weight of the modes that describe the background.
    pub background_ratio: f32,
    pub var_init: f32,
    pub var_min: f32,
    pub var_max: f32,
    /// Weight decay that prunes unsupported modes.
    pub complexity_reduction: f32,
    pub detect_shadows: bool,
    pub shadow_value: u8,
    /// Darkest brightness ratio still counted as a shadow.
    pub shadow_threshold: f32,
}

impl Default for Mog2Params {
    fn default() -> Self {
        Self {
            history: HISTORY_FRAMES,
            n_mixtures: MIXTURE_COUNT,
            var_threshold: VARIANCE_THRESHOLD,
            var_threshold_gen: 9.0,
            background_ratio: BACKGROUND_RATIO,
            var_init: 15.0,
            var_min: 4.0,
            var_max: 75.0,
            complexity_reduction: 0.05,
            detect_shadows: true,
            shadow_value: 127,
            shadow_threshold: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Mode {
    weight: f32,
    variance: f32,
    mean: [f32; 3],
}

/// Gaussian-mixture background subtractor with shadow detection.
///
/// Each pixel keeps up to `n_mixtures` weighted modes (colour mean plus one
/// shared variance) sorted by weight. The heaviest modes whose weights sum
/// to `background_ratio` describe the background. Storage is sized lazily
/// from the first frame and rebuilt if the frame size changes.
pub struct Mog2BackgroundModel {
    params: Mog2Params,
    width: u32,
    height: u32,
    modes: Vec<Mode>,
    modes_used: Vec<u8>,
    frames_seen: usize,
}

impl Mog2BackgroundModel {
    pub fn new(params: Mog2Params) -> Self {
        Self {
            params,
            width: 0,
            height: 0,
            modes: Vec::new(),
            modes_used: Vec::new(),
            frames_seen: 0,
        }
    }

    pub fn params(&self) -> &Mog2Params {
        &self.params
    }

    fn ensure_storage(&mut self, frame: &Frame) {
        if self.width == frame.width()
            && self.height == frame.height()
            && !self.modes_used.is_empty()
        {
            return;
        }
        log::debug!(
            "Allocating background model for {}x{} frames",
            frame.width(),
            frame.height()
        );
        let pixels = frame.pixel_count();
        self.width = frame.width();
        self.height = frame.height();
        self.modes = vec![Mode::default(); pixels * self.params.n_mixtures];
        self.modes_used = vec![0; pixels];
        self.frames_seen = 0;
    }
}

impl Default for Mog2BackgroundModel {
    fn default() -> Self {
        Self::new(Mog2Params::default())
    }
}

impl BackgroundModel for Mog2BackgroundModel {
    fn apply(&mut self, frame: &Frame, learning_rate: f64) -> Mask {
        self.ensure_storage(frame);
        self.frames_seen += 1;

        let rate = (if learning_rate >= 0.0 {
            learning_rate
        } else {
            auto_learning_rate(self.frames_seen, self.params.history)
        }) as f32;

        let channels = frame.channels() as usize;
        let used_channels = channels.min(3);
        let n_mix = self.params.n_mixtures;
        let mut mask = Mask::zeros_like(frame);
        let out = mask.data_mut();

        for (i, px) in frame.data().chunks_exact(channels).enumerate() {
            let mut sample = [0.0f32; 3];
            for c in 0..used_channels {
                sample[c] = px[c] as f32;
            }
            let modes = &mut self.modes[i * n_mix..(i + 1) * n_mix];
            out[i] = update_pixel(
                modes,
                &mut self.modes_used[i],
                &sample[..used_channels],
                rate,
                &self.params,
            );
        }
        mask
    }

    fn reset(&mut self) {
        self.modes.clear();
        self.modes_used.clear();
        self.width = 0;
        self.height = 0;
        self.frames_seen = 0;
    }

    fn frames_seen(&self) -> usize {
        self.frames_seen
    }
}

/// Rate used when the caller asks for automatic adaptation.
pub fn auto_learning_rate(frames_seen: usize, history: usize) -> f64 {
    1.0 / (2 * frames_seen).min(history).max(1) as f64
}

fn squared_distance(mean: &[f32; 3], sample: &[f32]) -> f32 {
    sample
        .iter()
        .zip(mean.iter())
        .map(|(&s, &m)| (m - s) * (m - s))
        .sum()
}

/// Classifies one sample, then updates that pixel's modes in place.
fn update_pixel(
    modes: &mut [Mode],
    used: &mut u8,
    sample: &[f32],
    alpha: f32,
    p: &Mog2Params,
) -> u8 {
    let keep = 1.0 - alpha;
    let prune = -alpha * p.complexity_reduction;
    let n_mix = modes.len();
    let mut n = *used as usize;

    let mut background = false;
    let mut fits = false;
    let mut total_weight = 0.0f32;

    for mode in 0..n {
        let mut weight = keep * modes[mode].weight + prune;
        let mut slot = mode;

        if !fits {
            let var = modes[mode].variance;
            let dist2 = squared_distance(&modes[mode].mean, sample);

            if total_weight < p.background_ratio && dist2 < p.var_threshold * var {
                background = true;
            }

            if dist2 < p.var_threshold_gen * var {
                fits = true;
                weight += alpha;
                let k = alpha / weight;
                let m = &mut modes[mode];
                for (mean, &s) in m.mean.iter_mut().zip(sample) {
                    *mean -= k * (*mean - s);
                }
                m.variance = (var + k * (dist2 - var)).clamp(p.var_min, p.var_max);

                // Keep modes sorted by weight; earlier slots already hold updated weights.
                while slot > 0 && weight >= modes[slot - 1].weight {
                    modes.swap(slot, slot - 1);
                    slot -= 1;
                }
            }
        }

        if weight < -prune {
            weight = 0.0;
        }
        modes[slot].weight = weight;
        total_weight += weight;
    }

    // Drop pruned modes, preserving order.
    let mut kept = 0;
    for mode in 0..n {
        if modes[mode].weight > 0.0 {
            modes[kept] = modes[mode];
            kept += 1;
        }
    }
    n = kept;

    if total_weight > 0.0 {
        for m in &mut modes[..n] {
            m.weight /= total_weight;
        }
    }

    if !fits && alpha > 0.0 {
        let slot = if n == n_mix {
            n_mix - 1
        } else {
            n += 1;
            n - 1
        };
        if n == 1 {
            modes[slot].weight = 1.0;
        } else {
            modes[slot].weight = alpha;
            for m in &mut modes[..n - 1] {
                m.weight *= keep;
            }
        }
        let mut mean = [0.0f32; 3];
        mean[..sample.len()].copy_from_slice(sample);
        modes[slot].mean = mean;
        modes[slot].variance = p.var_init;

        let mut i = slot;
        while i > 0 && alpha >= modes[i - 1].weight {
            modes.swap(i, i - 1);
            i -= 1;
        }
    }

    *used = n as u8;

    if background {
        0
    } else if p.detect_shadows && is_shadow(&modes[..n], sample, p) {
        p.shadow_value
    } else {
        255
    }
}

/// A sample is a shadow when it is a darker scaled copy of a background mode.
fn is_shadow(modes: &[Mode], sample: &[f32], p: &Mog2Params) -> bool {
    let mut cumulative = 0.0f32;
    for m in modes {
        let mut numerator = 0.0f32;
        let mut denominator = 0.0f32;
        for (&mean, &s) in m.mean.iter().zip(sample) {
            numerator += mean * s;
            denominator += mean * mean;
        }
        if denominator == 0.0 {
            return false;
        }

        if numerator <= denominator && numerator >= p.shadow_threshold * denominator {
            let a = numerator / denominator;
            let dist2a: f32 = m
                .mean
                .iter()
                .zip(sample)
                .map(|(&mean, &s)| (a * mean - s) * (a * mean - s))
                .sum();
            if dist2a < p.var_threshold * m.variance * a * a {
                return true;
            }
        }

        cumulative += m.weight;
        if cumulative > p.background_ratio {
            return false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::{LEARNING_RATE, SEED_LEARNING_RATE};
    use approx::assert_relative_eq;

    const GREY: [u8; 3] = [100, 100, 100];

    fn seeded(frame: &Frame) -> Mog2BackgroundModel {
        let mut model = Mog2BackgroundModel::default();
        model.apply(frame, SEED_LEARNING_RATE);
        model
    }

    #[test]
    fn test_first_frame_has_no_background() {
        let mut model = Mog2BackgroundModel::default();
        let mask = model.apply(&Frame::solid(8, 6, GREY, 0), SEED_LEARNING_RATE);
        assert_eq!((mask.width(), mask.height()), (8, 6));
        assert!(mask.data().iter().all(|&v| v != 0));
        assert_eq!(model.frames_seen(), 1);
    }

    #[test]
    fn test_black_seed_frame_is_full_foreground() {
        let mut model = Mog2BackgroundModel::default();
        let mask = model.apply(&Frame::solid(4, 4, [0, 0, 0], 0), SEED_LEARNING_RATE);
        assert!(mask.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_static_scene_becomes_background() {
        let frame = Frame::solid(8, 6, GREY, 0);
        let mut model = seeded(&frame);
        for _ in 0..4 {
            let mask = model.apply(&frame, LEARNING_RATE);
            assert!(mask.data().iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_new_object_is_foreground() {
        let background = Frame::solid(10, 10, [40, 60, 200], 0);
        let mut model = seeded(&background);
        model.apply(&background, LEARNING_RATE);

        let mut frame = background.clone();
        for y in 2..5 {
            for x in 2..5 {
                let idx = (y * 10 + x) * 3;
                frame.data_mut()[idx..idx + 3].copy_from_slice(&[220, 230, 20]);
            }
        }
        let mask = model.apply(&frame, LEARNING_RATE);
        assert_eq!(mask.get(3, 3), 255);
        assert_eq!(mask.get(8, 8), 0);
    }

    #[test]
    fn test_darker_copy_of_background_is_shadow() {
        let background = Frame::solid(4, 4, GREY, 0);
        let mut model = seeded(&background);
        model.apply(&background, LEARNING_RATE);

        let mask = model.apply(&Frame::solid(4, 4, [60, 60, 60], 0), LEARNING_RATE);
        assert!(mask.data().iter().all(|&v| v == 127));
    }

    #[test]
    fn test_shadow_detection_can_be_disabled() {
        let params = Mog2Params {
            detect_shadows: false,
            ..Mog2Params::default()
        };
        let background = Frame::solid(4, 4, GREY, 0);
        let mut model = Mog2BackgroundModel::new(params);
        model.apply(&background, SEED_LEARNING_RATE);

        let mask = model.apply(&Frame::solid(4, 4, [60, 60, 60], 0), LEARNING_RATE);
        assert!(mask.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_reset_discards_statistics() {
        let frame = Frame::solid(6, 6, GREY, 0);
        let mut model = seeded(&frame);
        assert!(model.apply(&frame, LEARNING_RATE).data().iter().all(|&v| v == 0));

        model.reset();
        assert_eq!(model.frames_seen(), 0);

        let mask = model.apply(&frame, SEED_LEARNING_RATE);
        assert!(mask.data().iter().all(|&v| v != 0));
    }

    #[test]
    fn test_frame_size_change_reallocates() {
        let mut model = seeded(&Frame::solid(6, 6, GREY, 0));
        let mask = model.apply(&Frame::solid(3, 2, GREY, 1), SEED_LEARNING_RATE);
        assert_eq!((mask.width(), mask.height()), (3, 2));
        assert_eq!(model.frames_seen(), 1);
    }

    #[test]
    fn test_mode_weights_stay_normalised_while_growing() {
        let mut model = Mog2BackgroundModel::default();
        for (i, v) in [10u8, 60, 110, 160].iter().enumerate() {
            model.apply(&Frame::solid(1, 1, [*v, *v, *v], i), 0.2);
        }
        assert_eq!(model.modes_used[0], 4);
        let modes = &model.modes[..4];
        let weights: f32 = modes.iter().map(|m| m.weight).sum();
        assert_relative_eq!(weights, 1.0, epsilon = 1e-4);
        assert!(modes.windows(2).all(|w| w[0].weight >= w[1].weight));
    }

    #[test]
    fn test_mode_count_bounded_by_mixtures() {
        let mut model = Mog2BackgroundModel::default();
        for (i, v) in [10u8, 60, 110, 160, 210, 250, 30].iter().enumerate() {
            model.apply(&Frame::solid(1, 1, [*v, *v, *v], i), 0.2);
        }
        assert_eq!(model.modes_used[0] as usize, model.params().n_mixtures);
    }

    #[test]
    fn test_negative_rate_follows_auto_schedule() {
        let frames: Vec<Frame> = [GREY, GREY, [180, 40, 90], GREY, GREY]
            .iter()
            .enumerate()
            .map(|(i, &bgr)| Frame::solid(4, 3, bgr, i))
            .collect();

        let mut auto = Mog2BackgroundModel::default();
        let mut explicit = Mog2BackgroundModel::default();
        for (n, frame) in frames.iter().enumerate() {
            let rate = auto_learning_rate(n + 1, explicit.params().history);
            assert_eq!(auto.apply(frame, -1.0), explicit.apply(frame, rate));
        }
        let weights =
            |m: &Mog2BackgroundModel| m.modes.iter().map(|mode| mode.weight).collect::<Vec<_>>();
        assert_eq!(weights(&auto), weights(&explicit));
        assert_eq!(auto.frames_seen(), frames.len());
    }

    #[test]
    fn test_auto_learning_rate() {
        assert_relative_eq!(auto_learning_rate(1, 60), 0.5);
        assert_relative_eq!(auto_learning_rate(10, 60), 0.05);
        assert_relative_eq!(auto_learning_rate(1000, 60), 1.0 / 60.0);
    }
}
