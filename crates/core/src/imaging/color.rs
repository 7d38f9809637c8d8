use crate::shared::frame::Frame;
use crate::shared::mask::Mask;

/// Converts one BGR sample to 8-bit HSV.
///
/// Hue is halved to fit a byte and wraps into `0..180`; saturation and
/// value span `0..=255`.
pub fn bgr_to_hsv(b: u8, g: u8, r: u8) -> [u8; 3] {
    let (bf, gf, rf) = (b as f32, g as f32, r as f32);
    let v = bf.max(gf).max(rf);
    let min = bf.min(gf).min(rf);
    let diff = v - min;

    let s = if v > 0.0 { diff * 255.0 / v } else { 0.0 };

    let h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    // Round before wrapping so hues just below 0° land on 0, not 180.
    let hue = ((h / 2.0).round() as i32).rem_euclid(180);

    [
        hue as u8,
        s.round().clamp(0.0, 255.0) as u8,
        v as u8,
    ]
}

/// Marks pixels whose HSV value lies inside `lower..=upper` on every channel.
pub fn hsv_in_range(frame: &Frame, lower: [u8; 3], upper: [u8; 3]) -> Mask {
    let mut mask = Mask::zeros_like(frame);
    let channels = frame.channels() as usize;
    for (px, out) in frame
        .data()
        .chunks_exact(channels)
        .zip(mask.data_mut().iter_mut())
    {
        let hsv = bgr_to_hsv(px[0], px[1], px[2]);
        let inside = (0..3).all(|c| hsv[c] >= lower[c] && hsv[c] <= upper[c]);
        if inside {
            *out = 255;
        }
    }
    mask
}
