//! Photo clean-up applied before glitching: a 3x3 sharpen and a linear
//! contrast stretch.

use serde::{Deserialize, Serialize};

use crate::{
    buffer::{clamp_coord, CHANNELS},
    filter::{round_half_up, store_channel},
    PixelBuffer,
};

const SHARPEN_KERNEL: [[f64; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// Sharpens with a 3x3 kernel, sampling past the border from the nearest edge
/// pixel, and blends the result with the input by `amount` (clamped to [0, 1]).
pub fn sharpen(buffer: PixelBuffer, amount: f64) -> PixelBuffer {
    let amount = amount.clamp(0.0, 1.0);
    let (width, height) = buffer.dimensions();
    let source = buffer.as_bytes();
    let mut out = buffer.clone();

    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f64; 3];
            for (ky, row) in SHARPEN_KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    if *weight == 0.0 {
                        continue;
                    }
                    let (sx, sy) = clamp_coord(
                        x as i64 + kx as i64 - 1,
                        y as i64 + ky as i64 - 1,
                        width,
                        height,
                    );
                    let i = buffer.index(sx, sy);
                    for c in 0..3 {
                        acc[c] += source[i + c] as f64 * weight;
                    }
                }
            }

            let i = buffer.index(x, y);
            let dst = &mut out.as_bytes_mut()[i..i + CHANNELS];
            for c in 0..3 {
                let blended = acc[c] * amount + source[i + c] as f64 * (1.0 - amount);
                dst[c] = round_half_up(blended).clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

/// Linear contrast about mid-gray. `contrast_percent` of 0 is the identity;
/// 100 is close to a hard threshold.
pub fn adjust_contrast(mut buffer: PixelBuffer, contrast_percent: f64) -> PixelBuffer {
    let c = contrast_percent * 2.55;
    // .01 keeps the divisor non-zero at 100%
    let factor = (255.0 + c) / (255.01 - c);

    for px in buffer.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        for channel in &mut px[..3] {
            *channel = store_channel(factor * (*channel as f64 - 128.0) + 128.0);
        }
    }
    buffer
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enhance {
    pub sharpen_amount: f64,
    pub contrast: f64,
}

impl Default for Enhance {
    fn default() -> Self {
        Self {
            sharpen_amount: 0.33,
            contrast: 0.8,
        }
    }
}

impl Enhance {
    pub fn apply(&self, buffer: PixelBuffer) -> PixelBuffer {
        adjust_contrast(sharpen(buffer, self.sharpen_amount), self.contrast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sharpen_leaves_flat_fields_alone() {
        let buffer = PixelBuffer::filled(9, 7, [90, 140, 33, 200]).unwrap();
        assert_eq!(sharpen(buffer.clone(), 1.0), buffer);
    }

    #[test]
    fn sharpen_zero_amount_is_identity() {
        let buffer = PixelBuffer::from_fn(6, 6, |x, y| [(x * 40) as u8, (y * 40) as u8, 7, 255]).unwrap();
        assert_eq!(sharpen(buffer.clone(), 0.0), buffer);
    }

    #[test]
    fn sharpen_boosts_an_isolated_dot() {
        let buffer = PixelBuffer::from_fn(3, 3, |x, y| if (x, y) == (1, 1) { [100, 100, 100, 255] } else { [50, 50, 50, 255] }).unwrap();
        let out = sharpen(buffer, 1.0);
        // 5 * 100 - 4 * 50
        assert_eq!(out.pixel(1, 1), [255, 255, 255, 255]);
        // edge-clamped corner: 5 * 50 - 50 - 50 - 50 - 50 = 50
        assert_eq!(out.pixel(0, 0), [50, 50, 50, 255]);
        // side: 5 * 50 - 3 * 50 - 100 = 0
        assert_eq!(out.pixel(1, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn sharpen_blends_by_amount() {
        let buffer = PixelBuffer::from_fn(3, 3, |x, y| if (x, y) == (1, 1) { [100, 100, 100, 255] } else { [50, 50, 50, 255] }).unwrap();
        let out = sharpen(buffer, 0.5);
        // 300 * 0.5 + 100 * 0.5
        assert_eq!(out.pixel(1, 1)[0], 200);
    }

    #[test]
    fn contrast_zero_is_identity() {
        let buffer = PixelBuffer::from_fn(16, 16, |x, y| [(x * 16) as u8, (y * 16) as u8, 128, 3]).unwrap();
        assert_eq!(adjust_contrast(buffer.clone(), 0.0), buffer);
    }

    #[test]
    fn full_contrast_saturates_without_wrapping() {
        let buffer = PixelBuffer::from_fn(4, 1, |x, _| [[0, 127, 129, 255][x as usize], 128, 200, 99]).unwrap();
        let out = adjust_contrast(buffer, 100.0);
        assert_eq!(out.pixel(0, 0), [0, 128, 255, 99]);
        assert_eq!(out.pixel(1, 0)[0], 0);
        assert_eq!(out.pixel(2, 0)[0], 255);
        assert_eq!(out.pixel(3, 0)[0], 255);
    }

    #[test]
    fn enhance_keeps_dimensions() {
        let buffer = PixelBuffer::from_fn(13, 5, |x, y| [(x * 19) as u8, (y * 50) as u8, 60, 255]).unwrap();
        let out = Enhance::default().apply(buffer);
        assert_eq!(out.dimensions(), (13, 5));
        assert_eq!(out.as_bytes().len(), 13 * 5 * 4);
    }
}
