use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{round_half_up, EdgeDetect, Filter};
use crate::{PixelBuffer, OUTLINE_COLOR};

const WEIGHTS: [f64; 3] = [0.3, 0.59, 0.11];

/// Perceptual distance: weighted per-channel differences plus twice the
/// luminance gap, all squared.
pub fn weighted_color_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let mut total = 0.0;
    let mut lum_a = 0.0;
    let mut lum_b = 0.0;
    for c in 0..3 {
        let diff = (a[c] as f64 - b[c] as f64) * WEIGHTS[c];
        total += diff * diff;
        lum_a += a[c] as f64 * WEIGHTS[c];
        lum_b += b[c] as f64 * WEIGHTS[c];
    }
    let lum = (lum_a - lum_b).abs() * 2.0;
    total + lum * lum
}

struct ColorGroup {
    key: [u8; 3],
    count: u64,
    sum: [u64; 3],
}

impl ColorGroup {
    fn average(&self) -> [u8; 3] {
        self.sum
            .map(|s| round_half_up(s as f64 / self.count as f64).clamp(0.0, 255.0) as u8)
    }
}

/// Flat cartoon colouring: a small palette of dominant colours, black
/// outlines on edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CelShade {
    /// Colours closer than this join an existing group.
    pub similarity: f64,
    pub palette_size: usize,
    pub edge: EdgeDetect,
}

impl Default for CelShade {
    fn default() -> Self {
        Self {
            similarity: 60.0,
            palette_size: 20,
            edge: EdgeDetect::default(),
        }
    }
}

impl CelShade {
    /// The most frequent colour groups, most common first.
    pub fn palette(&self, buffer: &PixelBuffer) -> Vec<[u8; 3]> {
        let mut groups: Vec<ColorGroup> = Vec::new();

        for px in buffer.as_bytes().chunks_exact(4) {
            let color = [px[0], px[1], px[2]];
            let found = groups
                .iter_mut()
                .find(|g| weighted_color_distance(color, g.key) < self.similarity);
            match found {
                Some(group) => {
                    group.count += 1;
                    for c in 0..3 {
                        group.sum[c] += color[c] as u64;
                    }
                }
                None => groups.push(ColorGroup {
                    key: color,
                    count: 1,
                    sum: color.map(u64::from),
                }),
            }
        }

        groups.sort_by(|a, b| b.count.cmp(&a.count));
        groups
            .iter()
            .take(self.palette_size.max(1))
            .map(ColorGroup::average)
            .collect()
    }

    pub fn apply(&self, buffer: &mut PixelBuffer) {
        let palette = self.palette(buffer);
        self.edge.apply(buffer);

        for px in buffer.as_bytes_mut().chunks_exact_mut(4) {
            let color = [px[0], px[1], px[2]];
            if color == OUTLINE_COLOR[..3] {
                continue;
            }
            let nearest = palette.iter().copied().fold(None, |best: Option<([u8; 3], f64)>, candidate| {
                let distance = weighted_color_distance(color, candidate);
                match best {
                    Some((_, d)) if d <= distance => best,
                    _ => Some((candidate, distance)),
                }
            });
            if let Some((rgb, _)) = nearest {
                px[..3].copy_from_slice(&rgb);
            }
        }
    }
}

impl Filter for CelShade {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, _rng: &mut dyn RngCore) {
        self.apply(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_for_identical_colors() {
        assert_eq!(weighted_color_distance([12, 200, 3], [12, 200, 3]), 0.0);
        assert!(weighted_color_distance([200, 20, 20], [20, 20, 200]) > 60.0);
    }

    #[test]
    fn similar_colors_share_a_group() {
        let buffer = PixelBuffer::from_fn(2, 1, |x, _| [100 + 2 * x as u8, 100, 100, 255]).unwrap();
        assert_eq!(CelShade::default().palette(&buffer), vec![[101, 100, 100]]);
    }

    #[test]
    fn palette_is_ordered_by_frequency() {
        let buffer = PixelBuffer::from_fn(10, 1, |x, _| if x < 3 { [200, 20, 20, 255] } else { [20, 20, 200, 255] }).unwrap();
        assert_eq!(CelShade::default().palette(&buffer), vec![[20, 20, 200], [200, 20, 20]]);
    }

    #[test]
    fn flattens_noise_and_outlines_the_boundary() {
        // Two noisy regions; interior pixels collapse onto the region colours.
        let mut buffer = PixelBuffer::from_fn(16, 8, |x, y| {
            let jitter = ((x + y) % 2) as u8;
            if x < 8 {
                [200 + jitter, 20, 20, 255]
            } else {
                [20, 20, 200 + jitter, 255]
            }
        })
        .unwrap();
        CelShade::default().apply(&mut buffer);

        // Each region averages to x.5 on its jittered channel, which rounds up.
        assert_eq!(buffer.pixel(2, 3), [201, 20, 20, 255]);
        assert_eq!(buffer.pixel(12, 5), [20, 20, 201, 255]);
        assert_eq!(buffer.pixel(2, 0), [201, 20, 20, 255]);
        assert_eq!(buffer.pixel(7, 3), OUTLINE_COLOR);
        assert_eq!(buffer.pixel(8, 3), OUTLINE_COLOR);
    }
}
