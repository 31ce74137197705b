use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{store_channel, Filter};
use crate::PixelBuffer;

/// Roughly Gaussian per-channel jitter over a random subset of pixels.
/// Touched pixels become fully opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grain {
    pub keep: f64,
    /// Width of the jitter; deltas fall in `[-depth/2, depth/2)`.
    pub depth: u32,
    pub samples: u32,
}

impl Default for Grain {
    fn default() -> Self {
        Self {
            keep: 0.7,
            depth: 128,
            samples: 6,
        }
    }
}

impl Grain {
    fn bell(&self, rng: &mut dyn RngCore) -> f64 {
        let samples = self.samples.max(1);
        let total: f64 = (0..samples).map(|_| rng.random::<f64>()).sum();
        total / samples as f64
    }
}

impl Filter for Grain {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        let depth = self.depth as f64;
        for px in buffer.as_bytes_mut().chunks_exact_mut(4) {
            if rng.random::<f64>() < self.keep {
                continue;
            }
            for channel in &mut px[..3] {
                let delta = (self.bell(rng) * depth).floor() - depth / 2.0;
                *channel = store_channel(*channel as f64 + delta);
            }
            px[3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn jitter_stays_within_depth() {
        let original = PixelBuffer::filled(50, 50, [128, 128, 128, 40]).unwrap();
        let mut buffer = original.clone();
        Grain::default().transform_buffer(&mut buffer, &mut StdRng::seed_from_u64(2));

        let mut touched = 0;
        for px in buffer.as_bytes().chunks_exact(4) {
            if px[3] == 255 {
                touched += 1;
                for c in 0..3 {
                    assert!((64..192).contains(&px[c]));
                }
            } else {
                assert_eq!(px, [128, 128, 128, 40]);
            }
        }
        // about 30% of 2500 pixels
        assert!(touched > 500 && touched < 1000, "touched {touched}");
    }

    #[test]
    fn keep_everything_is_identity() {
        let grain = Grain {
            keep: 1.0,
            ..Grain::default()
        };
        let original = PixelBuffer::filled(10, 10, [3, 250, 7, 9]).unwrap();
        let mut buffer = original.clone();
        grain.transform_buffer(&mut buffer, &mut StdRng::seed_from_u64(2));
        assert_eq!(buffer, original);
    }

    #[test]
    fn extremes_are_clamped() {
        let grain = Grain {
            keep: 0.0,
            depth: 255,
            ..Grain::default()
        };
        let mut buffer = PixelBuffer::filled(20, 20, [0, 255, 0, 0]).unwrap();
        grain.transform_buffer(&mut buffer, &mut StdRng::seed_from_u64(6));
        assert!(buffer.as_bytes().chunks_exact(4).all(|px| px[3] == 255));
    }
}
