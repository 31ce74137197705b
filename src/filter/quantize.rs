use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{round_half_up, Filter};
use crate::{PixelBuffer, OUTLINE_COLOR};

/// Posterises each channel to evenly spaced levels, then mixes some of the
/// original value back in. Outline pixels are skipped so edges survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quantize {
    pub levels: u32,
    /// Weight of the quantized value; the original keeps `1 - mix`.
    pub mix: f64,
}

impl Default for Quantize {
    fn default() -> Self {
        Self { levels: 4, mix: 0.4 }
    }
}

impl Quantize {
    pub fn quantize_channel(&self, value: u8) -> u8 {
        let step = 255.0 / (self.levels.max(2) - 1) as f64;
        let value = value as f64;
        let level = round_half_up(value / step) * step;
        round_half_up(level * self.mix + value * (1.0 - self.mix)).clamp(0.0, 255.0) as u8
    }

    pub fn apply(&self, buffer: &mut PixelBuffer) {
        for px in buffer.as_bytes_mut().chunks_exact_mut(4) {
            if px[..3] == OUTLINE_COLOR[..3] {
                continue;
            }
            for channel in &mut px[..3] {
                *channel = self.quantize_channel(*channel);
            }
        }
    }
}

impl Filter for Quantize {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, _rng: &mut dyn RngCore) {
        self.apply(buffer);
    }
}
