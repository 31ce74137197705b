use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{store_channel, Filter};
use crate::PixelBuffer;

/// Darkens every `spacing`-th row, CRT style. Alpha is left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scanlines {
    pub opacity: f64,
    pub spacing: u32,
}

impl Default for Scanlines {
    fn default() -> Self {
        Self {
            opacity: 0.2,
            spacing: 4,
        }
    }
}

impl Scanlines {
    pub fn apply(&self, buffer: &mut PixelBuffer) {
        let (width, height) = buffer.dimensions();
        let keep = 1.0 - self.opacity;
        let row_len = width as usize * 4;

        for y in (0..height).step_by(self.spacing.max(1) as usize) {
            let start = buffer.index(0, y);
            let row = &mut buffer.as_bytes_mut()[start..start + row_len];
            for px in row.chunks_exact_mut(4) {
                for channel in &mut px[..3] {
                    *channel = store_channel(*channel as f64 * keep);
                }
            }
        }
    }
}

impl Filter for Scanlines {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, _rng: &mut dyn RngCore) {
        self.apply(buffer);
    }
}
