use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::Filter;
use crate::{PixelBuffer, OUTLINE_COLOR};

/// Paints interior pixels with a strong local gradient in [`OUTLINE_COLOR`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeDetect {
    /// A pixel is an edge when any channel's gradient strictly exceeds this.
    pub threshold: u8,
}

impl Default for EdgeDetect {
    fn default() -> Self {
        Self { threshold: 17 }
    }
}

impl EdgeDetect {
    /// Largest absolute left/right or top/bottom difference across R, G and B.
    fn gradient(source: &[u8], index: usize, stride: usize) -> u8 {
        (0..3)
            .map(|c| {
                let horizontal = source[index - 4 + c].abs_diff(source[index + 4 + c]);
                let vertical = source[index - stride + c].abs_diff(source[index + stride + c]);
                horizontal.max(vertical)
            })
            .max()
            .unwrap_or(0)
    }

    pub fn apply(&self, buffer: &mut PixelBuffer) {
        let (width, height) = buffer.dimensions();
        if width < 3 || height < 3 {
            return;
        }

        let source = buffer.snapshot();
        let stride = width as usize * 4;

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let i = buffer.index(x, y);
                if Self::gradient(&source, i, stride) > self.threshold {
                    buffer.as_bytes_mut()[i..i + 4].copy_from_slice(&OUTLINE_COLOR);
                }
            }
        }
    }
}

impl Filter for EdgeDetect {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, _rng: &mut dyn RngCore) {
        self.apply(buffer);
    }
}
