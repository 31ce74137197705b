use log::debug;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{uniform, uniform_int, Filter};
use crate::PixelBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseMode {
    Static,
    Lines,
    Blocks,
}

impl NoiseMode {
    pub const ALL: [NoiseMode; 3] = [NoiseMode::Static, NoiseMode::Lines, NoiseMode::Blocks];
}

/// Additive brightening noise. Channels saturate at 255; nothing is darkened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Noise {
    /// Fixed mode, or `None` to pick one per call.
    pub mode: Option<NoiseMode>,

    pub static_intensity: [f64; 2],
    pub static_chance: [f64; 2],

    pub line_spacing: [u32; 2],
    pub line_intensity: [f64; 2],
    pub line_chance: f64,

    pub block_size: [u32; 2],
    pub block_chance: f64,
    pub block_intensity: f64,
}

impl Default for Noise {
    fn default() -> Self {
        Self {
            mode: None,
            static_intensity: [20.0, 70.0],
            static_chance: [0.1, 0.3],
            line_spacing: [5, 25],
            line_intensity: [50.0, 150.0],
            line_chance: 0.7,
            block_size: [10, 30],
            block_chance: 0.1,
            block_intensity: 100.0,
        }
    }
}

fn brighten(px: &mut [u8], amount: u8) {
    for channel in &mut px[..3] {
        *channel = channel.saturating_add(amount);
    }
}

fn draw_amount(rng: &mut dyn RngCore, bound: f64) -> u8 {
    (rng.random::<f64>() * bound).floor().clamp(0.0, 255.0) as u8
}

impl Noise {
    fn apply_static(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        let [lo, hi] = self.static_intensity;
        let intensity = uniform(rng, lo, hi);
        let [lo, hi] = self.static_chance;
        let chance = uniform(rng, lo, hi);

        for px in buffer.as_bytes_mut().chunks_exact_mut(4) {
            if rng.random::<f64>() < chance {
                let amount = draw_amount(rng, intensity);
                brighten(px, amount);
            }
        }
    }

    fn apply_lines(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        let [lo, hi] = self.line_spacing;
        let spacing = uniform_int(rng, lo.max(1), hi);
        let [lo, hi] = self.line_intensity;
        let intensity = uniform(rng, lo, hi);
        let (width, height) = buffer.dimensions();
        let row_len = width as usize * 4;

        for y in (0..height).step_by(spacing as usize) {
            if rng.random::<f64>() >= self.line_chance {
                continue;
            }
            let start = buffer.index(0, y);
            for px in buffer.as_bytes_mut()[start..start + row_len].chunks_exact_mut(4) {
                let amount = draw_amount(rng, intensity);
                brighten(px, amount);
            }
        }
    }

    fn apply_blocks(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        let [lo, hi] = self.block_size;
        let size = uniform_int(rng, lo.max(1), hi);
        let (width, height) = buffer.dimensions();

        for y0 in (0..height).step_by(size as usize) {
            for x0 in (0..width).step_by(size as usize) {
                if rng.random::<f64>() >= self.block_chance {
                    continue;
                }
                let amount = draw_amount(rng, self.block_intensity);
                for y in y0..(y0 + size).min(height) {
                    for x in x0..(x0 + size).min(width) {
                        let i = buffer.index(x, y);
                        brighten(&mut buffer.as_bytes_mut()[i..i + 4], amount);
                    }
                }
            }
        }
    }
}

impl Filter for Noise {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        let mode = match self.mode {
            Some(mode) => mode,
            None => NoiseMode::ALL[rng.random_range(0..NoiseMode::ALL.len())],
        };
        debug!("noise: {mode:?}");

        match mode {
            NoiseMode::Static => self.apply_static(buffer, rng),
            NoiseMode::Lines => self.apply_lines(buffer, rng),
            NoiseMode::Blocks => self.apply_blocks(buffer, rng),
        }
    }
}
