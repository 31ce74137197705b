use log::debug;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{signed_shift, Filter};
use crate::{buffer::wrap_coord, PixelBuffer};

/// Rolls whole colour channels vertically, wrapping rows around the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelShift {
    pub max_passes: u32,
    pub channel_chances: [f64; 3],
    /// Shift bound is `height / shift_divisor` rows.
    pub shift_divisor: u32,
}

impl Default for ChannelShift {
    fn default() -> Self {
        Self {
            max_passes: 3,
            channel_chances: [0.5, 0.3, 0.5],
            shift_divisor: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ChannelPass {
    channels: [bool; 3],
    shift: i32,
}

impl ChannelShift {
    /// Every pass copies from the pre-effect snapshot, so a later pass on the
    /// same channel replaces an earlier one instead of adding to it.
    fn shift_channels(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) -> Vec<ChannelPass> {
        let source = buffer.snapshot();
        let (width, height) = buffer.dimensions();
        let max_shift = height / self.shift_divisor.max(1);
        let passes = rng.random_range(1..=self.max_passes.max(1));
        let mut applied = Vec::with_capacity(passes as usize);

        for _ in 0..passes {
            let mut channels = [false; 3];
            for (affect, chance) in channels.iter_mut().zip(self.channel_chances) {
                *affect = rng.random::<f64>() < chance;
            }
            let shift = signed_shift(rng, max_shift);
            debug!("channel shift: {channels:?} by {shift} rows");

            if !channels.contains(&true) || shift == 0 {
                continue;
            }

            for y in 0..height {
                let (_, sy) = wrap_coord(0, y, 0, shift, width, height);
                for x in 0..width {
                    let src = buffer.index(x, sy);
                    let dst = buffer.index(x, y);
                    let data = buffer.as_bytes_mut();
                    for (c, affect) in channels.iter().enumerate() {
                        if *affect {
                            data[dst + c] = source[src + c];
                        }
                    }
                }
            }
            applied.push(ChannelPass { channels, shift });
        }
        applied
    }
}

impl Filter for ChannelShift {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        self.shift_channels(buffer, rng);
    }
}
