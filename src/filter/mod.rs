mod cel_shade;
mod channel_shift;
mod edge;
mod glitch;
mod grain;
mod noise;
mod quantize;
mod scanlines;
mod vertical_shift;

pub use cel_shade::{weighted_color_distance, CelShade};
pub use channel_shift::ChannelShift;
pub use edge::EdgeDetect;
pub use glitch::{distance_factor, BlockGlitch};
pub use grain::Grain;
pub use noise::{Noise, NoiseMode};
pub use quantize::Quantize;
pub use scanlines::Scanlines;
pub use vertical_shift::VerticalShift;

use rand::{Rng, RngCore};

use crate::PixelBuffer;

pub trait Filter {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore);
}

/// Stores a computed channel value the way a clamped byte array does:
/// round half to even, then saturate.
pub(crate) fn store_channel(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Uniform draw from `[min, max)`; collapses to `min` when the range is empty.
pub(crate) fn uniform(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + rng.random::<f64>() * (max - min).max(0.0)
}

pub(crate) fn uniform_int(rng: &mut dyn RngCore, min: u32, max: u32) -> u32 {
    if max <= min {
        min
    } else {
        rng.random_range(min..max)
    }
}

/// Signed shift drawn from `[-max, max)`, as whole pixels.
pub(crate) fn signed_shift(rng: &mut dyn RngCore, max: u32) -> i32 {
    if max == 0 {
        return 0;
    }
    rng.random_range(-(max as i32)..max as i32)
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::RngCore;

    /// Returns the same word forever. `u64::MAX` makes every `random::<f64>()`
    /// land just below 1.0, so no probability gate ever passes.
    pub struct ConstRng(pub u64);

    impl RngCore for ConstRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for (i, byte) in dst.iter_mut().enumerate() {
                *byte = self.0.to_le_bytes()[i % 8];
            }
        }
    }

    pub fn gradient(width: u32, height: u32) -> crate::PixelBuffer {
        crate::PixelBuffer::from_fn(width, height, |x, y| {
            [
                (x * 7 % 256) as u8,
                (y * 5 % 256) as u8,
                ((x + y) * 3 % 256) as u8,
                255,
            ]
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_channel_rounds_half_to_even_and_saturates() {
        assert_eq!(store_channel(102.4), 102);
        assert_eq!(store_channel(2.5), 2);
        assert_eq!(store_channel(3.5), 4);
        assert_eq!(store_channel(-40.0), 0);
        assert_eq!(store_channel(300.2), 255);
    }

    #[test]
    fn round_half_up_matches_ties_upward() {
        assert_eq!(round_half_up(144.5), 145.0);
        assert_eq!(round_half_up(-0.5), 0.0);
    }
}
