use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{signed_shift, Filter};
use crate::{
    buffer::{wrap_coord, CHANNELS},
    PixelBuffer,
};

/// Slides fixed-width vertical strips up or down with row wraparound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalShift {
    pub strip_width: u32,
    pub chance: f64,
    pub max_shift: u32,
}

impl Default for VerticalShift {
    fn default() -> Self {
        Self {
            strip_width: 30,
            chance: 0.1,
            max_shift: 10,
        }
    }
}

impl Filter for VerticalShift {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        let source = buffer.snapshot();
        let (width, height) = buffer.dimensions();
        let strip = self.strip_width.max(1);

        for x0 in (0..width).step_by(strip as usize) {
            if rng.random::<f64>() >= self.chance {
                continue;
            }
            let shift = signed_shift(rng, self.max_shift);

            for x in x0..(x0 + strip).min(width) {
                for y in 0..height {
                    let (_, sy) = wrap_coord(x, y, 0, shift, width, height);
                    let src = buffer.index(x, sy);
                    let dst = buffer.index(x, y);
                    buffer.as_bytes_mut()[dst..dst + CHANNELS]
                        .copy_from_slice(&source[src..src + CHANNELS]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn rows() -> PixelBuffer {
        PixelBuffer::from_fn(95, 40, |x, y| [y as u8, (y * 3) as u8, x as u8, 200]).unwrap()
    }

    #[test]
    fn strips_move_as_units() {
        let shift = VerticalShift {
            chance: 1.0,
            ..VerticalShift::default()
        };
        let original = rows();
        let mut buffer = original.clone();
        shift.transform_buffer(&mut buffer, &mut StdRng::seed_from_u64(8));

        // Within a strip, every column carries the same row offset.
        for strip_start in (0..95).step_by(30) {
            let offset = |x: u32| (buffer.pixel(x, 0)[0] as i32 - original.pixel(x, 0)[0] as i32).rem_euclid(40);
            let first = offset(strip_start);
            for x in strip_start..(strip_start + 30).min(95) {
                assert_eq!(offset(x), first);
                assert_eq!(buffer.pixel(x, 5)[2], x as u8);
            }
            assert!(first <= 10 || first >= 30);
        }
    }

    #[test]
    fn zero_chance_is_identity() {
        let shift = VerticalShift {
            chance: 0.0,
            ..VerticalShift::default()
        };
        let original = rows();
        let mut buffer = original.clone();
        shift.transform_buffer(&mut buffer, &mut StdRng::seed_from_u64(8));
        assert_eq!(buffer, original);
    }
}
