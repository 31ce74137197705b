use image::RgbaImage;

use crate::error::{GlitchError, Result};

pub const CHANNELS: usize = 4;

/// An interleaved RGBA image held in memory.
///
/// The length invariant `data.len() == width * height * 4` is checked once on
/// construction, so every effect can index freely afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GlitchError::ZeroDimension { width, height });
        }

        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(GlitchError::InvalidBuffer {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let count = width as usize * height as usize;
        Self::new(width, height, rgba.repeat(count))
    }

    /// Builds a buffer by evaluating `f` at every coordinate in row-major order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Result<Self> {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Read-only copy of the current bytes, taken before an effect starts writing.
    pub(crate) fn snapshot(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn into_rgba_image(self) -> Result<RgbaImage> {
        let (width, height) = self.dimensions();
        let actual = self.data.len();
        RgbaImage::from_raw(width, height, self.data).ok_or(GlitchError::InvalidBuffer {
            width,
            height,
            expected: width as usize * height as usize * CHANNELS,
            actual,
        })
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = GlitchError;

    fn try_from(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}

/// Source coordinate for a pixel sampled `(shift_x, shift_y)` away, wrapping
/// past each edge onto the opposite one.
pub fn wrap_coord(x: u32, y: u32, shift_x: i32, shift_y: i32, width: u32, height: u32) -> (u32, u32) {
    let sx = (x as i64 + shift_x as i64).rem_euclid(width as i64);
    let sy = (y as i64 + shift_y as i64).rem_euclid(height as i64);
    (sx as u32, sy as u32)
}

/// Like [`wrap_coord`] but pins out-of-range coordinates to the nearest edge.
pub fn clamp_coord(x: i64, y: i64, width: u32, height: u32) -> (u32, u32) {
    let cx = x.clamp(0, width as i64 - 1);
    let cy = y.clamp(0, height as i64 - 1);
    (cx as u32, cy as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_mismatch() {
        let err = PixelBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            GlitchError::InvalidBuffer {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            PixelBuffer::new(0, 3, Vec::new()),
            Err(GlitchError::ZeroDimension { width: 0, height: 3 })
        ));
    }

    #[test]
    fn pixel_access_is_row_major() {
        let buffer = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 7, 255]).unwrap();
        assert_eq!(buffer.pixel(2, 1), [2, 1, 7, 255]);
        assert_eq!(&buffer.as_bytes()[4..8], &[1, 0, 7, 255]);
    }

    #[test]
    fn wrap_coord_wraps_both_axes() {
        assert_eq!(wrap_coord(0, 0, -1, -1, 10, 5), (9, 4));
        assert_eq!(wrap_coord(9, 4, 1, 1, 10, 5), (0, 0));
        assert_eq!(wrap_coord(3, 2, -25, 12, 10, 5), (8, 4));
    }

    #[test]
    fn clamp_coord_pins_to_edges() {
        assert_eq!(clamp_coord(-3, 7, 4, 4), (0, 3));
        assert_eq!(clamp_coord(2, 1, 4, 4), (2, 1));
    }

    #[test]
    fn converts_through_rgba_image() {
        let buffer = PixelBuffer::filled(4, 3, [10, 20, 30, 40]).unwrap();
        let image = buffer.clone().into_rgba_image().unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(PixelBuffer::try_from(image).unwrap(), buffer);
    }
}
