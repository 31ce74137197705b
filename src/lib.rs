//! Procedural glitch-art effects over in-memory RGBA buffers.
//!
//! The main entry point is [`apply_glitch_pipeline`], which runs a randomized
//! subset of the effects in [`filter`] over a [`PixelBuffer`]. All randomness
//! comes from the caller's generator, so a seeded generator gives repeatable
//! output. [`sharpen`] and [`adjust_contrast`] prepare a source photo first.

pub mod buffer;
pub mod config;
pub mod error;
pub mod filter;
pub mod grid;
pub mod io;
pub mod pipeline;
pub mod tone;

pub use buffer::PixelBuffer;
pub use config::GlitchConfig;
pub use error::{GlitchError, Result};
pub use pipeline::{apply_glitch_pipeline, Pipeline, Stage};
pub use tone::{adjust_contrast, sharpen};

use filter::{CelShade, Filter, Grain};
use rand::RngCore;

/// Solid opaque black written by edge detection; quantizing skips it.
pub const OUTLINE_COLOR: [u8; 4] = [0, 0, 0, 0xff];

/// Gaussian-ish film grain over a random 30% of pixels.
pub fn add_grain(mut buffer: PixelBuffer, rng: &mut dyn RngCore) -> PixelBuffer {
    Grain::default().transform_buffer(&mut buffer, rng);
    buffer
}

/// Flat palette colouring with black outlines.
pub fn apply_cel_shade(mut buffer: PixelBuffer) -> PixelBuffer {
    CelShade::default().apply(&mut buffer);
    buffer
}
