use log::debug;
use rand::{Rng, RngCore};

use crate::{
    config::GlitchConfig,
    error::Result,
    filter::{BlockGlitch, ChannelShift, EdgeDetect, Filter, Noise, Quantize, Scanlines, VerticalShift},
    PixelBuffer,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    EdgeDetect(EdgeDetect),
    Quantize(Quantize),
    BlockGlitch(BlockGlitch),
    VerticalShift(VerticalShift),
    Scanlines(Scanlines),
    Noise(Noise),
    ChannelShift(ChannelShift),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::EdgeDetect(_) => "edge-detect",
            Stage::Quantize(_) => "quantize",
            Stage::BlockGlitch(_) => "block-glitch",
            Stage::VerticalShift(_) => "vertical-shift",
            Stage::Scanlines(_) => "scanlines",
            Stage::Noise(_) => "noise",
            Stage::ChannelShift(_) => "channel-shift",
        }
    }
}

impl Filter for Stage {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        match self {
            Stage::EdgeDetect(f) => f.transform_buffer(buffer, rng),
            Stage::Quantize(f) => f.transform_buffer(buffer, rng),
            Stage::BlockGlitch(f) => f.transform_buffer(buffer, rng),
            Stage::VerticalShift(f) => f.transform_buffer(buffer, rng),
            Stage::Scanlines(f) => f.transform_buffer(buffer, rng),
            Stage::Noise(f) => f.transform_buffer(buffer, rng),
            Stage::ChannelShift(f) => f.transform_buffer(buffer, rng),
        }
    }
}

/// The randomized effect chain. Stages are visited in a fixed order and each
/// one independently runs with its own probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<(Stage, f64)>,
}

impl Pipeline {
    pub fn new(config: &GlitchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: &GlitchConfig) -> Self {
        let c = &config.chances;
        Self {
            stages: vec![
                (Stage::EdgeDetect(config.edge.clone()), c.edge_detect),
                (Stage::Quantize(config.quantize.clone()), c.quantize),
                (Stage::BlockGlitch(config.block_glitch.clone()), c.block_glitch),
                (Stage::VerticalShift(config.vertical_shift.clone()), c.vertical_shift),
                (Stage::Scanlines(config.scanlines.clone()), c.scanlines),
                (Stage::Noise(config.noise.clone()), c.noise),
                (Stage::ChannelShift(config.channel_shift.clone()), c.channel_shift),
            ],
        }
    }

    pub fn stages(&self) -> &[(Stage, f64)] {
        &self.stages
    }

    /// Runs the chain and reports which stages fired, in order.
    pub fn apply_traced(
        &self,
        mut buffer: PixelBuffer,
        rng: &mut dyn RngCore,
    ) -> (PixelBuffer, Vec<&'static str>) {
        let mut applied = Vec::new();
        for (stage, chance) in self.stages.iter() {
            if rng.random::<f64>() < *chance {
                debug!("applying {}", stage.name());
                stage.transform_buffer(&mut buffer, rng);
                applied.push(stage.name());
            }
        }
        (buffer, applied)
    }

    pub fn apply(&self, buffer: PixelBuffer, rng: &mut dyn RngCore) -> PixelBuffer {
        self.apply_traced(buffer, rng).0
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&GlitchConfig::default())
    }
}

/// Runs the default effect chain over `buffer`.
pub fn apply_glitch_pipeline(buffer: PixelBuffer, rng: &mut dyn RngCore) -> PixelBuffer {
    Pipeline::default().apply(buffer, rng)
}
