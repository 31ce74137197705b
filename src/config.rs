use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{GlitchError, Result},
    filter::{BlockGlitch, CelShade, ChannelShift, EdgeDetect, Grain, Noise, Quantize, Scanlines, VerticalShift},
    tone::Enhance,
};

/// Per-call probability of each pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageChances {
    pub edge_detect: f64,
    pub quantize: f64,
    pub block_glitch: f64,
    pub vertical_shift: f64,
    pub scanlines: f64,
    pub noise: f64,
    pub channel_shift: f64,
}

impl Default for StageChances {
    fn default() -> Self {
        Self {
            edge_detect: 0.2,
            quantize: 0.2,
            block_glitch: 0.8,
            vertical_shift: 0.5,
            scanlines: 0.2,
            noise: 0.3,
            channel_shift: 0.6,
        }
    }
}

/// Every tunable of the effect set. Missing TOML keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub chances: StageChances,
    pub block_glitch: BlockGlitch,
    pub channel_shift: ChannelShift,
    pub vertical_shift: VerticalShift,
    pub scanlines: Scanlines,
    pub noise: Noise,
    pub edge: EdgeDetect,
    pub quantize: Quantize,
    pub enhance: Enhance,
    pub grain: Grain,
    pub cel_shade: CelShade,
}

fn probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GlitchError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

fn positive(name: &str, value: u32) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(GlitchError::InvalidConfig(format!("{name} must be positive")))
    }
}

fn ordered<T: PartialOrd + std::fmt::Display>(name: &str, [lo, hi]: [T; 2]) -> Result<()> {
    if lo <= hi {
        Ok(())
    } else {
        Err(GlitchError::InvalidConfig(format!(
            "{name} range is reversed: [{lo}, {hi}]"
        )))
    }
}

impl GlitchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.chances;
        for (name, value) in [
            ("chances.edge_detect", c.edge_detect),
            ("chances.quantize", c.quantize),
            ("chances.block_glitch", c.block_glitch),
            ("chances.vertical_shift", c.vertical_shift),
            ("chances.scanlines", c.scanlines),
            ("chances.noise", c.noise),
            ("chances.channel_shift", c.channel_shift),
            ("block_glitch.neighbor_chance", self.block_glitch.neighbor_chance),
            ("block_glitch.split_chance", self.block_glitch.split_chance),
            ("vertical_shift.chance", self.vertical_shift.chance),
            ("scanlines.opacity", self.scanlines.opacity),
            ("noise.line_chance", self.noise.line_chance),
            ("noise.block_chance", self.noise.block_chance),
            ("quantize.mix", self.quantize.mix),
            ("enhance.sharpen_amount", self.enhance.sharpen_amount),
            ("grain.keep", self.grain.keep),
        ] {
            probability(name, value)?;
        }
        for (i, chance) in self.channel_shift.channel_chances.iter().enumerate() {
            probability(&format!("channel_shift.channel_chances[{i}]"), *chance)?;
        }

        let b = &self.block_glitch;
        positive("block_glitch.min_block_size", b.min_block_size)?;
        positive("block_glitch.max_seeds", b.max_seeds)?;
        ordered("block_glitch block size", [b.min_block_size, b.max_block_size])?;
        if b.max_shift < 0.0 || b.split_spread < 0.0 {
            return Err(GlitchError::InvalidConfig(
                "block_glitch shifts must not be negative".into(),
            ));
        }

        positive("channel_shift.max_passes", self.channel_shift.max_passes)?;
        positive("channel_shift.shift_divisor", self.channel_shift.shift_divisor)?;
        positive("vertical_shift.strip_width", self.vertical_shift.strip_width)?;
        positive("scanlines.spacing", self.scanlines.spacing)?;

        let n = &self.noise;
        ordered("noise.static_intensity", n.static_intensity)?;
        ordered("noise.static_chance", n.static_chance)?;
        probability("noise.static_chance", n.static_chance[1])?;
        ordered("noise.line_spacing", n.line_spacing)?;
        positive("noise.line_spacing", n.line_spacing[0])?;
        ordered("noise.line_intensity", n.line_intensity)?;
        ordered("noise.block_size", n.block_size)?;
        positive("noise.block_size", n.block_size[0])?;

        if self.quantize.levels < 2 {
            return Err(GlitchError::InvalidConfig(
                "quantize.levels must be at least 2".into(),
            ));
        }
        positive("cel_shade.palette_size", self.cel_shade.palette_size as u32)?;
        Ok(())
    }
}
