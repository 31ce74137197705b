use std::collections::VecDeque;

use log::{debug, trace};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{uniform, Filter};
use crate::{
    buffer::{wrap_coord, CHANNELS},
    grid::{BlockCoord, BlockGrid},
    PixelBuffer,
};

/// Displaces a connected cluster of blocks grown outward from a few random
/// seed cells. Blocks near a seed shift further and split colour more often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockGlitch {
    /// Grid cell size and smallest stamp edge, in pixels.
    pub min_block_size: u32,
    pub max_block_size: u32,
    /// Horizontal displacement bound at distance factor 1. Vertical uses half.
    pub max_shift: f64,
    pub neighbor_chance: f64,
    pub max_seeds: u32,
    /// Chromatic split chance at distance factor 1.
    pub split_chance: f64,
    pub min_split: u32,
    pub split_spread: f64,
}

impl Default for BlockGlitch {
    fn default() -> Self {
        Self {
            min_block_size: 20,
            max_block_size: 50,
            max_shift: 25.0,
            neighbor_chance: 0.6,
            max_seeds: 3,
            split_chance: 0.4,
            min_split: 2,
            split_spread: 8.0,
        }
    }
}

/// `1 / (d + 1)` for the nearest seed, so 1.0 on a seed and falling toward 0.
pub fn distance_factor(seeds: &[BlockCoord], block: BlockCoord) -> f64 {
    seeds
        .iter()
        .map(|seed| 1.0 / (seed.distance(&block) + 1.0))
        .fold(0.0, f64::max)
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Rect {
    fn clipped(x: u32, y: u32, width: u32, height: u32, canvas: (u32, u32)) -> Self {
        Self {
            x0: x.min(canvas.0),
            y0: y.min(canvas.1),
            x1: x.saturating_add(width).min(canvas.0),
            y1: y.saturating_add(height).min(canvas.1),
        }
    }
}

impl BlockGlitch {
    fn pick_seeds(&self, grid: &BlockGrid, rng: &mut dyn RngCore) -> Vec<BlockCoord> {
        let count = rng.random_range(1..=self.max_seeds.max(1));
        (0..count)
            .map(|_| {
                let x = rng.random_range(0..grid.blocks_wide());
                let y = rng.random_range(0..grid.blocks_high());
                BlockCoord::new(x, y)
            })
            .collect()
    }

    fn stamp(
        &self,
        buffer: &mut PixelBuffer,
        source: &[u8],
        origin: (u32, u32),
        factor: f64,
        rng: &mut dyn RngCore,
    ) -> Stamp {
        let min = self.min_block_size.max(1);
        let max = self.max_block_size.max(min);
        let block_w = rng.random_range(min..=max);
        let block_h = rng.random_range(min..=max);

        let shift_x = (uniform(rng, -self.max_shift, self.max_shift) * factor).floor() as i32;
        let half = self.max_shift / 2.0;
        let shift_y = (uniform(rng, -half, half) * factor).floor() as i32;

        let (width, height) = buffer.dimensions();
        let rect = Rect::clipped(origin.0, origin.1, block_w, block_h, (width, height));

        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                let (sx, sy) = wrap_coord(x, y, shift_x, shift_y, width, height);
                let src = buffer.index(sx, sy);
                let dst = buffer.index(x, y);
                buffer.as_bytes_mut()[dst..dst + CHANNELS]
                    .copy_from_slice(&source[src..src + CHANNELS]);
            }
        }

        let mut split = None;
        if rng.random::<f64>() < factor * self.split_chance {
            let distance = (rng.random::<f64>() * self.split_spread * factor).floor() as u32
                + self.min_split;
            split_channels(buffer, source, rect, distance);
            split = Some(distance);
        }

        Stamp {
            rect,
            shift: (shift_x, shift_y),
            split,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Stamp {
    rect: Rect,
    shift: (i32, i32),
    split: Option<u32>,
}

/// Pulls red from `split` pixels to the left and blue from `split` pixels to
/// the right, clamped at the row ends. Green and alpha keep the stamp.
fn split_channels(buffer: &mut PixelBuffer, source: &[u8], rect: Rect, split: u32) {
    let width = buffer.width();
    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            let left = buffer.index(x.saturating_sub(split), y);
            let right = buffer.index(x.saturating_add(split).min(width - 1), y);
            let dst = buffer.index(x, y);
            let data = buffer.as_bytes_mut();
            data[dst] = source[left];
            data[dst + 2] = source[right + 2];
        }
    }
}

impl Filter for BlockGlitch {
    fn transform_buffer(&self, buffer: &mut PixelBuffer, rng: &mut dyn RngCore) {
        let source = buffer.snapshot();
        let (width, height) = buffer.dimensions();
        let grid = BlockGrid::new(width, height, self.min_block_size);

        let seeds = self.pick_seeds(&grid, rng);
        let mut visited = grid.visited();
        for seed in seeds.iter() {
            visited.insert(*seed);
        }

        let mut queue: VecDeque<BlockCoord> = seeds.iter().copied().collect();
        let mut stamped = 0;

        while let Some(current) = queue.pop_front() {
            for neighbor in grid.neighbors(current) {
                if visited.contains(neighbor) || rng.random::<f64>() >= self.neighbor_chance {
                    continue;
                }
                visited.insert(neighbor);
                queue.push_back(neighbor);

                let factor = distance_factor(&seeds, neighbor);
                let stamp = self.stamp(buffer, &source, grid.origin(neighbor), factor, rng);
                trace!(
                    "stamp {:?} shift {:?} split {:?} factor {factor:.3}",
                    stamp.rect,
                    stamp.shift,
                    stamp.split
                );
                stamped += 1;
            }
        }

        debug!(
            "block glitch: {} seeds, {stamped} of {} blocks stamped",
            seeds.len(),
            grid.block_count()
        );
    }
}
