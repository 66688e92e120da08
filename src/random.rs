//! Precomputed random table sampled by the simulation pass.
//!
//! The table holds uniform 3-vectors in `[0, 1)³`. It is addressed with a
//! normalized coordinate that wraps (repeat addressing) and is linearly
//! interpolated between the two nearest texels, with texel centres at
//! `(i + 0.5) / len`. The WGSL helper `random_at` in the update shader performs
//! the exact same lookup against the uploaded 1-D texture, so the CPU
//! reference pass in [`crate::simulate`] draws the same numbers as the GPU.
//!
//! The table never seeds its own generator. Callers pass in the emitter's
//! single process-wide RNG (or a seeded one in tests).

use glam::Vec3;
use rand::Rng;

use crate::error::FlameError;

/// Default number of texels in the random table.
pub const DEFAULT_RANDOM_TEXELS: u32 = 580;

/// Golden-ratio multiplier (`2^32 / φ`) that spreads invocation indices over the table.
pub const INVOCATION_HASH: u32 = 2_654_435_769;

/// Step between consecutive draws of the same invocation.
pub const DRAW_STRIDE: f32 = 0.137;

/// Table of uniform random vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomTable {
    texels: Vec<Vec3>,
}

impl RandomTable {
    /// Generate `count` independent uniform vectors from `rng`.
    pub fn build<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Result<Self, FlameError> {
        if count == 0 {
            return Err(FlameError::EmptyRandomTable);
        }
        let texels = (0..count)
            .map(|_| Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()))
            .collect();
        Ok(Self { texels })
    }

    /// Build a table from existing texels.
    pub fn from_texels(texels: Vec<Vec3>) -> Result<Self, FlameError> {
        if texels.is_empty() {
            return Err(FlameError::EmptyRandomTable);
        }
        Ok(Self { texels })
    }

    pub fn len(&self) -> usize {
        self.texels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    pub fn texels(&self) -> &[Vec3] {
        &self.texels
    }

    /// Sample with repeat addressing and linear filtering.
    pub fn sample(&self, u: f32) -> Vec3 {
        let n = self.texels.len() as i64;
        let x = (u - u.floor()) * n as f32 - 0.5;
        let x0 = x.floor();
        let t = x - x0;
        let i0 = (x0 as i64).rem_euclid(n) as usize;
        let i1 = (i0 + 1) % n as usize;
        self.texels[i0].lerp(self.texels[i1], t)
    }

    /// Texel data as RGBA floats for upload; alpha is always 1.
    pub fn to_rgba(&self) -> Vec<[f32; 4]> {
        self.texels.iter().map(|v| [v.x, v.y, v.z, 1.0]).collect()
    }
}

/// Offset of invocation `index` in `[0, 1)`.
///
/// Reduced in integer space and kept to 24 bits so it is exact in `f32` for
/// every index.
#[inline]
pub fn invocation_offset(index: u32) -> f32 {
    (index.wrapping_mul(INVOCATION_HASH) >> 8) as f32 / 16_777_216.0
}

/// Table coordinate for draw `draw` of invocation `index` within a pass seeded with `seed`.
#[inline]
pub fn table_coordinate(seed: f32, index: u32, draw: u32) -> f32 {
    seed + invocation_offset(index) + draw as f32 * DRAW_STRIDE
}

/// Sequential draws for one invocation of a pass.
pub struct RandomStream<'a> {
    table: &'a RandomTable,
    seed: f32,
    index: u32,
    draw: u32,
}

impl<'a> RandomStream<'a> {
    pub fn new(table: &'a RandomTable, seed: f32, index: u32) -> Self {
        Self {
            table,
            seed,
            index,
            draw: 0,
        }
    }

    /// Next vector in `[0, 1)³`.
    pub fn next_vec3(&mut self) -> Vec3 {
        let v = self.table.sample(table_coordinate(self.seed, self.index, self.draw));
        self.draw += 1;
        v
    }

    /// Gaussian-like offset in the xz plane: the sum of `samples` uniforms in
    /// `[-1, 1]` per axis, scaled by `radius`.
    pub fn jitter(&mut self, samples: u32, radius: f32) -> Vec3 {
        let mut offset = Vec3::ZERO;
        for _ in 0..samples {
            let r = self.next_vec3();
            offset.x += 2.0 * r.x - 1.0;
            offset.z += 2.0 * r.z - 1.0;
        }
        offset * radius
    }
}
