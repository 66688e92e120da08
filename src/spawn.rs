//! Initial launcher population.
//!
//! Launchers start clustered around the anchor with a Gaussian-like spread:
//! each horizontal axis is the sum of several uniform samples in `[-1, 1]`,
//! which piles particles up in the centre and thins them out towards the edge.

use glam::Vec3;
use rand::Rng;

use crate::config::FlameConfig;
use crate::particle::{FlameParticle, ParticleKind};
use crate::velocity::VelocityEnvelope;

/// Gaussian-like offset in the xz plane drawn from `rng`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, samples: u32, radius: f32) -> Vec3 {
    let mut offset = Vec3::ZERO;
    for _ in 0..samples {
        offset.x += rng.gen_range(-1.0f32..=1.0);
        offset.z += rng.gen_range(-1.0f32..=1.0);
    }
    offset * radius
}

/// Generate `config.initial_particles` launchers.
///
/// Ages are staggered in `[0, life)` so the first wave of launchers does not
/// expire on the same frame.
pub fn initial_population<R: Rng + ?Sized>(
    config: &FlameConfig,
    envelope: &VelocityEnvelope,
    rng: &mut R,
) -> Vec<FlameParticle> {
    (0..config.initial_particles)
        .map(|_| {
            let position = config.anchor + jitter(rng, config.jitter_samples, config.launcher_jitter);
            let r = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            let life = config.min_life_ms + (config.max_life_ms - config.min_life_ms) * rng.gen::<f32>();
            let mut p = FlameParticle::spawn(
                ParticleKind::Launcher,
                position,
                envelope.sample(r),
                life,
                config.launcher_size,
            );
            p.age = life * rng.gen::<f32>();
            p
        })
        .collect()
}
