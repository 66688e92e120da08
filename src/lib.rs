//! # Ember - GPU feedback flame emitter
//!
//! A particle flame simulated and drawn entirely on the GPU. Particles live in
//! two buffers that swap roles every frame: a compute pass reads one buffer
//! and appends the surviving and newly spawned particles into the other, and
//! the render pass draws exactly what was appended using an indirect draw.
//! The host never reads particle data back.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ember::prelude::*;
//!
//! let config = FlameConfig::default()
//!     .with_capacity(4000)
//!     .with_shells_per_launcher(2);
//! let mut flame = Flame::new(&device, &queue, surface_format, config)?;
//! flame.set_viewport(width, height);
//!
//! // per frame, after clearing the target
//! flame.update(delta_ms);
//! flame.render(&queue, &mut encoder, &view, delta_ms, view_matrix, projection);
//! ```
//!
//! ## Particles
//!
//! There are two kinds of particle:
//!
//! - **Launchers** never run out. When one expires it emits one or more
//!   shells where it stood and respawns itself at the emitter's anchor.
//! - **Shells** are the visible flame. They rise, slow down, fade and shrink
//!   over their lifetime and then disappear.
//!
//! Launchers spawn with velocities pointing away from the emitter's direction
//! of travel (see [`VelocityEnvelope`]), which leaves a trail behind a moving
//! flame.
//!
//! ## Testing without a GPU
//!
//! [`CpuFlame`] runs the same per-particle rules and buffer protocol on the
//! CPU. The update shader and [`simulate::step_particle`] draw the same random
//! numbers from the same [`RandomTable`].

pub mod config;
pub mod error;
pub mod flame;
pub mod gpu;
pub mod motion;
pub mod particle;
pub mod random;
pub mod shader_gen;
pub mod simulate;
pub mod spawn;
pub mod store;
pub mod textures;
pub mod time;
pub mod velocity;

pub use bytemuck;
pub use glam::{Mat4, Vec2, Vec3};

pub use config::FlameConfig;
pub use error::{ConfigError, FlameError, GpuError, TextureError, ViewerError};
pub use flame::Flame;
pub use motion::EmitterMotion;
pub use particle::{FlameParticle, ParticleKind, PARTICLE_LAYOUT, PARTICLE_STRIDE};
pub use random::RandomTable;
pub use simulate::{CpuFlame, PassParams};
pub use store::{BufferRoles, InputRange};
pub use velocity::VelocityEnvelope;

/// Common imports for driving an emitter.
pub mod prelude {
    pub use crate::config::FlameConfig;
    pub use crate::flame::Flame;
    pub use crate::gpu::Camera;
    pub use crate::particle::{FlameParticle, ParticleKind};
    pub use crate::time::Time;
    pub use glam::{Mat4, Vec2, Vec3};
}
