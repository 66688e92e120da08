//! Per-particle update rules and a CPU stand-in for the GPU pipeline.
//!
//! [`step_particle`] is the same function the update shader runs for every
//! input row, written once more in Rust. [`CpuFlame`] drives it over two
//! `Vec` buffers with the exact alternation protocol and capacity guard of the
//! GPU store, which makes the emitter's behavior testable without a device.
//!
//! # Rules
//!
//! Every particle first ages by `delta_ms`. Then:
//!
//! - A **launcher** past its lifetime emits `shells_per_launcher` shells at its
//!   own position (plus jitter) and a replacement launcher at the anchor.
//!   Otherwise it is passed through with its position untouched.
//! - A **shell** past its lifetime emits nothing. Otherwise it moves by its
//!   velocity, is damped by drag, lifted by buoyancy, and fades and shrinks
//!   with the elapsed fraction of its life.

use glam::Vec3;

use crate::config::FlameConfig;
use crate::particle::{FlameParticle, ParticleKind};
use crate::random::{RandomStream, RandomTable};
use crate::store::{BufferRoles, InputRange};
use crate::velocity::VelocityEnvelope;

/// Values shared by every invocation of one simulation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassParams {
    pub delta_ms: f32,
    pub min_life: f32,
    pub max_life: f32,
    pub envelope: VelocityEnvelope,
    pub anchor: Vec3,
    /// Per-pass offset into the random table, in `[0, 1)`.
    pub seed: f32,
    pub shells_per_launcher: u32,
    pub shell_jitter: f32,
    pub launcher_jitter: f32,
    pub jitter_samples: u32,
    pub launcher_size: f32,
    pub shell_size: f32,
    pub end_size_ratio: f32,
    pub buoyancy: f32,
    pub drag: f32,
}

impl PassParams {
    pub fn from_config(config: &FlameConfig, envelope: VelocityEnvelope, delta_ms: f32, seed: f32) -> Self {
        Self {
            delta_ms: delta_ms.max(0.0),
            min_life: config.min_life_ms,
            max_life: config.max_life_ms,
            envelope,
            anchor: config.anchor,
            seed,
            shells_per_launcher: config.shells_per_launcher,
            shell_jitter: config.shell_jitter,
            launcher_jitter: config.launcher_jitter,
            jitter_samples: config.jitter_samples,
            launcher_size: config.launcher_size,
            shell_size: config.shell_size,
            end_size_ratio: config.end_size_ratio,
            buoyancy: config.buoyancy,
            drag: config.drag,
        }
    }

    /// Same parameters with a different time step.
    pub fn with_delta(mut self, delta_ms: f32) -> Self {
        self.delta_ms = delta_ms.max(0.0);
        self
    }

    /// Same parameters with a different random offset.
    pub fn with_seed(mut self, seed: f32) -> Self {
        self.seed = seed;
        self
    }
}

/// Advance one particle and hand every record it produces to `emit`.
///
/// Shells are emitted before the replacement launcher, matching the GPU
/// shader so both consume random draws in the same order.
pub fn step_particle(
    index: u32,
    particle: &FlameParticle,
    params: &PassParams,
    table: &RandomTable,
    mut emit: impl FnMut(FlameParticle),
) {
    let mut p = *particle;
    p.age += params.delta_ms;

    match p.kind() {
        ParticleKind::Launcher => {
            if !p.is_expired() {
                emit(p);
                return;
            }
            let mut random = RandomStream::new(table, params.seed, index);
            for _ in 0..params.shells_per_launcher {
                let offset = random.jitter(params.jitter_samples, params.shell_jitter);
                emit(respawn(
                    ParticleKind::Shell,
                    p.position() + offset,
                    params.shell_size,
                    params,
                    &mut random,
                ));
            }
            let offset = random.jitter(params.jitter_samples, params.launcher_jitter);
            emit(respawn(
                ParticleKind::Launcher,
                params.anchor + offset,
                params.launcher_size,
                params,
                &mut random,
            ));
        }
        ParticleKind::Shell => {
            if p.is_expired() {
                return;
            }
            let dt = params.delta_ms * 0.001;
            let t = p.life_fraction();
            let mut velocity = p.velocity();
            p.position = (p.position() + velocity * dt).to_array();
            velocity *= (1.0 - params.drag * dt).max(0.0);
            velocity.y += params.buoyancy * dt;
            p.velocity = velocity.to_array();
            p.alpha = 1.0 - t;
            p.size = params.shell_size * (1.0 + (params.end_size_ratio - 1.0) * t);
            emit(p);
        }
    }
}

fn respawn(
    kind: ParticleKind,
    position: Vec3,
    size: f32,
    params: &PassParams,
    random: &mut RandomStream<'_>,
) -> FlameParticle {
    let velocity = params.envelope.sample(random.next_vec3());
    let life = params.min_life + (params.max_life - params.min_life) * random.next_vec3().x;
    FlameParticle::spawn(kind, position, velocity, life, size)
}

/// Destination of one pass with the same slot limits as the GPU capture target.
///
/// Launchers may fill the buffer up to `capacity`; shells stop at
/// `capacity - launcher_count` so every replacement launcher always fits.
pub struct Capture<'a> {
    rows: &'a mut Vec<FlameParticle>,
    capacity: usize,
    shell_limit: usize,
    dropped: usize,
}

impl<'a> Capture<'a> {
    pub fn new(rows: &'a mut Vec<FlameParticle>, capacity: usize, launcher_count: usize) -> Self {
        rows.clear();
        Self {
            rows,
            capacity,
            shell_limit: capacity.saturating_sub(launcher_count),
            dropped: 0,
        }
    }

    /// Append a row if its kind still has room. Returns whether it was kept.
    pub fn emit(&mut self, p: FlameParticle) -> bool {
        let limit = if p.is_launcher() { self.capacity } else { self.shell_limit };
        if self.rows.len() >= limit {
            self.dropped += 1;
            return false;
        }
        self.rows.push(p);
        true
    }

    /// Rows refused by the capacity guard so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Statistics of one CPU pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    pub input: usize,
    pub captured: usize,
    pub dropped: usize,
}

/// Software stand-in for the GPU particle store and simulation stage.
pub struct CpuFlame {
    buffers: [Vec<FlameParticle>; 2],
    roles: BufferRoles,
    capacity: usize,
    launcher_count: usize,
    table: RandomTable,
}

impl CpuFlame {
    pub fn new(capacity: u32, table: RandomTable) -> Self {
        Self {
            buffers: [Vec::new(), Vec::new()],
            roles: BufferRoles::new(),
            capacity: capacity as usize,
            launcher_count: 0,
            table,
        }
    }

    /// Load the initial population into both buffers.
    ///
    /// Rows beyond capacity are discarded with a warning.
    pub fn initialize(&mut self, population: &[FlameParticle]) {
        let rows = if population.len() > self.capacity {
            log::warn!(
                "Initial population of {} exceeds capacity {}, truncating",
                population.len(),
                self.capacity
            );
            &population[..self.capacity]
        } else {
            population
        };
        self.launcher_count = rows.iter().filter(|p| p.is_launcher()).count();
        for buffer in &mut self.buffers {
            buffer.clear();
            buffer.extend_from_slice(rows);
        }
        self.roles.arm(rows.len() as u32);
    }

    /// Run one pass from `current` into `target` without swapping.
    pub fn simulate(&mut self, params: &PassParams) -> PassStats {
        let range = self.roles.begin_pass();
        let [a, b] = &mut self.buffers;
        let (source, dest) = if self.roles.current() == 0 { (&*a, b) } else { (&*b, a) };

        let input = match range {
            InputRange::Initial(n) => &source[..(n as usize).min(source.len())],
            InputRange::Captured => &source[..],
        };

        let mut capture = Capture::new(dest, self.capacity, self.launcher_count);
        for (index, particle) in input.iter().enumerate() {
            step_particle(index as u32, particle, params, &self.table, |p| {
                capture.emit(p);
            });
        }
        let dropped = capture.dropped();

        PassStats {
            input: input.len(),
            captured: self.buffers[self.roles.target()].len(),
            dropped,
        }
    }

    /// Mirror of one rendered frame: simulate, read the written buffer, swap.
    ///
    /// Returns the rows that would be drawn this frame.
    pub fn step(&mut self, params: &PassParams) -> &[FlameParticle] {
        self.simulate(params);
        self.roles.swap();
        &self.buffers[self.roles.current()]
    }

    pub fn swap(&mut self) {
        self.roles.swap();
    }

    /// The valid population.
    pub fn particles(&self) -> &[FlameParticle] {
        &self.buffers[self.roles.current()]
    }

    /// The buffer the next pass will overwrite.
    pub fn target_particles(&self) -> &[FlameParticle] {
        &self.buffers[self.roles.target()]
    }

    pub fn roles(&self) -> BufferRoles {
        self.roles
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn launcher_count(&self) -> usize {
        self.launcher_count
    }

    pub fn table(&self) -> &RandomTable {
        &self.table
    }
}
