//! Behavioral properties of the emitter, checked against the CPU pipeline.
//!
//! `CpuFlame` follows the same buffer protocol and per-particle rules as the
//! GPU passes, so these tests describe what a frame does on the device.

use ember::spawn::initial_population;
use ember::{CpuFlame, FlameConfig, FlameParticle, ParticleKind, PassParams, RandomTable, VelocityEnvelope};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Helpers
// ============================================================================

struct Setup {
    config: FlameConfig,
    envelope: VelocityEnvelope,
    flame: CpuFlame,
    population: Vec<FlameParticle>,
    rng: StdRng,
}

fn setup(config: FlameConfig) -> Setup {
    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(1));
    let table = RandomTable::build(config.random_texels, &mut rng).unwrap();
    let envelope = VelocityEnvelope::from_base(config.velocity);
    let population = initial_population(&config, &envelope, &mut rng);
    let mut flame = CpuFlame::new(config.capacity, table);
    flame.initialize(&population);
    Setup {
        config,
        envelope,
        flame,
        population,
        rng,
    }
}

impl Setup {
    fn params(&mut self, delta_ms: f32) -> PassParams {
        let seed = self.rng.gen::<f32>();
        PassParams::from_config(&self.config, self.envelope, delta_ms, seed)
    }

    fn frame(&mut self, delta_ms: f32) -> Vec<FlameParticle> {
        let params = self.params(delta_ms);
        self.flame.step(&params).to_vec()
    }
}

fn launchers(rows: &[FlameParticle]) -> usize {
    rows.iter().filter(|p| p.is_launcher()).count()
}

// ============================================================================
// Frame protocol
// ============================================================================

#[test]
fn test_zero_delta_keeps_population() {
    let mut s = setup(FlameConfig::default().with_seed(3));
    let out = s.frame(0.0);
    assert_eq!(out, s.population);
}

#[test]
fn test_zero_delta_is_stable_over_many_frames() {
    let mut s = setup(FlameConfig::default().with_seed(4).with_initial_particles(50));
    for _ in 0..5 {
        assert_eq!(s.frame(0.0), s.population);
    }
}

#[test]
fn test_swap_twice_restores_roles() {
    let mut s = setup(FlameConfig::default().with_seed(5));
    let before = s.flame.roles();
    s.flame.swap();
    assert_ne!(s.flame.roles().current(), before.current());
    s.flame.swap();
    assert_eq!(s.flame.roles().current(), before.current());
    assert_eq!(s.flame.roles().target(), before.target());
}

#[test]
fn test_frame_renders_freshly_written_buffer() {
    let mut s = setup(FlameConfig::default().with_seed(6));
    let params = s.params(16.0);
    s.flame.simulate(&params);
    let written = s.flame.target_particles().to_vec();
    s.flame.swap();
    assert_eq!(s.flame.particles(), written.as_slice());
}

// ============================================================================
// Launchers
// ============================================================================

#[test]
fn test_launcher_age_never_decreases() {
    let mut s = setup(FlameConfig::default().with_seed(7));
    let population: Vec<FlameParticle> = (0..32)
        .map(|i| {
            let mut p = FlameParticle::spawn(ParticleKind::Launcher, Vec3::ZERO, Vec3::ZERO, 1000.0, 30.0);
            p.age = i as f32 * 10.0;
            p
        })
        .collect();
    s.flame.initialize(&population);

    let mut before = population;
    for delta in [0.0, 12.0, 3.5, 40.0] {
        let out = s.frame(delta);
        assert_eq!(out.len(), before.len());
        for (old, new) in before.iter().zip(&out) {
            assert!(new.age >= old.age);
            assert_eq!(new.position, old.position);
        }
        before = out;
    }
}

#[test]
fn test_launcher_count_is_conserved() {
    let config = FlameConfig::default()
        .with_seed(8)
        .with_shells_per_launcher(3)
        .with_capacity(1200)
        .with_initial_particles(400);
    let mut s = setup(config);
    for _ in 0..120 {
        let out = s.frame(16.0);
        assert_eq!(launchers(&out), 400);
    }
}

#[test]
fn test_expired_launcher_respawns_at_anchor() {
    let anchor = Vec3::new(0.2, -0.1, 0.3);
    let config = FlameConfig::default()
        .with_seed(9)
        .with_anchor(anchor)
        .with_initial_particles(1)
        .with_life(100.0, 100.0);
    let mut s = setup(config);

    let mut launcher = FlameParticle::spawn(
        ParticleKind::Launcher,
        Vec3::new(5.0, 5.0, 5.0),
        Vec3::ZERO,
        100.0,
        30.0,
    );
    launcher.age = 99.0;
    s.flame.initialize(&[launcher]);

    let out = s.frame(16.0);
    assert_eq!(out.len(), 2);
    let respawned = out.iter().find(|p| p.is_launcher()).unwrap();
    assert_eq!(respawned.age, 0.0);
    let radius = 10.0 * s.config.launcher_jitter * 2.0_f32.sqrt();
    assert!((respawned.position() - anchor).length() <= radius + 1e-6);

    let shell = out.iter().find(|p| !p.is_launcher()).unwrap();
    assert!((shell.position() - launcher.position()).length() < 0.2);
}

#[test]
fn test_launcher_velocity_points_away_from_travel() {
    let config = FlameConfig::default()
        .with_seed(10)
        .with_velocity(Vec3::new(1.0, 0.0, 0.0))
        .with_life(10.0, 10.0);
    let mut s = setup(config);
    // Everything expires on the first frame and respawns with fresh velocity.
    let out = s.frame(50.0);
    for p in out.iter().filter(|p| p.is_launcher()) {
        assert!(p.velocity[0] <= -0.5 + 1e-6 && p.velocity[0] >= -2.0 - 1e-6);
    }
}

// ============================================================================
// Shells
// ============================================================================

#[test]
fn test_shell_alpha_fades_with_age() {
    let config = FlameConfig::default().with_seed(11).with_initial_particles(1);
    let mut s = setup(config);
    let shell = FlameParticle::spawn(ParticleKind::Shell, Vec3::ZERO, Vec3::Y, 200.0, 30.0);
    s.flame.initialize(&[shell]);

    let mut last_alpha = 1.0;
    for _ in 0..9 {
        let out = s.frame(20.0);
        assert_eq!(out.len(), 1);
        assert!(out[0].alpha <= last_alpha);
        last_alpha = out[0].alpha;
    }
    // age 200 == life: still alive, fully transparent.
    let out = s.frame(20.0);
    assert_eq!(out.len(), 1);
    assert!(out[0].alpha.abs() < 1e-5);
    // Past its life the shell is gone.
    assert!(s.frame(20.0).is_empty());
}

#[test]
fn test_shells_rise() {
    let config = FlameConfig::default().with_seed(12).with_initial_particles(1);
    let mut s = setup(config);
    let shell = FlameParticle::spawn(ParticleKind::Shell, Vec3::ZERO, Vec3::ZERO, 1000.0, 30.0);
    s.flame.initialize(&[shell]);
    let mut height = 0.0;
    for _ in 0..10 {
        let out = s.frame(16.0);
        assert!(out[0].position[1] >= height);
        height = out[0].position[1];
    }
    assert!(height > 0.0);
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn test_capture_never_exceeds_capacity() {
    let config = FlameConfig::default()
        .with_seed(13)
        .with_capacity(300)
        .with_initial_particles(250)
        .with_shells_per_launcher(8)
        .with_life(20.0, 400.0);
    let mut s = setup(config);
    for _ in 0..200 {
        let out = s.frame(16.0);
        assert!(out.len() <= 300);
        assert_eq!(launchers(&out), 250);
    }
}

#[test]
fn test_guard_reports_dropped_shells() {
    let config = FlameConfig::default()
        .with_seed(14)
        .with_capacity(10)
        .with_initial_particles(10)
        .with_shells_per_launcher(4)
        .with_life(1.0, 1.0);
    let mut s = setup(config);
    let params = s.params(16.0);
    let stats = s.flame.simulate(&params);
    assert_eq!(stats.input, 10);
    assert_eq!(stats.captured, 10);
    assert_eq!(stats.dropped, 40);
}

#[test]
fn test_oversized_population_is_truncated() {
    let mut s = setup(FlameConfig::default().with_seed(15).with_capacity(64).with_initial_particles(64));
    let extra: Vec<FlameParticle> = s.population.iter().cycle().take(100).copied().collect();
    s.flame.initialize(&extra);
    assert_eq!(s.flame.particles().len(), 64);
    assert_eq!(s.frame(0.0).len(), 64);
}

// ============================================================================
// Velocity envelope
// ============================================================================

#[test]
fn test_envelope_antisymmetric_under_sign_flip() {
    let v = Vec3::new(0.5, -0.4, 1.2);
    let pos = VelocityEnvelope::from_base(v);
    let neg = VelocityEnvelope::from_base(-v);
    assert!((neg.max + pos.min).length() < 1e-6);
    assert!((neg.min + pos.max).length() < 1e-6);
    let r = Vec3::new(0.1, 0.6, 0.9);
    assert!((neg.sample(r) + pos.sample(Vec3::ONE - r)).length() < 1e-5);
}

#[test]
fn test_envelope_coefficients_before_inversion() {
    let (max, min) = VelocityEnvelope::bounds_before_inversion(Vec3::new(1.0, 2.0, 0.5));
    assert_eq!(max, Vec3::new(2.0, 4.0, 1.0));
    assert_eq!(min, Vec3::new(0.5, 1.0, 0.25));

    let env = VelocityEnvelope::from_base(Vec3::new(1.0, 2.0, 0.5));
    assert!(env.max.cmple(env.min).all());
}
