//! Flame emitter configuration.
//!
//! Every tunable of the emitter lives in [`FlameConfig`]. It can be built in
//! code with the `with_*` methods or loaded from JSON; any field missing from
//! the file keeps its default.
//!
//! ```ignore
//! let config = FlameConfig::default()
//!     .with_capacity(4000)
//!     .with_shells_per_launcher(2)
//!     .with_seed(42);
//! ```
//!
//! ```json
//! { "capacity": 4000, "shells_per_launcher": 2, "velocity": [0.0, 0.6, 0.0] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::random::DEFAULT_RANDOM_TEXELS;

/// Upper bound on shells emitted by one expiring launcher.
pub const MAX_SHELLS_PER_LAUNCHER: u32 = 8;

/// Upper bound on the random table size; the default 1-D texture limit.
pub const MAX_RANDOM_TEXELS: u32 = 8192;

/// Configuration for a [`Flame`](crate::Flame) emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameConfig {
    /// Maximum number of particle records per buffer.
    pub capacity: u32,
    /// Number of launchers in the initial population.
    pub initial_particles: u32,
    /// Shortest particle lifetime in milliseconds.
    pub min_life_ms: f32,
    /// Longest particle lifetime in milliseconds.
    pub max_life_ms: f32,
    /// Sprite diameter of launchers, in pixels.
    pub launcher_size: f32,
    /// Sprite diameter of freshly spawned shells, in pixels.
    pub shell_size: f32,
    /// Shell size at the end of its life, relative to `shell_size`.
    pub end_size_ratio: f32,
    /// Initial world position of the emitter.
    pub position: Vec3,
    /// Initial base velocity of the emitter. Drives the velocity envelope.
    pub velocity: Vec3,
    /// Model-space point where launchers respawn.
    pub anchor: Vec3,
    /// Upward acceleration applied to shells, units per second squared.
    pub buoyancy: f32,
    /// Linear velocity damping of shells, per second.
    pub drag: f32,
    /// Shells emitted by each expiring launcher.
    pub shells_per_launcher: u32,
    /// Jitter radius of shells around their launcher.
    pub shell_jitter: f32,
    /// Jitter radius of respawned launchers around the anchor.
    pub launcher_jitter: f32,
    /// Uniform samples summed per jitter axis.
    pub jitter_samples: u32,
    /// Texels in the random table.
    pub random_texels: u32,
    /// Fixed RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Spark sprite, bound to texture slot 0. `None` uses a generated soft sprite.
    pub spark_texture: Option<PathBuf>,
    /// Start/flare sprite, bound to texture slot 1. `None` uses a generated soft sprite.
    pub start_texture: Option<PathBuf>,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            capacity: 1800,
            initial_particles: 1000,
            min_life_ms: 100.0,
            max_life_ms: 200.0,
            launcher_size: 30.0,
            shell_size: 30.0,
            end_size_ratio: 0.5,
            position: Vec3::new(0.0, 0.3, 0.0),
            velocity: Vec3::new(0.5, 0.4, 0.0),
            anchor: Vec3::ZERO,
            buoyancy: 1.0,
            drag: 0.5,
            shells_per_launcher: 1,
            shell_jitter: 0.01,
            launcher_jitter: 0.001,
            jitter_samples: 10,
            random_texels: DEFAULT_RANDOM_TEXELS,
            seed: None,
            spark_texture: None,
            start_texture: None,
        }
    }
}

impl FlameConfig {
    /// Read a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if self.capacity == 0 {
            return invalid("capacity must be greater than zero".into());
        }
        if self.initial_particles > self.capacity {
            return invalid(format!(
                "initial_particles ({}) exceeds capacity ({})",
                self.initial_particles, self.capacity
            ));
        }
        if self.min_life_ms <= 0.0 {
            return invalid(format!("min_life_ms must be positive, got {}", self.min_life_ms));
        }
        if self.min_life_ms > self.max_life_ms {
            return invalid(format!(
                "min_life_ms ({}) exceeds max_life_ms ({})",
                self.min_life_ms, self.max_life_ms
            ));
        }
        if self.random_texels == 0 || self.random_texels > MAX_RANDOM_TEXELS {
            return invalid(format!(
                "random_texels must be in 1..={}, got {}",
                MAX_RANDOM_TEXELS, self.random_texels
            ));
        }
        if self.jitter_samples == 0 {
            return invalid("jitter_samples must be greater than zero".into());
        }
        if self.shells_per_launcher > MAX_SHELLS_PER_LAUNCHER {
            return invalid(format!(
                "shells_per_launcher ({}) exceeds {}",
                self.shells_per_launcher, MAX_SHELLS_PER_LAUNCHER
            ));
        }
        Ok(())
    }

    /// The emitter's random generator, seeded once.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_initial_particles(mut self, count: u32) -> Self {
        self.initial_particles = count;
        self
    }

    /// Set the lifetime range in milliseconds.
    pub fn with_life(mut self, min_ms: f32, max_ms: f32) -> Self {
        self.min_life_ms = min_ms;
        self.max_life_ms = max_ms;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_anchor(mut self, anchor: Vec3) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_buoyancy(mut self, buoyancy: f32) -> Self {
        self.buoyancy = buoyancy;
        self
    }

    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_shells_per_launcher(mut self, count: u32) -> Self {
        self.shells_per_launcher = count;
        self
    }

    /// Set the jitter radii and the number of samples summed per axis.
    pub fn with_jitter(mut self, launcher: f32, shell: f32, samples: u32) -> Self {
        self.launcher_jitter = launcher;
        self.shell_jitter = shell;
        self.jitter_samples = samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the sprite images for texture slots 0 (spark) and 1 (start).
    pub fn with_textures(mut self, spark: impl Into<PathBuf>, start: impl Into<PathBuf>) -> Self {
        self.spark_texture = Some(spark.into());
        self.start_texture = Some(start.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FlameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity, 1800);
        assert_eq!(config.initial_particles, 1000);
        assert_eq!(config.random_texels, 580);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = FlameConfig::from_json(r#"{ "capacity": 4000, "velocity": [0.0, 0.6, 0.0] }"#).unwrap();
        assert_eq!(config.capacity, 4000);
        assert_eq!(config.velocity, Vec3::new(0.0, 0.6, 0.0));
        assert_eq!(config.initial_particles, 1000);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_json_round_trip() {
        let config = FlameConfig::default().with_seed(9).with_textures("a.png", "b.png");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(FlameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            FlameConfig::default().with_capacity(0),
            FlameConfig::default().with_initial_particles(5000),
            FlameConfig::default().with_life(0.0, 10.0),
            FlameConfig::default().with_life(300.0, 200.0),
            FlameConfig::default().with_jitter(0.1, 0.1, 0),
            FlameConfig::default().with_shells_per_launcher(MAX_SHELLS_PER_LAUNCHER + 1),
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "{config:?}");
        }
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(
            FlameConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            FlameConfig::from_json(r#"{ "capacity": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        use rand::Rng;
        let config = FlameConfig::default().with_seed(5);
        let a: f32 = config.rng().gen();
        let b: f32 = config.rng().gen();
        assert_eq!(a, b);
    }
}
