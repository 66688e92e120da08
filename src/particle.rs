//! The flame particle record and its binary layout contract.
//!
//! The simulation pass writes [`FlameParticle`] rows as raw storage, and the
//! render pass reads the very same bytes back as per-instance vertex data. Both
//! sides are generated from [`PARTICLE_LAYOUT`] instead of being written by
//! hand, and the layout is checked at compile time against the Rust struct and
//! against the capture output names in [`CAPTURE_OUTPUTS`].
//!
//! # Layout
//!
//! | Field      | Offset | Components | Capture name |
//! |------------|--------|------------|--------------|
//! | `kind`     | 0      | 1          | `Type1`      |
//! | `position` | 4      | 3          | `Position1`  |
//! | `velocity` | 16     | 3          | `Velocity1`  |
//! | `age`      | 28     | 1          | `Age1`       |
//! | `alpha`    | 32     | 1          | `Alpha1`     |
//! | `size`     | 36     | 1          | `Size1`      |
//! | `life`     | 40     | 1          | `Life1`      |
//!
//! Every component is an `f32`, so the stride is 44 bytes with no padding.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Names of the captured simulation outputs, in record order.
pub const CAPTURE_OUTPUTS: [&str; 7] = [
    "Type1",
    "Position1",
    "Velocity1",
    "Age1",
    "Alpha1",
    "Size1",
    "Life1",
];

/// Fields consumed by the render stage, in shader location order.
///
/// Velocity and type are never read when drawing.
pub const RENDER_INPUTS: [&str; 5] = ["Position1", "Alpha1", "Size1", "Age1", "Life1"];

/// Spawn behavior of a particle, stored as an `f32` in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Never depletes. Respawns itself and emits shells when it expires.
    Launcher,
    /// A visible flame fragment that disappears at the end of its life.
    Shell,
}

impl ParticleKind {
    /// Encoded value written into the `Type1` column.
    pub const fn as_f32(self) -> f32 {
        match self {
            ParticleKind::Launcher => 0.0,
            ParticleKind::Shell => 1.0,
        }
    }

    /// Decode a `Type1` value. Anything at or above 0.5 is a shell.
    pub fn from_f32(value: f32) -> Self {
        if value >= 0.5 {
            ParticleKind::Shell
        } else {
            ParticleKind::Launcher
        }
    }
}

/// One simulated particle, laid out exactly as the GPU sees it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FlameParticle {
    /// [`ParticleKind`] encoded as a float.
    pub kind: f32,
    /// Model-space position.
    pub position: [f32; 3],
    /// Velocity in units per second.
    pub velocity: [f32; 3],
    /// Milliseconds since spawn.
    pub age: f32,
    /// Opacity used for blending.
    pub alpha: f32,
    /// Sprite diameter in pixels.
    pub size: f32,
    /// Lifetime budget in milliseconds.
    pub life: f32,
}

impl FlameParticle {
    /// Create a fresh particle of the given kind with zero age and full opacity.
    pub fn spawn(kind: ParticleKind, position: Vec3, velocity: Vec3, life: f32, size: f32) -> Self {
        Self {
            kind: kind.as_f32(),
            position: position.to_array(),
            velocity: velocity.to_array(),
            age: 0.0,
            alpha: 1.0,
            size,
            life,
        }
    }

    #[inline]
    pub fn kind(&self) -> ParticleKind {
        ParticleKind::from_f32(self.kind)
    }

    #[inline]
    pub fn is_launcher(&self) -> bool {
        self.kind() == ParticleKind::Launcher
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        Vec3::from_array(self.velocity)
    }

    /// Elapsed fraction of the lifetime, clamped to `[0, 1]`.
    ///
    /// A particle with no lifetime budget counts as fully spent.
    pub fn life_fraction(&self) -> f32 {
        if self.life > 0.0 {
            (self.age / self.life).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Whether the particle has outlived its budget.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age > self.life
    }
}

/// One column of the particle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    /// Capture output name, also used as the WGSL record member name.
    pub name: &'static str,
    /// Friendly member name used by shader code (`p.position`, `p.age`, ...).
    pub member: &'static str,
    /// Byte offset inside the record.
    pub offset: u32,
    /// Number of `f32` components.
    pub components: u32,
}

impl FieldLayout {
    /// Size of the column in bytes.
    pub const fn size(&self) -> u32 {
        self.components * 4
    }

    /// WGSL type of the friendly member.
    pub fn wgsl_type(&self) -> String {
        match self.components {
            1 => "f32".to_string(),
            n => format!("vec{n}<f32>"),
        }
    }
}

/// Byte stride between consecutive records.
pub const PARTICLE_STRIDE: u32 = size_of::<FlameParticle>() as u32;

/// The shared record schema, in capture order.
pub const PARTICLE_LAYOUT: [FieldLayout; 7] = [
    FieldLayout { name: "Type1", member: "kind", offset: 0, components: 1 },
    FieldLayout { name: "Position1", member: "position", offset: 4, components: 3 },
    FieldLayout { name: "Velocity1", member: "velocity", offset: 16, components: 3 },
    FieldLayout { name: "Age1", member: "age", offset: 28, components: 1 },
    FieldLayout { name: "Alpha1", member: "alpha", offset: 32, components: 1 },
    FieldLayout { name: "Size1", member: "size", offset: 36, components: 1 },
    FieldLayout { name: "Life1", member: "life", offset: 40, components: 1 },
];

/// Look up a column by capture name.
pub fn field(name: &str) -> Option<&'static FieldLayout> {
    PARTICLE_LAYOUT.iter().find(|f| f.name == name)
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Names follow [`CAPTURE_OUTPUTS`] and columns are packed back to back.
const fn layout_is_packed() -> bool {
    let mut i = 0;
    let mut expected = 0;
    while i < PARTICLE_LAYOUT.len() {
        let f = PARTICLE_LAYOUT[i];
        if !str_eq(f.name, CAPTURE_OUTPUTS[i]) || f.offset != expected {
            return false;
        }
        expected += f.size();
        i += 1;
    }
    expected == PARTICLE_STRIDE
}

const _: () = assert!(layout_is_packed(), "particle layout does not match capture outputs");
const _: () = assert!(offset_of!(FlameParticle, kind) == PARTICLE_LAYOUT[0].offset as usize);
const _: () = assert!(offset_of!(FlameParticle, position) == PARTICLE_LAYOUT[1].offset as usize);
const _: () = assert!(offset_of!(FlameParticle, velocity) == PARTICLE_LAYOUT[2].offset as usize);
const _: () = assert!(offset_of!(FlameParticle, age) == PARTICLE_LAYOUT[3].offset as usize);
const _: () = assert!(offset_of!(FlameParticle, alpha) == PARTICLE_LAYOUT[4].offset as usize);
const _: () = assert!(offset_of!(FlameParticle, size) == PARTICLE_LAYOUT[5].offset as usize);
const _: () = assert!(offset_of!(FlameParticle, life) == PARTICLE_LAYOUT[6].offset as usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_44_bytes() {
        assert_eq!(PARTICLE_STRIDE, 44);
        assert_eq!(std::mem::align_of::<FlameParticle>(), 4);
    }

    #[test]
    fn test_kind_encoding() {
        assert_eq!(ParticleKind::from_f32(ParticleKind::Launcher.as_f32()), ParticleKind::Launcher);
        assert_eq!(ParticleKind::from_f32(ParticleKind::Shell.as_f32()), ParticleKind::Shell);
        assert_eq!(ParticleKind::from_f32(0.49), ParticleKind::Launcher);
    }

    #[test]
    fn test_render_inputs_exist_in_layout() {
        for name in RENDER_INPUTS {
            assert!(field(name).is_some(), "missing render input {name}");
        }
        assert!(!RENDER_INPUTS.contains(&"Velocity1"));
        assert!(!RENDER_INPUTS.contains(&"Type1"));
    }

    #[test]
    fn test_bytes_follow_layout() {
        let p = FlameParticle {
            kind: 1.0,
            position: [2.0, 3.0, 4.0],
            velocity: [5.0, 6.0, 7.0],
            age: 8.0,
            alpha: 9.0,
            size: 10.0,
            life: 11.0,
        };
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&p));
        for f in &PARTICLE_LAYOUT {
            let first = (f.offset / 4) as usize;
            let expected = match f.member {
                "kind" => 1.0,
                "position" => 2.0,
                "velocity" => 5.0,
                "age" => 8.0,
                "alpha" => 9.0,
                "size" => 10.0,
                "life" => 11.0,
                other => panic!("unexpected member {other}"),
            };
            assert_eq!(floats[first], expected, "column {}", f.name);
        }
    }

    #[test]
    fn test_life_fraction() {
        let mut p = FlameParticle::spawn(ParticleKind::Shell, Vec3::ZERO, Vec3::ZERO, 200.0, 30.0);
        assert_eq!(p.life_fraction(), 0.0);
        p.age = 100.0;
        assert_eq!(p.life_fraction(), 0.5);
        p.age = 250.0;
        assert_eq!(p.life_fraction(), 1.0);
        assert!(p.is_expired());

        p.life = 0.0;
        assert_eq!(p.life_fraction(), 1.0);
    }
}
