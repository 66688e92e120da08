//! WGSL generation from the particle schema.
//!
//! The simulation shader sees particles through two structs:
//!
//! - `ParticleRecord`: the storage layout, one scalar member per component,
//!   named after the capture outputs (`Type1`, `Position1_x`, ..., `Life1`).
//!   Using scalars keeps the WGSL stride at 44 bytes; a `vec3<f32>` member
//!   would be padded to 16.
//! - `Particle`: a friendly view with `vec3` members, converted with
//!   `unpack_particle` / `pack_particle`.
//!
//! The render shader gets `ParticleInstance`, the per-instance vertex input
//! built from [`RENDER_INPUTS`] in location order.

use crate::particle::{field, FieldLayout, PARTICLE_LAYOUT, RENDER_INPUTS};

const UPDATE_BODY: &str = include_str!("shaders/flame_update.wgsl");
const RENDER_BODY: &str = include_str!("shaders/flame_render.wgsl");

const AXES: [&str; 4] = ["x", "y", "z", "w"];

/// Storage member names of one column, e.g. `Position1_x`, `Position1_y`, ...
pub fn record_members(field: &FieldLayout) -> Vec<String> {
    if field.components == 1 {
        vec![field.name.to_string()]
    } else {
        AXES[..field.components as usize]
            .iter()
            .map(|axis| format!("{}_{}", field.name, axis))
            .collect()
    }
}

/// `ParticleRecord`, `Particle` and the conversion helpers.
pub fn particle_wgsl() -> String {
    let mut record = String::from("struct ParticleRecord {\n");
    let mut friendly = String::from("struct Particle {\n");
    let mut unpack = String::from("fn unpack_particle(r: ParticleRecord) -> Particle {\n    var p: Particle;\n");
    let mut pack = String::from("fn pack_particle(p: Particle) -> ParticleRecord {\n    var r: ParticleRecord;\n");

    for f in &PARTICLE_LAYOUT {
        let members = record_members(f);
        for m in &members {
            record.push_str(&format!("    {m}: f32,\n"));
        }
        friendly.push_str(&format!("    {}: {},\n", f.member, f.wgsl_type()));

        if members.len() == 1 {
            unpack.push_str(&format!("    p.{} = r.{};\n", f.member, members[0]));
            pack.push_str(&format!("    r.{} = p.{};\n", members[0], f.member));
        } else {
            let parts: Vec<String> = members.iter().map(|m| format!("r.{m}")).collect();
            unpack.push_str(&format!(
                "    p.{} = {}({});\n",
                f.member,
                f.wgsl_type(),
                parts.join(", ")
            ));
            for (m, axis) in members.iter().zip(AXES) {
                pack.push_str(&format!("    r.{m} = p.{}.{axis};\n", f.member));
            }
        }
    }

    record.push_str("}\n");
    friendly.push_str("}\n");
    unpack.push_str("    return p;\n}\n");
    pack.push_str("    return r;\n}\n");

    format!("{record}\n{friendly}\n{unpack}\n{pack}")
}

/// Per-instance vertex input of the render stage.
pub fn instance_input_wgsl() -> String {
    let mut code = String::from("struct ParticleInstance {\n");
    for (location, name) in RENDER_INPUTS.iter().enumerate() {
        if let Some(f) = field(name) {
            code.push_str(&format!(
                "    @location({location}) {}: {},\n",
                f.member,
                f.wgsl_type()
            ));
        }
    }
    code.push_str("}\n");
    code
}

/// Complete simulation compute shader.
pub fn update_shader() -> String {
    format!("{}\n{}", particle_wgsl(), UPDATE_BODY)
}

/// Complete render shader.
pub fn render_shader() -> String {
    format!("{}\n{}", instance_input_wgsl(), RENDER_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_members_follow_capture_names() {
        let names: Vec<String> = PARTICLE_LAYOUT.iter().flat_map(record_members).collect();
        assert_eq!(
            names,
            [
                "Type1",
                "Position1_x",
                "Position1_y",
                "Position1_z",
                "Velocity1_x",
                "Velocity1_y",
                "Velocity1_z",
                "Age1",
                "Alpha1",
                "Size1",
                "Life1",
            ]
        );
    }

    #[test]
    fn test_particle_wgsl_round_trips_vectors() {
        let code = particle_wgsl();
        assert!(code.contains("p.position = vec3<f32>(r.Position1_x, r.Position1_y, r.Position1_z);"));
        assert!(code.contains("r.Velocity1_z = p.velocity.z;"));
        assert!(code.contains("p.life = r.Life1;"));
    }

    #[test]
    fn test_instance_input_locations() {
        let code = instance_input_wgsl();
        assert!(code.contains("@location(0) position: vec3<f32>"));
        assert!(code.contains("@location(1) alpha: f32"));
        assert!(code.contains("@location(4) life: f32"));
        assert!(!code.contains("velocity"));
    }

    #[test]
    fn test_shaders_have_entry_points() {
        assert!(update_shader().contains("fn main("));
        let render = render_shader();
        assert!(render.contains("fn vs_main("));
        assert!(render.contains("fn fs_main("));
    }
}
