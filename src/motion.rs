//! Host-side motion of an emitter.

use glam::{Mat4, Vec3};

use crate::velocity::VelocityEnvelope;

/// Position, base velocity and the spawn envelope derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterMotion {
    position: Vec3,
    velocity: Vec3,
    envelope: VelocityEnvelope,
}

impl EmitterMotion {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            envelope: VelocityEnvelope::from_base(velocity),
        }
    }

    /// Advance by `delta_ms` milliseconds and refresh the envelope.
    pub fn update(&mut self, delta_ms: f32) {
        self.position += self.velocity * (delta_ms / 1000.0);
        self.envelope = VelocityEnvelope::from_base(self.velocity);
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.envelope = VelocityEnvelope::from_base(velocity);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn envelope(&self) -> VelocityEnvelope {
        self.envelope
    }

    /// Translation to the current position.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_integrates_velocity() {
        let mut motion = EmitterMotion::new(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.5, 0.4, 0.0));
        motion.update(250.0);
        assert!((motion.position() - Vec3::new(0.125, 0.4, 0.0)).length() < 1e-6);
        motion.update(250.0);
        assert!((motion.position() - Vec3::new(0.25, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_zero_delta_keeps_position() {
        let mut motion = EmitterMotion::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.5, 9.0));
        motion.update(0.0);
        assert_eq!(motion.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_new_velocity_refreshes_envelope() {
        let mut motion = EmitterMotion::new(Vec3::ZERO, Vec3::X);
        assert_eq!(motion.envelope(), VelocityEnvelope::from_base(Vec3::X));

        motion.set_velocity(Vec3::new(0.0, 1.0, -2.0));
        motion.update(16.0);
        assert_eq!(motion.envelope(), VelocityEnvelope::from_base(Vec3::new(0.0, 1.0, -2.0)));
        assert_eq!(motion.envelope().max, Vec3::new(0.0, -2.0, 1.0));
        assert_eq!(motion.envelope().min, Vec3::new(0.0, -0.5, 4.0));
        assert!((motion.position() - Vec3::new(0.0, 0.016, -0.032)).length() < 1e-6);
    }

    #[test]
    fn test_model_matrix_translates() {
        let mut motion = EmitterMotion::new(Vec3::ZERO, Vec3::ZERO);
        motion.set_position(Vec3::new(0.2, -0.1, 0.3));
        let origin = motion.model_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(0.2, -0.1, 0.3));
    }
}
