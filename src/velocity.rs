//! Spawn-velocity envelope derived from the emitter's base velocity.
//!
//! Each axis maps the base velocity `v` to a range using asymmetric
//! coefficients: the larger-magnitude bound is `2.0 * v`, the smaller is
//! `0.5 * v`. The whole range is then negated, so particles leave the emitter
//! opposite to the direction it travels, and `delta = max - min` is kept for
//! sampling as `min + delta * r` with `r` in `[0, 1)³`.
//!
//! After the negation `max <= min` on every axis. This inversion is
//! intentional: sampling still covers exactly the negated range.

use glam::Vec3;

/// Coefficient for the larger-magnitude bound.
pub const MAX_COEFF: f32 = 2.0;
/// Coefficient for the smaller-magnitude bound.
pub const MIN_COEFF: f32 = 0.5;

/// Derived spawn-velocity range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityEnvelope {
    pub min: Vec3,
    pub max: Vec3,
    pub delta: Vec3,
}

impl VelocityEnvelope {
    /// Compute the envelope for a base velocity.
    pub fn from_base(base: Vec3) -> Self {
        let (max, min) = Self::bounds_before_inversion(base);
        let (max, min) = (-max, -min);
        Self {
            min,
            max,
            delta: max - min,
        }
    }

    /// The `(max, min)` pair before the final negation.
    ///
    /// Here `max >= min` holds on every axis.
    pub fn bounds_before_inversion(base: Vec3) -> (Vec3, Vec3) {
        let x = axis_bounds(base.x);
        let y = axis_bounds(base.y);
        let z = axis_bounds(base.z);
        (Vec3::new(x.0, y.0, z.0), Vec3::new(x.1, y.1, z.1))
    }

    /// Velocity for a random vector `r` in `[0, 1)³`.
    #[inline]
    pub fn sample(&self, r: Vec3) -> Vec3 {
        self.min + self.delta * r
    }
}

fn axis_bounds(v: f32) -> (f32, f32) {
    if v >= 0.0 {
        (v * MAX_COEFF, v * MIN_COEFF)
    } else {
        (v * MIN_COEFF, v * MAX_COEFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_axis() {
        let env = VelocityEnvelope::from_base(Vec3::new(0.5, 0.4, 0.0));
        assert_eq!(env.max, Vec3::new(-1.0, -0.8, 0.0));
        assert_eq!(env.min, Vec3::new(-0.25, -0.2, 0.0));
        assert_eq!(env.delta, env.max - env.min);
    }

    #[test]
    fn test_negative_axis() {
        let env = VelocityEnvelope::from_base(Vec3::new(-1.0, 0.0, 0.0));
        // Before negation: max = -0.5, min = -2.0.
        assert_eq!(env.max.x, 0.5);
        assert_eq!(env.min.x, 2.0);
        assert_eq!(env.delta.x, -1.5);
    }

    #[test]
    fn test_zero_base_is_zero_envelope() {
        let env = VelocityEnvelope::from_base(Vec3::ZERO);
        assert_eq!(env.min, Vec3::ZERO);
        assert_eq!(env.max, Vec3::ZERO);
        assert_eq!(env.delta, Vec3::ZERO);
        assert_eq!(env.sample(Vec3::splat(0.7)), Vec3::ZERO);
    }

    #[test]
    fn test_sample_spans_range() {
        let env = VelocityEnvelope::from_base(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(env.sample(Vec3::ZERO), env.min);
        assert!((env.sample(Vec3::ONE) - env.max).length() < 1e-6);
    }
}
