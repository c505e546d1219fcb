use glam::{Mat2, Vec2};

use super::utils::{inverse_or_identity, wrap_angle};

/// A planar rigid transformation combining position and rotation.
///
/// The rotation is stored both as an angle and as the derived matrix so that
/// repeated point transforms don't recompute `sin`/`cos`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// Position (translation)
    pub position: Vec2,
    /// Orientation in radians
    pub angle: f32,
    /// Rotation matrix derived from `angle`
    pub rotation: Mat2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform (no translation or rotation)
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        angle: 0.0,
        rotation: Mat2::IDENTITY,
    };

    /// Creates a new transform from position and angle
    #[inline]
    pub fn new(position: Vec2, angle: f32) -> Self {
        let angle = wrap_angle(angle);
        Self {
            position,
            angle,
            rotation: Mat2::from_angle(angle),
        }
    }

    /// Creates a transform with only translation
    #[inline]
    pub const fn from_position(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
            rotation: Mat2::IDENTITY,
        }
    }

    /// Transforms a point from local space to world space
    #[inline]
    pub fn transform_point(self, point: Vec2) -> Vec2 {
        self.rotation * point + self.position
    }

    /// Transforms a direction from local space to world space
    #[inline]
    pub fn transform_vector(self, vector: Vec2) -> Vec2 {
        self.rotation * vector
    }

    /// Transforms a point from world space to local space
    #[inline]
    pub fn inverse_transform_point(self, point: Vec2) -> Vec2 {
        inverse_or_identity(self.rotation) * (point - self.position)
    }

    /// Transforms a direction from world space to local space
    #[inline]
    pub fn inverse_transform_vector(self, vector: Vec2) -> Vec2 {
        inverse_or_identity(self.rotation) * vector
    }

    /// Local X axis in world space
    #[inline]
    pub fn local_x(self) -> Vec2 {
        self.rotation.x_axis
    }

    /// Local Y axis in world space
    #[inline]
    pub fn local_y(self) -> Vec2 {
        self.rotation.y_axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn vec2_approx_eq(a: Vec2, b: Vec2) -> bool {
        a.distance_squared(b) < EPSILON * EPSILON
    }

    #[test]
    fn test_identity() {
        let t = Transform::IDENTITY;
        let p = Vec2::new(1.0, 2.0);

        assert!(vec2_approx_eq(t.transform_point(p), p));
        assert!(vec2_approx_eq(t.transform_vector(p), p));
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let t = Transform::new(Vec2::ZERO, FRAC_PI_2);
        assert!(vec2_approx_eq(t.transform_point(Vec2::X), Vec2::Y));
        assert!(vec2_approx_eq(t.local_y(), -Vec2::X));
    }

    #[test]
    fn test_combined() {
        let t = Transform::new(Vec2::new(1.0, 0.0), FRAC_PI_2);
        // Rotate X -> Y, then translate by (1, 0)
        assert!(vec2_approx_eq(t.transform_point(Vec2::X), Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform::new(Vec2::new(1.0, 2.0), 0.7);
        let p = Vec2::new(4.0, -5.0);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!(vec2_approx_eq(back, p));
    }

    #[test]
    fn test_singular_rotation_falls_back_to_identity() {
        let t = Transform {
            position: Vec2::new(1.0, 1.0),
            angle: 0.0,
            rotation: Mat2::ZERO,
        };
        let local = t.inverse_transform_point(Vec2::new(3.0, 1.0));
        assert!(vec2_approx_eq(local, Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_new_wraps_angle() {
        let t = Transform::new(Vec2::ZERO, -FRAC_PI_2);
        assert!((t.angle - 3.0 * FRAC_PI_2).abs() < EPSILON);
    }
}
