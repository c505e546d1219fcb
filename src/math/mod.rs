mod transform;

pub use glam::{Mat2, Vec2};
pub use transform::Transform;

/// Common math constants
pub mod consts {
    /// A small epsilon value for floating point comparisons
    pub const EPSILON: f32 = 1e-6;

    /// Tolerance used when merging nearly coincident contact points
    pub const CONTACT_EPSILON: f32 = 5e-4;

    /// Depth difference under which two box manifold candidates form one face contact
    pub const MANIFOLD_TOLERANCE: f32 = 5e-3;

    /// Two times Pi
    pub const TAU: f32 = std::f32::consts::TAU;
}

/// Utility functions for planar vector math
pub mod utils {
    use super::consts::{EPSILON, TAU};
    use glam::{Mat2, Vec2};

    /// Scalar 2D cross product `a.x * b.y - a.y * b.x`
    #[inline]
    pub fn cross(a: Vec2, b: Vec2) -> f32 {
        a.perp_dot(b)
    }

    /// Cross product of a scalar angular velocity with a lever arm: `w x r`
    #[inline]
    pub fn cross_scalar(w: f32, r: Vec2) -> Vec2 {
        Vec2::new(-w * r.y, w * r.x)
    }

    /// Normalizes `v`, falling back to `+X` for zero-length or non-finite input
    #[inline]
    pub fn normalize_or_x(v: Vec2) -> Vec2 {
        if v.length_squared() <= EPSILON * EPSILON {
            return Vec2::X;
        }
        v.try_normalize().unwrap_or(Vec2::X)
    }

    /// Wraps an angle into `[0, 2pi)`
    #[inline]
    pub fn wrap_angle(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= TAU {
            0.0
        } else {
            wrapped
        }
    }

    /// Signed shortest turn from `from` to `to`, in `(-pi, pi]`
    #[inline]
    pub fn angle_delta(from: f32, to: f32) -> f32 {
        let delta = (to - from).rem_euclid(TAU);
        if delta > TAU * 0.5 {
            delta - TAU
        } else {
            delta
        }
    }

    /// Inverse of `m`, or identity when `m` is singular
    #[inline]
    pub fn inverse_or_identity(m: Mat2) -> Mat2 {
        let det = m.determinant();
        if det.abs() <= EPSILON || !det.is_finite() {
            Mat2::IDENTITY
        } else {
            m.inverse()
        }
    }

    /// Returns true if two floats are approximately equal
    #[inline]
    pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() < epsilon
    }

    /// Returns true if two points are approximately equal
    #[inline]
    pub fn approx_eq_vec(a: Vec2, b: Vec2, epsilon: f32) -> bool {
        a.distance_squared(b) < epsilon * epsilon
    }

    /// Closest point to `p` on segment `a..b` and its squared distance
    pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> (Vec2, f32) {
        let ab = b - a;
        let len_sq = ab.length_squared();
        let closest = if len_sq <= EPSILON {
            a
        } else {
            let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
            a + ab * t
        };
        (closest, p.distance_squared(closest))
    }

}
