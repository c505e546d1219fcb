use crate::geometry::{Aabb, Shape};
use crate::math::utils::{cross, cross_scalar, wrap_angle};
use crate::math::{Mat2, Transform, Vec2};

/// Default per-second damping factor for linear and angular velocity
pub const DEFAULT_DAMPING: f32 = 0.99;

/// A rigid body in the physics simulation.
///
/// Position and orientation are not public: every mutation goes through a setter
/// that refreshes the derived rotation matrix, world bounds and bounding
/// radius, so broad-phase queries never see stale data.
#[derive(Debug, Clone)]
pub struct RigidBody {
    // Transform
    pub(crate) position: Vec2,
    pub(crate) orientation: f32,

    // Derived data
    transform: Transform,
    aabb: Aabb,
    bounding_radius: f32,

    // Velocities
    /// Linear velocity
    pub linear_velocity: Vec2,
    /// Angular velocity (radians per second, counter-clockwise positive)
    pub angular_velocity: f32,

    // Mass properties
    /// Inverse mass (0 for infinite mass / immovable)
    pub inv_mass: f32,
    /// Inverse rotational inertia (0 for infinite inertia)
    pub inv_inertia: f32,

    // Damping
    /// Fraction of linear velocity kept per second (1 = no damping)
    pub linear_damping: f32,
    /// Fraction of angular velocity kept per second (1 = no damping)
    pub angular_damping: f32,

    // Accumulators
    pub(crate) force: Vec2,
    pub(crate) torque: f32,

    shape: Shape,

    // Material properties
    /// Restitution (bounciness)
    pub restitution: f32,
    /// Friction coefficient used while the contact sticks
    pub static_friction: f32,
    /// Friction coefficient used while the contact slides
    pub dynamic_friction: f32,

    // Flags
    /// Whether the broad phase reports pairs for this body
    pub collision_enabled: bool,
    /// Freezes translation; the body still rotates unless `lock_rotation` is set
    pub lock_position: bool,
    /// Freezes rotation
    pub lock_rotation: bool,
    /// Excludes the body from the world's gravity field
    pub ignore_gravity: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(Shape::default())
    }
}

impl RigidBody {
    /// Creates a unit-mass body with the given shape at the origin
    pub fn new(shape: Shape) -> Self {
        let mut body = Self {
            position: Vec2::ZERO,
            orientation: 0.0,
            transform: Transform::IDENTITY,
            aabb: Aabb::EMPTY,
            bounding_radius: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            inv_mass: 1.0,
            inv_inertia: 0.0,
            linear_damping: DEFAULT_DAMPING,
            angular_damping: DEFAULT_DAMPING,
            force: Vec2::ZERO,
            torque: 0.0,
            shape,
            restitution: 0.3,
            static_friction: 0.6,
            dynamic_friction: 0.4,
            collision_enabled: true,
            lock_position: false,
            lock_rotation: false,
            ignore_gravity: false,
        };
        body.set_mass(1.0);
        body.update_derived_data();
        body
    }

    /// Creates a circle body
    pub fn circle(radius: f32) -> Self {
        Self::new(Shape::circle(radius))
    }

    /// Creates a box body from half-extents
    pub fn rectangle(half_extents: Vec2) -> Self {
        Self::new(Shape::rectangle(half_extents))
    }

    /// Sets the position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.set_position(position);
        self
    }

    /// Sets the orientation in radians
    pub fn with_orientation(mut self, orientation: f32) -> Self {
        self.set_orientation(orientation);
        self
    }

    /// Sets the initial linear velocity
    pub fn with_linear_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Sets the initial angular velocity
    pub fn with_angular_velocity(mut self, velocity: f32) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Sets the mass; inertia follows from the shape
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Sets the inverse mass directly; inertia follows from the shape
    pub fn with_inverse_mass(mut self, inv_mass: f32) -> Self {
        if inv_mass > 0.0 && inv_mass.is_finite() {
            self.set_mass(1.0 / inv_mass);
        } else {
            self.set_mass(f32::INFINITY);
        }
        self
    }

    /// Makes the body immovable (infinite mass and inertia)
    pub fn with_infinite_mass(mut self) -> Self {
        self.set_mass(f32::INFINITY);
        self
    }

    /// Sets restitution, clamped to `[0, 1]`
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Sets static and dynamic friction coefficients
    pub fn with_friction(mut self, static_friction: f32, dynamic_friction: f32) -> Self {
        self.static_friction = static_friction.max(0.0);
        self.dynamic_friction = dynamic_friction.max(0.0);
        self
    }

    /// Sets linear and angular damping, each clamped to `[0, 1]`
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear.clamp(0.0, 1.0);
        self.angular_damping = angular.clamp(0.0, 1.0);
        self
    }

    /// Enables or disables collision detection for this body
    pub fn with_collision(mut self, enabled: bool) -> Self {
        self.collision_enabled = enabled;
        self
    }

    /// Locks translation
    pub fn with_locked_position(mut self, locked: bool) -> Self {
        self.lock_position = locked;
        self
    }

    /// Locks rotation
    pub fn with_locked_rotation(mut self, locked: bool) -> Self {
        self.lock_rotation = locked;
        self
    }

    /// Excludes the body from gravity
    pub fn with_ignore_gravity(mut self, ignore: bool) -> Self {
        self.ignore_gravity = ignore;
        self
    }

    /// Sets mass and derives inertia from the shape.
    ///
    /// Non-positive, infinite or NaN masses make the body immovable.
    pub fn set_mass(&mut self, mass: f32) {
        if mass > 0.0 && mass.is_finite() {
            self.inv_mass = 1.0 / mass;
            let inertia = self.shape.inertia(mass);
            self.inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
        } else {
            self.inv_mass = 0.0;
            self.inv_inertia = 0.0;
        }
    }

    /// Returns the mass, or infinity for immovable bodies
    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 {
            1.0 / self.inv_mass
        } else {
            f32::INFINITY
        }
    }

    /// Returns true if this body has finite mass
    pub fn has_finite_mass(&self) -> bool {
        self.inv_mass > 0.0
    }

    /// Inverse mass as seen by the solver (0 when translation is locked)
    #[inline]
    pub fn effective_inv_mass(&self) -> f32 {
        if self.lock_position {
            0.0
        } else {
            self.inv_mass
        }
    }

    /// Inverse inertia as seen by the solver (0 when rotation is locked)
    #[inline]
    pub fn effective_inv_inertia(&self) -> f32 {
        if self.lock_rotation {
            0.0
        } else {
            self.inv_inertia
        }
    }

    /// Returns true if no impulse can move or turn this body
    #[inline]
    pub fn is_immovable(&self) -> bool {
        self.effective_inv_mass() == 0.0 && self.effective_inv_inertia() == 0.0
    }

    /// Position in world space
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Orientation in radians, always in `[0, 2pi)`
    #[inline]
    pub fn orientation(&self) -> f32 {
        self.orientation
    }

    /// Rotation matrix derived from the orientation
    #[inline]
    pub fn rotation(&self) -> Mat2 {
        self.transform.rotation
    }

    /// Local-to-world transform
    #[inline]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// World-space bounding box
    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Radius of the enclosing circle around the body origin
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Collision shape
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Force accumulated since the last clear
    #[inline]
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Torque accumulated since the last clear
    #[inline]
    pub fn torque(&self) -> f32 {
        self.torque
    }

    /// Moves the body to `position`
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.update_derived_data();
    }

    /// Sets the orientation, wrapped into `[0, 2pi)`
    pub fn set_orientation(&mut self, orientation: f32) {
        self.orientation = wrap_angle(orientation);
        self.update_derived_data();
    }

    /// Offsets the position by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.position + delta);
    }

    /// Offsets the orientation by `delta` radians
    pub fn rotate(&mut self, delta: f32) {
        self.set_orientation(self.orientation + delta);
    }

    /// Replaces the shape. Mass is kept and inertia recomputed.
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        let mass = self.mass();
        self.set_mass(mass);
        self.update_derived_data();
    }

    /// Recomputes the rotation matrix, world bounds and bounding radius
    pub fn update_derived_data(&mut self) {
        self.transform = Transform {
            position: self.position,
            angle: self.orientation,
            rotation: Mat2::from_angle(self.orientation),
        };
        self.aabb = self.shape.world_aabb(self.transform);
        self.bounding_radius = self.shape.bounding_radius();
    }

    /// Adds a force through the center of mass
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Adds a force at a world-space point, producing torque `r x F`
    pub fn add_force_at_point(&mut self, force: Vec2, point: Vec2) {
        self.force += force;
        self.torque += cross(point - self.position, force);
    }

    /// Adds a force at a point given in body space
    pub fn add_force_at_body_point(&mut self, force: Vec2, local_point: Vec2) {
        let point = self.point_in_world_space(local_point);
        self.add_force_at_point(force, point);
    }

    /// Adds a torque
    pub fn add_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    /// Applies an impulse through the center of mass
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.linear_velocity += impulse * self.effective_inv_mass();
    }

    /// Applies an impulse at a world-space point
    pub fn apply_impulse_at_point(&mut self, impulse: Vec2, point: Vec2) {
        self.linear_velocity += impulse * self.effective_inv_mass();
        self.angular_velocity += cross(point - self.position, impulse) * self.effective_inv_inertia();
    }

    /// Velocity of the material point currently at world-space `point`
    pub fn velocity_at_point(&self, point: Vec2) -> Vec2 {
        self.linear_velocity + cross_scalar(self.angular_velocity, point - self.position)
    }

    /// Converts a body-space point to world space
    #[inline]
    pub fn point_in_world_space(&self, local_point: Vec2) -> Vec2 {
        self.transform.transform_point(local_point)
    }

    /// Converts a world-space point to body space
    #[inline]
    pub fn point_in_local_space(&self, point: Vec2) -> Vec2 {
        self.transform.inverse_transform_point(point)
    }

    /// Converts a body-space direction to world space
    #[inline]
    pub fn direction_in_world_space(&self, local_direction: Vec2) -> Vec2 {
        self.transform.transform_vector(local_direction)
    }

    /// Converts a world-space direction to body space
    #[inline]
    pub fn direction_in_local_space(&self, direction: Vec2) -> Vec2 {
        self.transform.inverse_transform_vector(direction)
    }

    /// Clears accumulated force and torque
    pub fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Kinetic energy `m v^2 / 2 + I w^2 / 2`, zero for immovable bodies
    pub fn kinetic_energy(&self) -> f32 {
        let linear = if self.inv_mass > 0.0 {
            0.5 * self.linear_velocity.length_squared() / self.inv_mass
        } else {
            0.0
        };
        let angular = if self.inv_inertia > 0.0 {
            0.5 * self.angular_velocity * self.angular_velocity / self.inv_inertia
        } else {
            0.0
        };
        linear + angular
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, TAU};

    #[test]
    fn test_body_creation() {
        let body = RigidBody::circle(1.0)
            .with_position(Vec2::new(1.0, 2.0))
            .with_mass(2.0);

        assert_eq!(body.position(), Vec2::new(1.0, 2.0));
        assert!((body.inv_mass - 0.5).abs() < 0.0001);
        // I = 0.5 * 2 * 1 = 1
        assert!((body.inv_inertia - 1.0).abs() < 0.0001);
        assert_eq!(body.linear_damping, DEFAULT_DAMPING);
    }

    #[test]
    fn test_infinite_mass() {
        let body = RigidBody::rectangle(Vec2::ONE).with_infinite_mass();
        assert!(!body.has_finite_mass());
        assert_eq!(body.inv_inertia, 0.0);
        assert!(body.is_immovable());
        assert_eq!(body.mass(), f32::INFINITY);

        let zero = RigidBody::circle(1.0).with_mass(0.0);
        assert_eq!(zero.inv_mass, 0.0);
        let nan = RigidBody::circle(1.0).with_inverse_mass(f32::NAN);
        assert_eq!(nan.inv_mass, 0.0);
    }

    #[test]
    fn test_derived_data_follows_position() {
        let mut body = RigidBody::circle(1.0);
        body.set_position(Vec2::new(5.0, 0.0));

        assert_eq!(body.aabb().min, Vec2::new(4.0, -1.0));
        assert_eq!(body.transform().position, Vec2::new(5.0, 0.0));
        assert_eq!(body.bounding_radius(), 1.0);
    }

    #[test]
    fn test_derived_data_follows_orientation() {
        let mut body = RigidBody::rectangle(Vec2::new(2.0, 1.0));
        body.set_orientation(FRAC_PI_2);

        let aabb = body.aabb();
        assert!((aabb.max.x - 1.0).abs() < 1e-5);
        assert!((aabb.max.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_orientation_wraps() {
        let mut body = RigidBody::circle(1.0);
        body.set_orientation(-FRAC_PI_2);
        assert!((body.orientation() - (TAU - FRAC_PI_2)).abs() < 1e-5);

        body.rotate(TAU);
        assert!(body.orientation() < TAU);
        assert!((body.orientation() - (TAU - FRAC_PI_2)).abs() < 1e-4);
    }

    #[test]
    fn test_force_at_point_produces_torque() {
        let mut body = RigidBody::circle(1.0);
        body.add_force_at_point(Vec2::new(0.0, 2.0), Vec2::new(1.0, 0.0));

        assert_eq!(body.force(), Vec2::new(0.0, 2.0));
        assert!((body.torque() - 2.0).abs() < 1e-6);

        body.clear_accumulators();
        assert_eq!(body.force(), Vec2::ZERO);
        assert_eq!(body.torque(), 0.0);
    }

    #[test]
    fn test_force_at_body_point_uses_rotation() {
        let mut body = RigidBody::circle(1.0).with_orientation(FRAC_PI_2);
        // Body-space +X maps to world +Y; a +X force there gives r x F = -1
        body.add_force_at_body_point(Vec2::X, Vec2::X);
        assert!((body.torque() + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_apply_impulse() {
        let mut body = RigidBody::circle(1.0).with_mass(2.0);
        body.apply_impulse(Vec2::new(1.0, 0.0));
        assert_eq!(body.linear_velocity, Vec2::new(0.5, 0.0));

        let mut locked = RigidBody::circle(1.0).with_locked_position(true);
        locked.apply_impulse(Vec2::new(1.0, 0.0));
        assert_eq!(locked.linear_velocity, Vec2::ZERO);
    }

    #[test]
    fn test_velocity_at_point() {
        let mut body = RigidBody::circle(1.0);
        body.linear_velocity = Vec2::new(1.0, 0.0);
        body.angular_velocity = 1.0;

        // w x r at (0, 1) is (-1, 0), cancelling the linear velocity
        let vel = body.velocity_at_point(Vec2::new(0.0, 1.0));
        assert!(vel.length() < 0.0001);
    }

    #[test]
    fn test_local_world_round_trip() {
        let body = RigidBody::rectangle(Vec2::ONE)
            .with_position(Vec2::new(3.0, -1.0))
            .with_orientation(0.4);
        let local = Vec2::new(0.5, 0.25);
        let back = body.point_in_local_space(body.point_in_world_space(local));
        assert!((back - local).length() < 1e-5);
    }

    #[test]
    fn test_set_shape_keeps_mass() {
        let mut body = RigidBody::circle(1.0).with_mass(4.0);
        body.set_shape(Shape::circle(2.0));
        assert!((body.mass() - 4.0).abs() < 1e-5);
        // I = 0.5 * 4 * 4 = 8
        assert!((body.inv_inertia - 0.125).abs() < 1e-6);
        assert_eq!(body.aabb().max, Vec2::splat(2.0));
    }
}
