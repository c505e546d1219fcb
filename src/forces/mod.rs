//! Force generators and the registry that drives them.
//!
//! Generators add forces to a body's accumulators. The world runs every
//! registration at the start of each substep, before integration.

use tracing::trace;

use crate::collision::BodyHandle;
use crate::dynamics::{BodySet, RigidBody};
use crate::math::utils::normalize_or_x;
use crate::math::{Mat2, Vec2};

/// Density of water in kg/m³
pub const WATER_DENSITY: f32 = 1000.0;

/// A source of force acting on a single body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForceGenerator {
    /// Constant acceleration scaled by the body's mass
    Gravity { gravity: Vec2 },
    /// Hookean spring between a point on this body and a point on another
    Spring {
        local_point: Vec2,
        other: BodyHandle,
        other_local_point: Vec2,
        stiffness: f32,
        rest_length: f32,
    },
    /// Hookean spring between a point on this body and a fixed world anchor
    AnchoredSpring {
        local_point: Vec2,
        anchor: Vec2,
        stiffness: f32,
        rest_length: f32,
    },
    /// Drag/lift surface mapping relative air velocity to force
    Aero {
        /// Body-space tensor
        tensor: Mat2,
        local_position: Vec2,
        wind: Vec2,
    },
    /// Aero surface mounted at an angle to the body
    AngledAero {
        tensor: Mat2,
        /// Surface orientation relative to the body, in radians
        orientation: f32,
        local_position: Vec2,
        wind: Vec2,
    },
    /// Aero surface whose tensor blends between three settings
    AeroControl {
        min_tensor: Mat2,
        base_tensor: Mat2,
        max_tensor: Mat2,
        /// Control input in `[-1, 1]`: -1 selects `min_tensor`, 0 the base, 1 the max
        control: f32,
        local_position: Vec2,
        wind: Vec2,
    },
    /// Upward force proportional to how deep a point sits below a water plane
    Buoyancy {
        /// Body-space center of buoyancy
        center: Vec2,
        /// Depth at which the body counts as fully submerged
        max_depth: f32,
        volume: f32,
        /// Height of the water surface (world y)
        water_height: f32,
        liquid_density: f32,
    },
}

impl ForceGenerator {
    /// Gravity generator
    pub fn gravity(gravity: Vec2) -> Self {
        Self::Gravity { gravity }
    }

    /// Spring between the centers of two bodies
    pub fn spring(other: BodyHandle, stiffness: f32, rest_length: f32) -> Self {
        Self::Spring {
            local_point: Vec2::ZERO,
            other,
            other_local_point: Vec2::ZERO,
            stiffness,
            rest_length,
        }
    }

    /// Spring from the body center to a world anchor
    pub fn anchored_spring(anchor: Vec2, stiffness: f32, rest_length: f32) -> Self {
        Self::AnchoredSpring {
            local_point: Vec2::ZERO,
            anchor,
            stiffness,
            rest_length,
        }
    }

    /// Aero surface at `local_position` in still air
    pub fn aero(tensor: Mat2, local_position: Vec2) -> Self {
        Self::Aero {
            tensor,
            local_position,
            wind: Vec2::ZERO,
        }
    }

    /// Buoyancy in water of the given surface height
    pub fn buoyancy(center: Vec2, max_depth: f32, volume: f32, water_height: f32) -> Self {
        Self::Buoyancy {
            center,
            max_depth,
            volume,
            water_height,
            liquid_density: WATER_DENSITY,
        }
    }

    /// Sets the control input of an `AeroControl` surface, clamped to `[-1, 1]`.
    /// Other variants are left untouched.
    pub fn set_control(&mut self, value: f32) {
        if let Self::AeroControl { control, .. } = self {
            *control = value.clamp(-1.0, 1.0);
        }
    }

    /// Sets the wind velocity on aero variants
    pub fn set_wind(&mut self, value: Vec2) {
        match self {
            Self::Aero { wind, .. } | Self::AngledAero { wind, .. } | Self::AeroControl { wind, .. } => {
                *wind = value;
            }
            _ => {}
        }
    }

    /// Other body this generator reads from, if any
    pub fn other_body(&self) -> Option<BodyHandle> {
        match self {
            Self::Spring { other, .. } => Some(*other),
            _ => None,
        }
    }

    /// Adds this generator's force to the body behind `handle`.
    ///
    /// Registrations naming a body that no longer exists do nothing.
    pub fn update_force(&self, handle: BodyHandle, bodies: &mut BodySet, _dt: f32) {
        // Spring needs the other end before borrowing the target mutably
        let other_point = match *self {
            Self::Spring {
                other,
                other_local_point,
                ..
            } => match bodies.get(other) {
                Some(body) => Some(body.point_in_world_space(other_local_point)),
                None => return,
            },
            _ => None,
        };

        let Some(body) = bodies.get_mut(handle) else {
            return;
        };

        match *self {
            Self::Gravity { gravity } => {
                if body.has_finite_mass() {
                    body.add_force(gravity * body.mass());
                }
            }
            Self::Spring {
                local_point,
                stiffness,
                rest_length,
                ..
            } => {
                if let Some(other_point) = other_point {
                    apply_spring(body, local_point, other_point, stiffness, rest_length);
                }
            }
            Self::AnchoredSpring {
                local_point,
                anchor,
                stiffness,
                rest_length,
            } => apply_spring(body, local_point, anchor, stiffness, rest_length),
            Self::Aero {
                tensor,
                local_position,
                wind,
            } => apply_aero(body, tensor, 0.0, local_position, wind),
            Self::AngledAero {
                tensor,
                orientation,
                local_position,
                wind,
            } => apply_aero(body, tensor, orientation, local_position, wind),
            Self::AeroControl {
                min_tensor,
                base_tensor,
                max_tensor,
                control,
                local_position,
                wind,
            } => {
                let tensor = blend_tensor(min_tensor, base_tensor, max_tensor, control);
                apply_aero(body, tensor, 0.0, local_position, wind);
            }
            Self::Buoyancy {
                center,
                max_depth,
                volume,
                water_height,
                liquid_density,
            } => {
                let point = body.point_in_world_space(center);
                let depth = water_height - point.y;
                if depth <= 0.0 {
                    return;
                }
                let submerged = if max_depth <= 0.0 || depth >= max_depth {
                    1.0
                } else {
                    depth / max_depth
                };
                body.add_force_at_point(Vec2::new(0.0, liquid_density * volume * submerged), point);
            }
        }
    }
}

fn apply_spring(body: &mut RigidBody, local_point: Vec2, other_point: Vec2, stiffness: f32, rest_length: f32) {
    let point = body.point_in_world_space(local_point);
    let delta = point - other_point;
    let length = delta.length();
    let force = normalize_or_x(delta) * (-(length - rest_length) * stiffness);
    body.add_force_at_point(force, point);
}

fn apply_aero(body: &mut RigidBody, tensor: Mat2, surface_angle: f32, local_position: Vec2, wind: Vec2) {
    if !body.has_finite_mass() {
        return;
    }

    let surface = Mat2::from_angle(surface_angle);
    let air = body.direction_in_local_space(body.linear_velocity - wind);
    let surface_velocity = surface.transpose() * air;
    let surface_force = -(tensor * surface_velocity);
    let force = body.direction_in_world_space(surface * surface_force);

    let point = body.point_in_world_space(local_position);
    body.add_force_at_point(force, point);
}

/// Piecewise-linear blend: `[-1, 0]` between min and base, `[0, 1]` between base and max
fn blend_tensor(min: Mat2, base: Mat2, max: Mat2, control: f32) -> Mat2 {
    let control = control.clamp(-1.0, 1.0);
    if control <= 0.0 {
        let k = control + 1.0;
        min * (1.0 - k) + base * k
    } else {
        base * (1.0 - control) + max * control
    }
}

/// A generator bound to the body it acts on
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForceRegistration {
    pub body: BodyHandle,
    pub generator: ForceGenerator,
}

/// Ordered list of (body, generator) registrations
#[derive(Debug, Clone, Default)]
pub struct ForceRegistry {
    registrations: Vec<ForceRegistration>,
}

impl ForceRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `generator` to act on `body`
    pub fn add(&mut self, body: BodyHandle, generator: ForceGenerator) {
        self.registrations.push(ForceRegistration { body, generator });
    }

    /// Drops every registration that acts on or reads from `body`
    pub fn remove_body(&mut self, body: BodyHandle) {
        self.registrations
            .retain(|r| r.body != body && r.generator.other_body() != Some(body));
    }

    /// Removes all registrations
    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registrations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ForceRegistration> {
        self.registrations.iter()
    }

    /// Mutable registrations, e.g. to move a control surface
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ForceRegistration> {
        self.registrations.iter_mut()
    }

    /// Runs every generator against its body
    pub fn update_forces(&self, bodies: &mut BodySet, dt: f32) {
        for registration in &self.registrations {
            registration.generator.update_force(registration.body, bodies, dt);
        }
        trace!(count = self.registrations.len(), "force generators applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(body: RigidBody) -> (BodySet, BodyHandle) {
        let mut bodies = BodySet::new();
        let handle = bodies.insert(body);
        (bodies, handle)
    }

    #[test]
    fn test_gravity_scales_with_mass() {
        let (mut bodies, h) = set_with(RigidBody::circle(1.0).with_mass(4.0));
        ForceGenerator::gravity(Vec2::new(0.0, -10.0)).update_force(h, &mut bodies, 0.1);
        assert!((bodies.get(h).unwrap().force().y + 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_gravity_skips_infinite_mass() {
        let (mut bodies, h) = set_with(RigidBody::circle(1.0).with_infinite_mass());
        ForceGenerator::gravity(Vec2::new(0.0, -10.0)).update_force(h, &mut bodies, 0.1);
        assert_eq!(bodies.get(h).unwrap().force(), Vec2::ZERO);
    }

    #[test]
    fn test_spring_pulls_when_stretched_pushes_when_compressed() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(RigidBody::circle(0.5));
        let b = bodies.insert(RigidBody::circle(0.5).with_position(Vec2::new(3.0, 0.0)));

        let spring = ForceGenerator::spring(b, 2.0, 1.0);
        spring.update_force(a, &mut bodies, 0.1);
        // Stretched by 2, pulled toward b
        assert!((bodies.get(a).unwrap().force().x - 4.0).abs() < 1e-4);

        bodies.get_mut(a).unwrap().clear_accumulators();
        bodies.get_mut(b).unwrap().set_position(Vec2::new(0.5, 0.0));
        spring.update_force(a, &mut bodies, 0.1);
        // Compressed by 0.5, pushed away from b
        assert!((bodies.get(a).unwrap().force().x + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_spring_with_missing_other_is_noop() {
        let (mut bodies, h) = set_with(RigidBody::circle(1.0));
        ForceGenerator::spring(BodyHandle::new(5), 2.0, 1.0).update_force(h, &mut bodies, 0.1);
        assert_eq!(bodies.get(h).unwrap().force(), Vec2::ZERO);
    }

    #[test]
    fn test_anchored_spring_off_center_adds_torque() {
        let (mut bodies, h) = set_with(RigidBody::rectangle(Vec2::ONE));
        let spring = ForceGenerator::AnchoredSpring {
            local_point: Vec2::new(1.0, 0.0),
            anchor: Vec2::new(1.0, 3.0),
            stiffness: 1.0,
            rest_length: 1.0,
        };
        spring.update_force(h, &mut bodies, 0.1);

        let body = bodies.get(h).unwrap();
        assert!((body.force().y - 2.0).abs() < 1e-4);
        // r = (1, 0), F = (0, 2)
        assert!((body.torque() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_aero_opposes_motion() {
        let (mut bodies, h) = set_with(RigidBody::circle(1.0).with_linear_velocity(Vec2::new(2.0, 0.0)));
        ForceGenerator::aero(Mat2::from_diagonal(Vec2::new(0.5, 0.5)), Vec2::ZERO)
            .update_force(h, &mut bodies, 0.1);
        assert!((bodies.get(h).unwrap().force().x + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_aero_uses_body_frame() {
        // Drag only along the body's local x axis, body turned 90 degrees
        let (mut bodies, h) = set_with(
            RigidBody::circle(1.0)
                .with_orientation(std::f32::consts::FRAC_PI_2)
                .with_linear_velocity(Vec2::new(0.0, 2.0)),
        );
        ForceGenerator::aero(Mat2::from_diagonal(Vec2::new(1.0, 0.0)), Vec2::ZERO)
            .update_force(h, &mut bodies, 0.1);

        let force = bodies.get(h).unwrap().force();
        assert!(force.x.abs() < 1e-4);
        assert!((force.y + 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_angled_aero_rotates_surface() {
        let (mut bodies, h) = set_with(RigidBody::circle(1.0).with_linear_velocity(Vec2::new(0.0, 2.0)));
        let generator = ForceGenerator::AngledAero {
            tensor: Mat2::from_diagonal(Vec2::new(1.0, 0.0)),
            orientation: std::f32::consts::FRAC_PI_2,
            local_position: Vec2::ZERO,
            wind: Vec2::ZERO,
        };
        generator.update_force(h, &mut bodies, 0.1);
        assert!((bodies.get(h).unwrap().force().y + 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_wind_counts_as_relative_motion() {
        let (mut bodies, h) = set_with(RigidBody::circle(1.0));
        let mut generator = ForceGenerator::aero(Mat2::IDENTITY, Vec2::ZERO);
        generator.set_wind(Vec2::new(3.0, 0.0));
        generator.update_force(h, &mut bodies, 0.1);
        assert!((bodies.get(h).unwrap().force().x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_aero_control_blends_and_clamps() {
        let min = Mat2::ZERO;
        let base = Mat2::IDENTITY;
        let max = Mat2::IDENTITY * 3.0;

        let half_down = blend_tensor(min, base, max, -0.5);
        assert!((half_down.x_axis.x - 0.5).abs() < 1e-6);
        let half_up = blend_tensor(min, base, max, 0.5);
        assert!((half_up.x_axis.x - 2.0).abs() < 1e-6);

        let mut generator = ForceGenerator::AeroControl {
            min_tensor: min,
            base_tensor: base,
            max_tensor: max,
            control: 0.0,
            local_position: Vec2::ZERO,
            wind: Vec2::ZERO,
        };
        generator.set_control(7.0);
        assert!(matches!(generator, ForceGenerator::AeroControl { control, .. } if control == 1.0));

        let (mut bodies, h) = set_with(RigidBody::circle(1.0).with_linear_velocity(Vec2::X));
        generator.update_force(h, &mut bodies, 0.1);
        assert!((bodies.get(h).unwrap().force().x + 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_buoyancy_depth_levels() {
        let generator = ForceGenerator::buoyancy(Vec2::ZERO, 1.0, 0.002, 0.0);

        let (mut bodies, h) = set_with(RigidBody::circle(0.5).with_position(Vec2::new(0.0, 1.0)));
        generator.update_force(h, &mut bodies, 0.1);
        assert_eq!(bodies.get(h).unwrap().force(), Vec2::ZERO);

        bodies.get_mut(h).unwrap().set_position(Vec2::new(0.0, -0.5));
        generator.update_force(h, &mut bodies, 0.1);
        assert!((bodies.get(h).unwrap().force().y - 1.0).abs() < 1e-4);

        bodies.get_mut(h).unwrap().clear_accumulators();
        bodies.get_mut(h).unwrap().set_position(Vec2::new(0.0, -5.0));
        generator.update_force(h, &mut bodies, 0.1);
        assert!((bodies.get(h).unwrap().force().y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_registry_remove_body() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(RigidBody::circle(1.0));
        let b = bodies.insert(RigidBody::circle(1.0));

        let mut registry = ForceRegistry::new();
        registry.add(a, ForceGenerator::gravity(Vec2::NEG_Y));
        registry.add(a, ForceGenerator::spring(b, 1.0, 1.0));
        registry.add(b, ForceGenerator::gravity(Vec2::NEG_Y));
        assert_eq!(registry.len(), 3);

        registry.remove_body(b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.iter().next().unwrap().body, a);

        registry.update_forces(&mut bodies, 0.1);
        assert!((bodies.get(a).unwrap().force().y + 1.0).abs() < 1e-4);
        assert_eq!(bodies.get(b).unwrap().force(), Vec2::ZERO);

        registry.clear();
        assert!(registry.is_empty());
    }
}
