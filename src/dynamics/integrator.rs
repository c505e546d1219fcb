use crate::math::utils::wrap_angle;
use crate::math::Vec2;

use super::rigid_body::RigidBody;

/// Advances `body` by `dt` with semi-implicit Euler.
///
/// Velocities are updated from the accumulated force/torque and `gravity`,
/// damped by `damping^dt`, then used to advance position and orientation.
/// Derived data is refreshed and the accumulators are cleared afterwards.
pub fn integrate(body: &mut RigidBody, gravity: Vec2, dt: f32) {
    integrate_velocities(body, gravity, dt);
    integrate_positions(body, dt);
    body.clear_accumulators();
}

/// Applies accumulated force, torque, gravity and damping to the velocities
pub fn integrate_velocities(body: &mut RigidBody, gravity: Vec2, dt: f32) {
    if body.lock_position {
        body.linear_velocity = Vec2::ZERO;
    } else if body.inv_mass > 0.0 {
        let mut acceleration = body.force * body.inv_mass;
        if !body.ignore_gravity {
            acceleration += gravity;
        }
        body.linear_velocity += acceleration * dt;
        body.linear_velocity *= body.linear_damping.powf(dt);
    }

    if body.lock_rotation {
        body.angular_velocity = 0.0;
    } else {
        body.angular_velocity += body.torque * body.inv_inertia * dt;
        body.angular_velocity *= body.angular_damping.powf(dt);
    }
}

/// Advances position and orientation from the current velocities
pub fn integrate_positions(body: &mut RigidBody, dt: f32) {
    let translate = !body.lock_position && body.inv_mass > 0.0;
    let turn = !body.lock_rotation && body.angular_velocity != 0.0;
    if !translate && !turn {
        return;
    }

    if translate {
        body.position += body.linear_velocity * dt;
    }
    if turn {
        body.orientation = wrap_angle(body.orientation + body.angular_velocity * dt);
    }
    body.update_derived_data();
}
