use crate::collision::Contact;
use crate::dynamics::RigidBody;
use crate::math::consts::EPSILON;
use crate::math::utils::cross;
use crate::math::Vec2;

/// Parameters for the positional (non-penetration) correction pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionCorrection {
    /// Fraction of the excess penetration removed per pass
    pub factor: f32,
    /// Penetration tolerated without correction
    pub slop: f32,
    /// Also rotate the bodies around the manifold points
    pub angular: bool,
}

/// Pushes two overlapping bodies apart along the contact normal.
///
/// Only penetration beyond `slop` is corrected, scaled by `factor` and split
/// between the bodies by inverse mass (A against the normal, B along it).
pub fn solve_position(
    contact: &Contact,
    body_a: &mut RigidBody,
    body_b: &mut RigidBody,
    params: PositionCorrection,
) {
    let excess = contact.penetration - params.slop;
    if excess <= 0.0 {
        return;
    }

    if params.angular && !contact.is_empty() {
        solve_position_angular(contact, body_a, body_b, excess * params.factor);
        return;
    }

    let inv_a = body_a.effective_inv_mass();
    let inv_b = body_b.effective_inv_mass();
    let total = inv_a + inv_b;
    if total <= 0.0 {
        return;
    }

    let correction = contact.normal * (excess * params.factor / total);
    if inv_a > 0.0 {
        body_a.translate(-correction * inv_a);
    }
    if inv_b > 0.0 {
        body_b.translate(correction * inv_b);
    }
}

fn solve_position_angular(contact: &Contact, body_a: &mut RigidBody, body_b: &mut RigidBody, amount: f32) {
    let n = contact.normal;
    let share = amount / contact.len() as f32;

    for &point in contact.points() {
        let r_a = point - body_a.position();
        let r_b = point - body_b.position();
        let rn_a = cross(r_a, n);
        let rn_b = cross(r_b, n);

        let k = effective_mass_denominator(body_a, body_b, rn_a, rn_b);
        if k <= EPSILON {
            continue;
        }
        let lambda = share / k;

        let (inv_a, inv_b) = (body_a.effective_inv_mass(), body_b.effective_inv_mass());
        let (ii_a, ii_b) = (body_a.effective_inv_inertia(), body_b.effective_inv_inertia());
        if inv_a > 0.0 {
            body_a.translate(-n * lambda * inv_a);
        }
        if ii_a > 0.0 {
            body_a.rotate(-rn_a * lambda * ii_a);
        }
        if inv_b > 0.0 {
            body_b.translate(n * lambda * inv_b);
        }
        if ii_b > 0.0 {
            body_b.rotate(rn_b * lambda * ii_b);
        }
    }
}

/// One velocity pass over every manifold point of `contact`.
///
/// Approaching points receive a normal impulse `-(1 + e) vn / k` with the
/// smaller restitution of the pair, followed by a Coulomb friction impulse:
/// static friction holds the point while the required impulse stays inside
/// the cone, otherwise dynamic friction opposes the slide.
pub fn solve_velocity(contact: &Contact, body_a: &mut RigidBody, body_b: &mut RigidBody) {
    let n = contact.normal;
    let restitution = body_a.restitution.min(body_b.restitution);
    let static_friction = (body_a.static_friction + body_b.static_friction) * 0.5;
    let dynamic_friction = (body_a.dynamic_friction + body_b.dynamic_friction) * 0.5;

    for &point in contact.points() {
        let r_a = point - body_a.position();
        let r_b = point - body_b.position();

        let relative = relative_velocity(body_a, body_b, point);
        let normal_velocity = relative.dot(n);
        if normal_velocity > 0.0 {
            continue;
        }

        let k = effective_mass_denominator(body_a, body_b, cross(r_a, n), cross(r_b, n));
        if k <= EPSILON {
            continue;
        }
        let j = -(1.0 + restitution) * normal_velocity / k;
        apply_impulse_pair(body_a, body_b, n * j, point);

        // Friction
        let relative = relative_velocity(body_a, body_b, point);
        let tangent = relative - n * relative.dot(n);
        if tangent.length_squared() <= EPSILON {
            continue;
        }
        let t = tangent.normalize();

        let kt = effective_mass_denominator(body_a, body_b, cross(r_a, t), cross(r_b, t));
        if kt <= EPSILON {
            continue;
        }
        let jt = -relative.dot(t) / kt;
        let friction = if jt.abs() <= j * static_friction {
            t * jt
        } else {
            t * (-j * dynamic_friction)
        };
        apply_impulse_pair(body_a, body_b, friction, point);
    }
}

/// `mA + mB + (rA x d)^2 iA + (rB x d)^2 iB` with lock-aware inverse masses
fn effective_mass_denominator(body_a: &RigidBody, body_b: &RigidBody, rd_a: f32, rd_b: f32) -> f32 {
    body_a.effective_inv_mass()
        + body_b.effective_inv_mass()
        + rd_a * rd_a * body_a.effective_inv_inertia()
        + rd_b * rd_b * body_b.effective_inv_inertia()
}

/// Velocity of B relative to A at a world point
fn relative_velocity(body_a: &RigidBody, body_b: &RigidBody, point: Vec2) -> Vec2 {
    body_b.velocity_at_point(point) - body_a.velocity_at_point(point)
}

/// Applies `impulse` to B and its opposite to A at `point`
fn apply_impulse_pair(body_a: &mut RigidBody, body_b: &mut RigidBody, impulse: Vec2, point: Vec2) {
    body_a.apply_impulse_at_point(-impulse, point);
    body_b.apply_impulse_at_point(impulse, point);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::BodyHandle;

    const PARAMS: PositionCorrection = PositionCorrection {
        factor: 0.8,
        slop: 0.01,
        angular: false,
    };

    fn contact(normal: Vec2, penetration: f32, point: Vec2) -> Contact {
        let mut c = Contact::new(BodyHandle::new(0), BodyHandle::new(1), normal, penetration);
        c.add_point(point, 1e-4);
        c
    }

    #[test]
    fn test_position_correction_split_by_mass() {
        let mut a = RigidBody::circle(1.0).with_mass(1.0);
        let mut b = RigidBody::circle(1.0).with_mass(1.0).with_position(Vec2::new(1.5, 0.0));
        let c = contact(Vec2::X, 0.51, Vec2::new(1.0, 0.0));

        solve_position(&c, &mut a, &mut b, PARAMS);

        // (0.51 - 0.01) * 0.8 = 0.4 split evenly
        assert!((a.position().x + 0.2).abs() < 1e-5);
        assert!((b.position().x - 1.7).abs() < 1e-5);
    }

    #[test]
    fn test_position_correction_respects_static() {
        let mut ground = RigidBody::rectangle(Vec2::new(10.0, 1.0)).with_infinite_mass();
        let mut ball = RigidBody::circle(1.0).with_position(Vec2::new(0.0, 1.5));
        let c = contact(Vec2::Y, 0.51, Vec2::new(0.0, 1.0));

        solve_position(&c, &mut ground, &mut ball, PARAMS);

        assert_eq!(ground.position(), Vec2::ZERO);
        assert!((ball.position().y - 1.9).abs() < 1e-5);
        // Derived bounds follow the move
        assert!((ball.aabb().min.y - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_position_within_slop_is_ignored() {
        let mut a = RigidBody::circle(1.0);
        let mut b = RigidBody::circle(1.0).with_position(Vec2::new(1.995, 0.0));
        let c = contact(Vec2::X, 0.005, Vec2::new(1.0, 0.0));

        solve_position(&c, &mut a, &mut b, PARAMS);
        assert_eq!(a.position(), Vec2::ZERO);
        assert_eq!(b.position(), Vec2::new(1.995, 0.0));
    }

    #[test]
    fn test_both_immovable_is_noop() {
        let mut a = RigidBody::circle(1.0).with_infinite_mass();
        let mut b = RigidBody::circle(1.0).with_locked_position(true);
        let c = contact(Vec2::X, 0.5, Vec2::new(1.0, 0.0));

        solve_position(&c, &mut a, &mut b, PARAMS);
        b.linear_velocity = -Vec2::X;
        solve_velocity(&c, &mut a, &mut b);

        assert_eq!(b.position(), Vec2::ZERO);
        assert_eq!(b.linear_velocity, -Vec2::X);
    }

    #[test]
    fn test_angular_position_correction() {
        let mut ground = RigidBody::rectangle(Vec2::new(10.0, 1.0)).with_infinite_mass();
        let mut plank = RigidBody::rectangle(Vec2::new(2.0, 0.5)).with_position(Vec2::new(0.0, 1.4));
        // Single contact off-center makes the plank turn as well as lift
        let c = contact(Vec2::Y, 0.11, Vec2::new(1.5, 1.0));
        let params = PositionCorrection {
            angular: true,
            ..PARAMS
        };

        solve_position(&c, &mut ground, &mut plank, params);
        assert!(plank.position().y > 1.4);
        assert!(plank.orientation() > 0.0);
    }

    #[test]
    fn test_restitution_uses_minimum() {
        let mut ground = RigidBody::rectangle(Vec2::new(10.0, 1.0))
            .with_infinite_mass()
            .with_restitution(1.0);
        let mut ball = RigidBody::circle(1.0)
            .with_position(Vec2::new(0.0, 2.0))
            .with_restitution(0.5)
            .with_linear_velocity(Vec2::new(0.0, -4.0));
        let c = contact(Vec2::Y, 0.0, Vec2::new(0.0, 1.0));

        solve_velocity(&c, &mut ground, &mut ball);
        assert!((ball.linear_velocity.y - 2.0).abs() < 1e-5);
        assert!(ball.angular_velocity.abs() < 1e-6);
    }

    #[test]
    fn test_zero_restitution_stops_approach() {
        let mut ground = RigidBody::rectangle(Vec2::new(10.0, 1.0)).with_infinite_mass();
        let mut ball = RigidBody::circle(1.0)
            .with_position(Vec2::new(0.0, 2.0))
            .with_restitution(0.0)
            .with_linear_velocity(Vec2::new(0.0, -4.0));
        let c = contact(Vec2::Y, 0.0, Vec2::new(0.0, 1.0));

        solve_velocity(&c, &mut ground, &mut ball);
        assert!(ball.linear_velocity.y.abs() < 1e-5);
    }

    #[test]
    fn test_separating_contact_untouched() {
        let mut ground = RigidBody::rectangle(Vec2::new(10.0, 1.0)).with_infinite_mass();
        let mut ball = RigidBody::circle(1.0)
            .with_position(Vec2::new(0.0, 2.0))
            .with_linear_velocity(Vec2::new(1.0, 3.0));
        let c = contact(Vec2::Y, 0.0, Vec2::new(0.0, 1.0));

        solve_velocity(&c, &mut ground, &mut ball);
        assert_eq!(ball.linear_velocity, Vec2::new(1.0, 3.0));
    }

    #[test]
    fn test_static_friction_stops_slow_slide() {
        let mut ground = RigidBody::rectangle(Vec2::new(10.0, 1.0))
            .with_infinite_mass()
            .with_friction(1.0, 0.8);
        let mut block = RigidBody::rectangle(Vec2::ONE)
            .with_position(Vec2::new(0.0, 2.0))
            .with_locked_rotation(true)
            .with_restitution(0.0)
            .with_friction(1.0, 0.8)
            .with_linear_velocity(Vec2::new(0.5, -1.0));
        let c = contact(Vec2::Y, 0.0, Vec2::new(0.0, 1.0));

        solve_velocity(&c, &mut ground, &mut block);
        // Normal impulse 1 allows up to 1 of tangential impulse; 0.5 is needed
        assert!(block.linear_velocity.length() < 1e-5);
    }

    #[test]
    fn test_dynamic_friction_slows_fast_slide() {
        let mut ground = RigidBody::rectangle(Vec2::new(10.0, 1.0))
            .with_infinite_mass()
            .with_friction(0.5, 0.2);
        let mut block = RigidBody::rectangle(Vec2::ONE)
            .with_position(Vec2::new(0.0, 2.0))
            .with_locked_rotation(true)
            .with_restitution(0.0)
            .with_friction(0.5, 0.2)
            .with_linear_velocity(Vec2::new(5.0, -1.0));
        let c = contact(Vec2::Y, 0.0, Vec2::new(0.0, 1.0));

        solve_velocity(&c, &mut ground, &mut block);
        // j = 1, sliding impulse = 0.2
        assert!((block.linear_velocity.x - 4.8).abs() < 1e-5);
        assert!(block.linear_velocity.y.abs() < 1e-5);
    }
}
