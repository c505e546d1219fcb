use crate::collision::BodyHandle;
use crate::dynamics::RigidBody;
use crate::math::consts::EPSILON;
use crate::math::utils::angle_delta;

/// Unwrapped rotation of both bodies since the joint started tracking them
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct GearTravel {
    last_a: f32,
    last_b: f32,
    angle_a: f32,
    angle_b: f32,
}

/// Couples the rotation of two bodies so that `theta_a + ratio * theta_b`
/// stays at its value from when the joint was added.
///
/// A positive ratio makes the bodies turn in opposite directions, like two
/// meshing gears. `pre_solve` corrects the orientations directly and
/// `solve` keeps the spins consistent (`w_a + ratio * w_b = 0`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GearJoint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub ratio: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    travel: Option<GearTravel>,
}

impl GearJoint {
    /// Creates a gear joint with an explicit ratio
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, ratio: f32) -> Self {
        Self {
            body_a,
            body_b,
            ratio,
            travel: None,
        }
    }

    /// Creates a gear joint for two meshing wheels of the given radii.
    ///
    /// Rim speeds match when `w_a r_a = -w_b r_b`, giving `ratio = r_b / r_a`.
    /// A non-positive `radius_a` falls back to a ratio of 1.
    pub fn from_radii(body_a: BodyHandle, body_b: BodyHandle, radius_a: f32, radius_b: f32) -> Self {
        let ratio = if radius_a > EPSILON { radius_b / radius_a } else { 1.0 };
        Self::new(body_a, body_b, ratio)
    }

    /// Makes the current pose the zero of the rotation constraint
    pub fn reset_travel(&mut self, body_a: &RigidBody, body_b: &RigidBody) {
        self.travel = Some(GearTravel {
            last_a: body_a.orientation(),
            last_b: body_b.orientation(),
            ..GearTravel::default()
        });
    }

    /// Current rotation error `theta_a + ratio * theta_b`, zero before the first solve
    pub fn position_error(&self) -> f32 {
        self.travel
            .map_or(0.0, |t| t.angle_a + self.ratio * t.angle_b)
    }

    /// Current spin error `w_a + ratio * w_b`
    pub fn velocity_error(&self, body_a: &RigidBody, body_b: &RigidBody) -> f32 {
        body_a.angular_velocity + self.ratio * body_b.angular_velocity
    }

    /// Rotates both bodies to remove the accumulated rotation error
    pub fn pre_solve(&mut self, body_a: &mut RigidBody, body_b: &mut RigidBody, _dt: f32) {
        let Some(mut travel) = self.travel else {
            self.reset_travel(body_a, body_b);
            return;
        };
        travel.angle_a += angle_delta(travel.last_a, body_a.orientation());
        travel.angle_b += angle_delta(travel.last_b, body_b.orientation());

        let ii_a = body_a.effective_inv_inertia();
        let ii_b = body_b.effective_inv_inertia();
        let k = ii_a + ii_b * self.ratio * self.ratio;
        if k > EPSILON {
            let lambda = -(travel.angle_a + self.ratio * travel.angle_b) / k;
            let (turn_a, turn_b) = (lambda * ii_a, lambda * self.ratio * ii_b);
            body_a.rotate(turn_a);
            body_b.rotate(turn_b);
            travel.angle_a += turn_a;
            travel.angle_b += turn_b;
        }

        travel.last_a = body_a.orientation();
        travel.last_b = body_b.orientation();
        self.travel = Some(travel);
    }

    /// One velocity iteration
    pub fn solve(&self, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        let ii_a = body_a.effective_inv_inertia();
        let ii_b = body_b.effective_inv_inertia();
        let k = ii_a + ii_b * self.ratio * self.ratio;
        if k <= EPSILON {
            return;
        }

        let lambda = -self.velocity_error(body_a, body_b) / k;
        body_a.angular_velocity += lambda * ii_a;
        body_b.angular_velocity += lambda * self.ratio * ii_b;
    }
}
