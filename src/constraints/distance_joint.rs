use crate::collision::BodyHandle;
use crate::dynamics::RigidBody;
use crate::math::consts::EPSILON;
use crate::math::utils::{cross, cross_scalar};
use crate::math::Vec2;

/// Default bound on the accumulated impulse of a compliant joint
pub const DEFAULT_MAX_IMPULSE: f32 = 1000.0;

/// Default Baumgarte factor for joint drift correction
pub const DEFAULT_BAUMGARTE: f32 = 0.2;

/// Which side of the joint's length range is currently enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitState {
    /// Equality joint, or a limited joint held at one fixed length
    Equal,
    /// Stretched past `max_length`; may only pull
    AtMax,
    /// Compressed below `min_length`; may only push
    AtMin,
    /// Inside the allowed range; the joint does nothing this step
    Inactive,
}

/// Keeps two anchor points at a target distance.
///
/// A compliance of zero makes a rigid rod; a positive compliance softens the
/// joint into a spring (`gamma = compliance / dt^2`). With limits set the
/// joint behaves like a rope or strut that only acts outside
/// `[min_length, max_length]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceJoint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Anchor on A in A's local space
    pub local_anchor_a: Vec2,
    /// Anchor on B in B's local space
    pub local_anchor_b: Vec2,
    /// Target distance; `None` measures the anchors when the joint is added
    pub rest_length: Option<f32>,
    /// Inverse stiffness (0 = rigid)
    pub compliance: f32,
    pub min_length: Option<f32>,
    pub max_length: Option<f32>,
    /// Clamp on the accumulated impulse when compliant
    pub max_impulse: f32,
    /// Drift correction factor
    pub baumgarte: f32,

    accumulated_impulse: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    cache: DistanceCache,
}

/// Per-step data computed in `pre_solve`
#[derive(Debug, Clone, Copy, PartialEq)]
struct DistanceCache {
    r_a: Vec2,
    r_b: Vec2,
    normal: Vec2,
    effective_mass: f32,
    bias: f32,
    gamma: f32,
    state: LimitState,
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self {
            r_a: Vec2::ZERO,
            r_b: Vec2::ZERO,
            normal: Vec2::X,
            effective_mass: 0.0,
            bias: 0.0,
            gamma: 0.0,
            state: LimitState::Inactive,
        }
    }
}

impl DistanceJoint {
    /// Joins the centers of two bodies at their current separation
    pub fn new(body_a: BodyHandle, body_b: BodyHandle) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a: Vec2::ZERO,
            local_anchor_b: Vec2::ZERO,
            rest_length: None,
            compliance: 0.0,
            min_length: None,
            max_length: None,
            max_impulse: DEFAULT_MAX_IMPULSE,
            baumgarte: DEFAULT_BAUMGARTE,
            accumulated_impulse: 0.0,
            cache: DistanceCache::default(),
        }
    }

    /// Sets body-space anchors
    pub fn with_anchors(mut self, local_anchor_a: Vec2, local_anchor_b: Vec2) -> Self {
        self.local_anchor_a = local_anchor_a;
        self.local_anchor_b = local_anchor_b;
        self
    }

    /// Sets the target distance. Non-positive lengths are measured at registration.
    pub fn with_rest_length(mut self, rest_length: f32) -> Self {
        self.rest_length = (rest_length > 0.0).then_some(rest_length);
        self
    }

    /// Sets the compliance (inverse stiffness)
    pub fn with_compliance(mut self, compliance: f32) -> Self {
        self.compliance = compliance.max(0.0);
        self
    }

    /// Only act outside `[min, max]`
    pub fn with_limits(mut self, min: f32, max: f32) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.min_length = Some(lo.max(0.0));
        self.max_length = Some(hi.max(0.0));
        self
    }

    /// Sets the compliant impulse clamp
    pub fn with_max_impulse(mut self, max_impulse: f32) -> Self {
        self.max_impulse = max_impulse.abs();
        self
    }

    /// Impulse accumulated so far, carried over as warm start
    pub fn accumulated_impulse(&self) -> f32 {
        self.accumulated_impulse
    }

    /// Limit side that was active in the last `pre_solve`
    pub fn limit_state(&self) -> LimitState {
        self.cache.state
    }

    /// World-space anchor positions
    pub fn world_anchors(&self, body_a: &RigidBody, body_b: &RigidBody) -> (Vec2, Vec2) {
        (
            body_a.point_in_world_space(self.local_anchor_a),
            body_b.point_in_world_space(self.local_anchor_b),
        )
    }

    /// Current anchor distance
    pub fn current_length(&self, body_a: &RigidBody, body_b: &RigidBody) -> f32 {
        let (pa, pb) = self.world_anchors(body_a, body_b);
        pa.distance(pb)
    }

    /// Fills in a missing rest length from the current anchor distance
    pub fn resolve_rest_length(&mut self, body_a: &RigidBody, body_b: &RigidBody) {
        if self.rest_length.is_none() {
            self.rest_length = Some(self.current_length(body_a, body_b));
        }
    }

    /// Computes lever arms, effective mass and bias for this step, then
    /// applies the accumulated impulse as a warm start.
    pub fn pre_solve(&mut self, body_a: &mut RigidBody, body_b: &mut RigidBody, dt: f32) {
        let (pa, pb) = self.world_anchors(body_a, body_b);
        let r_a = pa - body_a.position();
        let r_b = pb - body_b.position();
        let delta = pb - pa;
        let length = delta.length();
        let normal = if length > EPSILON { delta / length } else { Vec2::X };

        let rest = self.rest_length.unwrap_or(length);
        let (target, state) = match (self.min_length, self.max_length) {
            (None, None) => (rest, LimitState::Equal),
            (min, max) => {
                let lo = min.unwrap_or(0.0);
                let hi = max.unwrap_or(f32::INFINITY);
                if hi - lo <= EPSILON {
                    (lo, LimitState::Equal)
                } else if length > hi {
                    (hi, LimitState::AtMax)
                } else if length < lo {
                    (lo, LimitState::AtMin)
                } else {
                    (length, LimitState::Inactive)
                }
            }
        };

        let rn_a = cross(r_a, normal);
        let rn_b = cross(r_b, normal);
        let mut k = body_a.effective_inv_mass()
            + body_b.effective_inv_mass()
            + rn_a * rn_a * body_a.effective_inv_inertia()
            + rn_b * rn_b * body_b.effective_inv_inertia();
        let gamma = if self.compliance > 0.0 && dt > 0.0 {
            self.compliance / (dt * dt)
        } else {
            0.0
        };
        k += gamma;

        let error = length - target;
        self.cache = DistanceCache {
            r_a,
            r_b,
            normal,
            effective_mass: if k > EPSILON { 1.0 / k } else { 0.0 },
            bias: if dt > 0.0 { -(self.baumgarte / dt) * error } else { 0.0 },
            gamma,
            state,
        };

        if state == LimitState::Inactive {
            self.accumulated_impulse = 0.0;
            return;
        }
        if self.accumulated_impulse != 0.0 {
            self.apply(body_a, body_b, self.accumulated_impulse);
        }
    }

    /// One velocity iteration
    pub fn solve(&mut self, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        let cache = self.cache;
        if cache.state == LimitState::Inactive || cache.effective_mass == 0.0 {
            return;
        }

        let relative = body_b.linear_velocity + cross_scalar(body_b.angular_velocity, cache.r_b)
            - body_a.linear_velocity
            - cross_scalar(body_a.angular_velocity, cache.r_a);
        let c_dot = relative.dot(cache.normal);

        let lambda =
            -cache.effective_mass * (c_dot - cache.bias + cache.gamma * self.accumulated_impulse);

        let old = self.accumulated_impulse;
        let mut accumulated = old + lambda;
        if self.compliance > 0.0 {
            accumulated = accumulated.clamp(-self.max_impulse, self.max_impulse);
        }
        accumulated = match cache.state {
            LimitState::AtMax => accumulated.min(0.0),
            LimitState::AtMin => accumulated.max(0.0),
            _ => accumulated,
        };
        self.accumulated_impulse = accumulated;

        let applied = accumulated - old;
        if applied != 0.0 {
            self.apply(body_a, body_b, applied);
        }
    }

    fn apply(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, impulse: f32) {
        let p = self.cache.normal * impulse;

        body_a.linear_velocity -= p * body_a.effective_inv_mass();
        body_a.angular_velocity -= cross(self.cache.r_a, p) * body_a.effective_inv_inertia();
        body_b.linear_velocity += p * body_b.effective_inv_mass();
        body_b.angular_velocity += cross(self.cache.r_b, p) * body_b.effective_inv_inertia();
    }
}
