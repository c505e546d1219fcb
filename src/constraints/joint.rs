use crate::collision::BodyHandle;
use crate::dynamics::RigidBody;

use super::distance_joint::DistanceJoint;
use super::gear_joint::GearJoint;

/// A handle to a joint in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointHandle(pub u32);

impl JointHandle {
    /// Returns the index of this handle
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for JointHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "joint#{}", self.0)
    }
}

/// An equality constraint between two bodies
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Joint {
    Distance(DistanceJoint),
    Gear(GearJoint),
}

impl Joint {
    /// The two constrained bodies
    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        match self {
            Joint::Distance(j) => (j.body_a, j.body_b),
            Joint::Gear(j) => (j.body_a, j.body_b),
        }
    }

    /// Returns true if the joint constrains `handle`
    pub fn involves(&self, handle: BodyHandle) -> bool {
        let (a, b) = self.bodies();
        a == handle || b == handle
    }

    /// Per-step setup and warm start
    pub fn pre_solve(&mut self, body_a: &mut RigidBody, body_b: &mut RigidBody, dt: f32) {
        match self {
            Joint::Distance(j) => j.pre_solve(body_a, body_b, dt),
            Joint::Gear(j) => j.pre_solve(body_a, body_b, dt),
        }
    }

    /// One velocity iteration
    pub fn solve(&mut self, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        match self {
            Joint::Distance(j) => j.solve(body_a, body_b),
            Joint::Gear(j) => j.solve(body_a, body_b),
        }
    }

    /// Registration-time setup that needs the bodies' current pose
    pub(crate) fn on_added(&mut self, body_a: &RigidBody, body_b: &RigidBody) {
        match self {
            Joint::Distance(j) => j.resolve_rest_length(body_a, body_b),
            Joint::Gear(j) => j.reset_travel(body_a, body_b),
        }
    }
}

impl From<DistanceJoint> for Joint {
    fn from(joint: DistanceJoint) -> Self {
        Joint::Distance(joint)
    }
}

impl From<GearJoint> for Joint {
    fn from(joint: GearJoint) -> Self {
        Joint::Gear(joint)
    }
}
