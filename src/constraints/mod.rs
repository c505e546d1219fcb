mod contact_constraint;
mod distance_joint;
mod gear_joint;
mod joint;

pub use contact_constraint::{solve_position, solve_velocity, PositionCorrection};
pub use distance_joint::{DistanceJoint, LimitState, DEFAULT_BAUMGARTE, DEFAULT_MAX_IMPULSE};
pub use gear_joint::GearJoint;
pub use joint::{Joint, JointHandle};
