//! Error types for the physics world.

use thiserror::Error;

use crate::collision::BodyHandle;
use crate::constraints::JointHandle;

/// Errors returned by world operations that can't absorb bad input.
///
/// Degenerate numeric input (zero-length vectors, zero mass, `dt <= 0`) is
/// handled in place and never surfaces here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Body handle does not refer to a live body.
    #[error("unknown body: {0}")]
    UnknownBody(BodyHandle),

    /// A joint was asked to connect a body to itself.
    #[error("joint connects {0} to itself")]
    SelfJoint(BodyHandle),

    /// Joint handle does not refer to a live joint.
    #[error("unknown joint: {0}")]
    UnknownJoint(JointHandle),

    /// A configuration value is out of range.
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Result alias for world operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            PhysicsError::UnknownBody(BodyHandle::new(3)).to_string(),
            "unknown body: body#3"
        );
        assert_eq!(
            PhysicsError::InvalidConfig {
                field: "slop",
                reason: "must be non-negative",
            }
            .to_string(),
            "invalid config: slop must be non-negative"
        );
    }
}
