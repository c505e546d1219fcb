mod body_set;
mod integrator;
mod rigid_body;

pub use body_set::BodySet;
pub use integrator::{integrate, integrate_positions, integrate_velocities};
pub use rigid_body::{RigidBody, DEFAULT_DAMPING};
