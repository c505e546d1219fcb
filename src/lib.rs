//! # accel2d
//!
//! A 2D rigid body physics engine written in Rust.
//!
//! ## Features
//!
//! - **Rigid Body Dynamics**: Planar linear and angular motion with damping and lock flags
//! - **Collision Detection**: Separating axis tests for circles and oriented boxes
//! - **Broad Phase**: Bounding Volume Hierarchy (BVH) rebuilt every substep
//! - **Contact Solver**: Sequential impulses with restitution and Coulomb friction
//! - **Joints**: Distance joints (compliance, limits, warm starting) and gear joints
//! - **Force Generators**: Gravity, springs, aerodynamic surfaces and buoyancy
//!
//! ## Quick Start
//!
//! ```rust
//! use accel2d::prelude::*;
//!
//! // Create a physics world
//! let mut world = World::default();
//! world.set_gravity(Vec2::new(0.0, -9.81));
//!
//! // Create a static floor
//! world.add_body(RigidBody::rectangle(Vec2::new(10.0, 0.5)).with_infinite_mass());
//!
//! // Create a dynamic ball
//! let ball = world.add_body(
//!     RigidBody::circle(0.5)
//!         .with_position(Vec2::new(0.0, 5.0))
//!         .with_mass(1.0),
//! );
//!
//! // Simulation loop
//! let dt = 1.0 / 60.0;
//! for _ in 0..600 {
//!     world.start_frame();
//!     world.step(dt, 8);
//! }
//!
//! let pos = world.body(ball).unwrap().position();
//! assert!(pos.y > 0.5);
//! ```
//!
//! Logging goes through [`tracing`]; install a subscriber in the host to see it.

pub mod collision;
pub mod constraints;
pub mod dynamics;
pub mod error;
pub mod forces;
pub mod geometry;
pub mod math;
pub mod solver;
mod world;

pub use error::{PhysicsError, Result};
pub use world::{World, WorldConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collision::{
        BodyHandle, CollisionEvent, CollisionEventKind, CollisionPair, Contact,
    };
    pub use crate::constraints::{DistanceJoint, GearJoint, Joint, JointHandle, LimitState};
    pub use crate::dynamics::RigidBody;
    pub use crate::error::PhysicsError;
    pub use crate::forces::{ForceGenerator, ForceRegistry};
    pub use crate::geometry::{Aabb, Shape};
    pub use crate::math::{Mat2, Transform, Vec2};
    pub use crate::solver::{SequentialImpulseSolver, SolverConfig};
    pub use crate::world::{World, WorldConfig};
}
