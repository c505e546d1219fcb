pub mod broad_phase;
pub mod contact;
pub mod narrow_phase;

pub use broad_phase::{Bvh, BvhEntry};
pub use contact::{
    BodyHandle, CollisionEvent, CollisionEventKind, CollisionPair, Contact, MAX_MANIFOLD_POINTS,
};
pub use narrow_phase::collide;
