pub mod sat;

pub use sat::{collide, collide_shapes};
