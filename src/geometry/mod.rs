mod aabb;
mod shape;

pub use aabb::Aabb;
pub use shape::Shape;
