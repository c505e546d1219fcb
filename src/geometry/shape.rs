use crate::math::{Transform, Vec2};

use super::aabb::Aabb;

/// A collision shape attached to a rigid body.
///
/// Both variants are centered on the body's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// A disc defined by its radius
    Circle { radius: f32 },
    /// An oriented rectangle defined by half-extents along its local axes
    Box { half_extents: Vec2 },
}

impl Default for Shape {
    fn default() -> Self {
        Self::Circle { radius: 1.0 }
    }
}

impl Shape {
    /// Creates a circle shape. Negative radii are treated as their magnitude.
    #[inline]
    pub fn circle(radius: f32) -> Self {
        Self::Circle {
            radius: radius.abs(),
        }
    }

    /// Creates a box shape from half-extents
    #[inline]
    pub fn rectangle(half_extents: Vec2) -> Self {
        Self::Box {
            half_extents: half_extents.abs(),
        }
    }

    /// Creates a box shape from full width and height
    #[inline]
    pub fn rectangle_from_size(width: f32, height: f32) -> Self {
        Self::rectangle(Vec2::new(width, height) * 0.5)
    }

    /// Radius of the smallest origin-centered circle enclosing the shape
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Box { half_extents } => half_extents.length(),
        }
    }

    /// Box corners in local space, counter-clockwise starting bottom-left.
    ///
    /// Returns `None` for circles.
    #[inline]
    pub fn local_vertices(&self) -> Option<[Vec2; 4]> {
        match *self {
            Shape::Circle { .. } => None,
            Shape::Box { half_extents: h } => Some([
                Vec2::new(-h.x, -h.y),
                Vec2::new(h.x, -h.y),
                Vec2::new(h.x, h.y),
                Vec2::new(-h.x, h.y),
            ]),
        }
    }

    /// Box corners in world space, in the same winding as [`Shape::local_vertices`]
    #[inline]
    pub fn world_vertices(&self, transform: Transform) -> Option<[Vec2; 4]> {
        self.local_vertices()
            .map(|vertices| vertices.map(|v| transform.transform_point(v)))
    }

    /// Computes the world-space AABB of this shape under `transform`
    pub fn world_aabb(&self, transform: Transform) -> Aabb {
        match *self {
            Shape::Circle { radius } => {
                Aabb::from_center_half_extents(transform.position, Vec2::splat(radius))
            }
            Shape::Box { half_extents } => {
                // Rotated half-extents: |R| * h
                let r = transform.rotation;
                let extent = Vec2::new(
                    r.x_axis.x.abs() * half_extents.x + r.y_axis.x.abs() * half_extents.y,
                    r.x_axis.y.abs() * half_extents.x + r.y_axis.y.abs() * half_extents.y,
                );
                Aabb::from_center_half_extents(transform.position, extent)
            }
        }
    }

    /// Moment of inertia about the center for the given mass.
    ///
    /// Disc: `m r^2 / 2`. Rectangle: `m (w^2 + h^2) / 12`.
    #[inline]
    pub fn inertia(&self, mass: f32) -> f32 {
        match *self {
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            Shape::Box { half_extents } => {
                let size = half_extents * 2.0;
                mass * (size.x * size.x + size.y * size.y) / 12.0
            }
        }
    }
}
