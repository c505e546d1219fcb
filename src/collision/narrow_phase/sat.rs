//! Separating axis tests for circles and oriented boxes.
//!
//! Every test returns a [`Contact`] whose normal points from body A toward
//! body B. On equal overlap the axis evaluated first wins: `A.x, A.y, B.x,
//! B.y` for two boxes and `box.x, box.y, vertex axis` when a circle is
//! involved.

use crate::collision::contact::{BodyHandle, Contact};
use crate::dynamics::RigidBody;
use crate::geometry::Shape;
use crate::math::consts::{CONTACT_EPSILON, EPSILON, MANIFOLD_TOLERANCE};
use crate::math::utils::{
    approx_eq, approx_eq_vec, closest_point_on_segment, cross, normalize_or_x,
};
use crate::math::{Transform, Vec2};

/// Tests two bodies for overlap and builds their contact manifold
pub fn collide(
    handle_a: BodyHandle,
    body_a: &RigidBody,
    handle_b: BodyHandle,
    body_b: &RigidBody,
) -> Option<Contact> {
    collide_shapes(
        handle_a,
        body_a.shape(),
        body_a.transform(),
        handle_b,
        body_b.shape(),
        body_b.transform(),
    )
}

/// Shape-level dispatch behind [`collide`]
pub fn collide_shapes(
    handle_a: BodyHandle,
    shape_a: &Shape,
    transform_a: Transform,
    handle_b: BodyHandle,
    shape_b: &Shape,
    transform_b: Transform,
) -> Option<Contact> {
    match (*shape_a, *shape_b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(handle_a, transform_a.position, ra, handle_b, transform_b.position, rb)
        }
        (Shape::Box { .. }, Shape::Box { .. }) => {
            let verts_a = shape_a.world_vertices(transform_a)?;
            let verts_b = shape_b.world_vertices(transform_b)?;
            box_box(handle_a, transform_a, &verts_a, handle_b, transform_b, &verts_b)
        }
        (Shape::Circle { radius }, Shape::Box { .. }) => {
            let verts = shape_b.world_vertices(transform_b)?;
            circle_box(handle_a, transform_a.position, radius, handle_b, transform_b, &verts)
        }
        (Shape::Box { .. }, Shape::Circle { radius }) => {
            let verts = shape_a.world_vertices(transform_a)?;
            circle_box(handle_b, transform_b.position, radius, handle_a, transform_a, &verts)
                .map(Contact::flipped)
        }
    }
}

fn circle_circle(
    handle_a: BodyHandle,
    center_a: Vec2,
    radius_a: f32,
    handle_b: BodyHandle,
    center_b: Vec2,
    radius_b: f32,
) -> Option<Contact> {
    let delta = center_b - center_a;
    let distance = delta.length();
    let radii = radius_a + radius_b;
    if distance > radii {
        return None;
    }

    let normal = normalize_or_x(delta);
    let mut contact = Contact::new(handle_a, handle_b, normal, radii - distance);
    contact.add_point(center_a + normal * radius_a, CONTACT_EPSILON);
    Some(contact)
}

/// Running minimum-overlap axis
struct AxisSearch {
    normal: Vec2,
    depth: f32,
}

impl AxisSearch {
    fn new() -> Self {
        Self {
            normal: Vec2::X,
            depth: f32::INFINITY,
        }
    }

    /// Folds one axis in; returns false if it separates the intervals
    fn test(&mut self, axis: Vec2, (min_a, max_a): (f32, f32), (min_b, max_b): (f32, f32)) -> bool {
        if min_a > max_b || min_b > max_a {
            return false;
        }
        let depth = (max_b - min_a).min(max_a - min_b);
        if depth < self.depth {
            self.depth = depth;
            self.normal = axis;
        }
        true
    }

    /// Final normal, flipped so it points from `from` toward `to`
    fn oriented(&self, from: Vec2, to: Vec2) -> Vec2 {
        if (to - from).dot(self.normal) < 0.0 {
            -self.normal
        } else {
            self.normal
        }
    }
}

fn project_vertices(vertices: &[Vec2; 4], axis: Vec2) -> (f32, f32) {
    vertices.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), v| {
        let p = v.dot(axis);
        (min.min(p), max.max(p))
    })
}

fn project_circle(center: Vec2, radius: f32, axis: Vec2) -> (f32, f32) {
    let c = center.dot(axis);
    (c - radius, c + radius)
}

fn edges(vertices: &[Vec2; 4]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    (0..4).map(move |i| (vertices[i], vertices[(i + 1) % 4]))
}

fn box_box(
    handle_a: BodyHandle,
    transform_a: Transform,
    verts_a: &[Vec2; 4],
    handle_b: BodyHandle,
    transform_b: Transform,
    verts_b: &[Vec2; 4],
) -> Option<Contact> {
    let axes = [
        transform_a.local_x(),
        transform_a.local_y(),
        transform_b.local_x(),
        transform_b.local_y(),
    ];

    let mut search = AxisSearch::new();
    for axis in axes {
        if !search.test(axis, project_vertices(verts_a, axis), project_vertices(verts_b, axis)) {
            return None;
        }
    }

    let normal = search.oriented(transform_a.position, transform_b.position);
    let mut contact = Contact::new(handle_a, handle_b, normal, search.depth);
    for point in box_box_manifold(verts_a, verts_b) {
        contact.add_point(point, CONTACT_EPSILON);
    }
    Some(contact)
}

/// Up to two closest vertex/edge points between two overlapping boxes.
///
/// Only vertices lying inside the other box are candidates, so a corner
/// hovering above the surface never joins the manifold. When no vertex is
/// inside (edges crossing) every vertex is a candidate.
fn box_box_manifold(verts_a: &[Vec2; 4], verts_b: &[Vec2; 4]) -> Vec<Vec2> {
    let mut inside_b: Vec<Vec2> = verts_a
        .iter()
        .copied()
        .filter(|&p| contains_point(verts_b, p))
        .collect();
    let mut inside_a: Vec<Vec2> = verts_b
        .iter()
        .copied()
        .filter(|&p| contains_point(verts_a, p))
        .collect();
    if inside_a.is_empty() && inside_b.is_empty() {
        inside_b = verts_a.to_vec();
        inside_a = verts_b.to_vec();
    }

    let candidates = inside_b
        .iter()
        .flat_map(|&p| edges(verts_b).map(move |(a, b)| closest_point_on_segment(p, a, b)))
        .chain(
            inside_a
                .iter()
                .flat_map(|&p| edges(verts_a).map(move |(a, b)| closest_point_on_segment(p, a, b))),
        );

    let mut points: Vec<Vec2> = Vec::with_capacity(2);
    let mut min_dist = f32::INFINITY;
    for (point, dist_sq) in candidates {
        let dist = dist_sq.sqrt();
        if approx_eq(dist, min_dist, MANIFOLD_TOLERANCE) {
            if points.len() == 1 && !approx_eq_vec(point, points[0], CONTACT_EPSILON) {
                points.push(point);
            }
        } else if dist < min_dist {
            min_dist = dist;
            points.clear();
            points.push(point);
        }
    }
    points
}

/// True if `p` lies inside the counter-clockwise quad `vertices`, within `CONTACT_EPSILON`
fn contains_point(vertices: &[Vec2; 4], p: Vec2) -> bool {
    edges(vertices).all(|(a, b)| {
        let edge = b - a;
        let length = edge.length();
        length <= EPSILON || cross(edge, p - a) / length >= -CONTACT_EPSILON
    })
}

fn circle_box(
    handle_circle: BodyHandle,
    center: Vec2,
    radius: f32,
    handle_box: BodyHandle,
    transform_box: Transform,
    verts: &[Vec2; 4],
) -> Option<Contact> {
    let mut search = AxisSearch::new();

    for axis in [transform_box.local_x(), transform_box.local_y()] {
        if !search.test(axis, project_circle(center, radius, axis), project_vertices(verts, axis)) {
            return None;
        }
    }

    let nearest = verts
        .iter()
        .copied()
        .min_by(|a, b| a.distance_squared(center).total_cmp(&b.distance_squared(center)))
        .unwrap_or(transform_box.position);
    let to_vertex = nearest - center;
    if to_vertex.length_squared() > EPSILON * EPSILON {
        let axis = to_vertex.normalize();
        if !search.test(axis, project_circle(center, radius, axis), project_vertices(verts, axis)) {
            return None;
        }
    }

    let normal = search.oriented(center, transform_box.position);
    let point = edges(verts)
        .map(|(a, b)| closest_point_on_segment(center, a, b))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(center, |(point, _)| point);

    let mut contact = Contact::new(handle_circle, handle_box, normal, search.depth);
    contact.add_point(point, CONTACT_EPSILON);
    Some(contact)
}
