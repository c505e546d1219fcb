use crate::math::Vec2;

/// Maximum number of points in a contact manifold
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// A handle to a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    /// Invalid/null body handle
    pub const INVALID: Self = Self(u32::MAX);

    /// Creates a new body handle
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index of this handle
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// A collision between two bodies, derived fresh every substep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contact {
    /// First body
    pub body_a: BodyHandle,
    /// Second body
    pub body_b: BodyHandle,
    /// Unit normal pointing from A toward B
    pub normal: Vec2,
    /// Penetration depth along the normal (positive when overlapping)
    pub penetration: f32,
    points: [Vec2; MAX_MANIFOLD_POINTS],
    point_count: usize,
}

impl Contact {
    /// Creates a contact with an empty manifold
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, normal: Vec2, penetration: f32) -> Self {
        Self {
            body_a,
            body_b,
            normal,
            penetration,
            points: [Vec2::ZERO; MAX_MANIFOLD_POINTS],
            point_count: 0,
        }
    }

    /// Adds a manifold point.
    ///
    /// Points within `epsilon` of an existing point are merged; returns false
    /// when the point was merged or the manifold is full.
    pub fn add_point(&mut self, point: Vec2, epsilon: f32) -> bool {
        if self
            .points()
            .iter()
            .any(|p| p.distance_squared(point) <= epsilon * epsilon)
        {
            return false;
        }
        if self.point_count == MAX_MANIFOLD_POINTS {
            return false;
        }
        self.points[self.point_count] = point;
        self.point_count += 1;
        true
    }

    /// Active manifold points
    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points[..self.point_count]
    }

    /// Number of manifold points
    #[inline]
    pub fn len(&self) -> usize {
        self.point_count
    }

    /// Returns true if the manifold has no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }

    /// Ordered pair identifying the two bodies
    #[inline]
    pub fn pair(&self) -> CollisionPair {
        CollisionPair::new(self.body_a, self.body_b)
    }

    /// Returns the contact seen from B's side: bodies swapped, normal negated
    pub fn flipped(mut self) -> Self {
        std::mem::swap(&mut self.body_a, &mut self.body_b);
        self.normal = -self.normal;
        self
    }
}

/// A collision pair identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionPair {
    /// First body (always has smaller handle)
    pub body_a: BodyHandle,
    /// Second body (always has larger handle)
    pub body_b: BodyHandle,
}

impl CollisionPair {
    /// Creates a new collision pair, ensuring consistent ordering
    pub fn new(a: BodyHandle, b: BodyHandle) -> Self {
        if a.0 <= b.0 {
            Self { body_a: a, body_b: b }
        } else {
            Self { body_a: b, body_b: a }
        }
    }

    /// Returns true if `handle` is one of the two bodies
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.body_a == handle || self.body_b == handle
    }
}

/// Phase of a touching pair across consecutive steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionEventKind {
    /// The pair touches now but did not last step
    Started,
    /// The pair touched last step and still does
    Persisted,
    /// The pair touched last step but no longer does
    Ended,
}

/// Per-pair collision notification produced by each world step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionEvent {
    pub pair: CollisionPair,
    pub kind: CollisionEventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifold_add_points() {
        let mut contact = Contact::new(BodyHandle::new(0), BodyHandle::new(1), Vec2::Y, 0.1);

        assert!(contact.is_empty());
        assert!(contact.add_point(Vec2::new(1.0, 0.0), 1e-3));
        assert_eq!(contact.len(), 1);
    }

    #[test]
    fn test_manifold_merges_duplicates() {
        let mut contact = Contact::new(BodyHandle::new(0), BodyHandle::new(1), Vec2::Y, 0.1);

        contact.add_point(Vec2::new(1.0, 0.0), 1e-3);
        assert!(!contact.add_point(Vec2::new(1.0, 0.0005), 1e-3));
        assert_eq!(contact.points(), &[Vec2::new(1.0, 0.0)]);
    }

    #[test]
    fn test_manifold_max_points() {
        let mut contact = Contact::new(BodyHandle::new(0), BodyHandle::new(1), Vec2::Y, 0.1);

        for i in 0..5 {
            contact.add_point(Vec2::new(i as f32, 0.0), 1e-3);
        }

        assert_eq!(contact.len(), MAX_MANIFOLD_POINTS);
        assert_eq!(contact.points()[1], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_flipped() {
        let contact = Contact::new(BodyHandle::new(3), BodyHandle::new(1), Vec2::X, 0.2).flipped();
        assert_eq!(contact.body_a, BodyHandle::new(1));
        assert_eq!(contact.body_b, BodyHandle::new(3));
        assert_eq!(contact.normal, -Vec2::X);
        assert_eq!(contact.pair(), CollisionPair::new(BodyHandle::new(1), BodyHandle::new(3)));
    }

    #[test]
    fn test_collision_pair_ordering() {
        let pair1 = CollisionPair::new(BodyHandle::new(1), BodyHandle::new(2));
        let pair2 = CollisionPair::new(BodyHandle::new(2), BodyHandle::new(1));

        assert_eq!(pair1, pair2);
        assert_eq!(pair1.body_a.0, 1);
        assert_eq!(pair1.body_b.0, 2);
        assert!(pair1.contains(BodyHandle::new(2)));
        assert!(!pair1.contains(BodyHandle::new(0)));
    }

    #[test]
    fn test_collision_pair_sort_order() {
        let mut pairs = vec![
            CollisionPair::new(BodyHandle::new(2), BodyHandle::new(3)),
            CollisionPair::new(BodyHandle::new(0), BodyHandle::new(5)),
            CollisionPair::new(BodyHandle::new(0), BodyHandle::new(1)),
        ];
        pairs.sort();
        assert_eq!(pairs[0], CollisionPair::new(BodyHandle::new(0), BodyHandle::new(1)));
        assert_eq!(pairs[2], CollisionPair::new(BodyHandle::new(2), BodyHandle::new(3)));
    }
}
