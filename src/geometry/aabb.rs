use crate::math::Vec2;

/// An axis-aligned bounding box defined by minimum and maximum corners.
///
/// Used by the broad phase to prune candidate pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum corner (smallest x, y values)
    pub min: Vec2,
    /// Maximum corner (largest x, y values)
    pub max: Vec2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// An empty AABB that contains no points
    pub const EMPTY: Self = Self {
        min: Vec2::new(f32::INFINITY, f32::INFINITY),
        max: Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Creates an AABB from minimum and maximum points
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from center and half-extents
    #[inline]
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates the tightest AABB around a set of points
    #[inline]
    pub fn from_points(points: &[Vec2]) -> Self {
        points
            .iter()
            .fold(Self::EMPTY, |aabb, &point| aabb.expand_to_include(point))
    }

    /// Returns the center of the AABB
    #[inline]
    pub fn center(self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents
    #[inline]
    pub fn half_extents(self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Returns the full size of the AABB
    #[inline]
    pub fn size(self) -> Vec2 {
        self.max - self.min
    }

    /// Returns true if this AABB is empty
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Returns true if this AABB contains the given point (boundary inclusive)
    #[inline]
    pub fn contains_point(self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Returns true if this AABB fully contains another AABB
    #[inline]
    pub fn contains_aabb(self, other: Self) -> bool {
        self.min.x <= other.min.x
            && self.max.x >= other.max.x
            && self.min.y <= other.min.y
            && self.max.y >= other.max.y
    }

    /// Returns true if the two boxes overlap on both axes.
    ///
    /// Touching boundaries count as overlap.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Returns a new AABB that is the union of this and another AABB
    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns a new AABB expanded to include a point
    #[inline]
    pub fn expand_to_include(self, point: Vec2) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns a new AABB grown by `margin` on every side
    #[inline]
    pub fn expand(self, margin: f32) -> Self {
        let m = Vec2::splat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Returns the longest axis (0 = x, 1 = y). Ties pick y.
    #[inline]
    pub fn longest_axis(self) -> usize {
        let size = self.size();
        if size.x > size.y {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let aabb = Aabb::new(Vec2::new(-1.0, -2.0), Vec2::new(1.0, 2.0));
        assert_eq!(aabb.center(), Vec2::ZERO);
        assert_eq!(aabb.half_extents(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_from_center_half_extents() {
        let aabb = Aabb::from_center_half_extents(Vec2::new(1.0, 2.0), Vec2::ONE);
        assert_eq!(aabb.min, Vec2::new(0.0, 1.0));
        assert_eq!(aabb.max, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_intersects_is_inclusive() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let touching = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        let apart = Aabb::new(Vec2::new(1.01, 0.0), Vec2::new(2.0, 1.0));
        // Overlapping on x only
        let offset = Aabb::new(Vec2::new(0.5, 2.0), Vec2::new(1.5, 3.0));

        assert!(a.intersects(touching));
        assert!(touching.intersects(a));
        assert!(!a.intersects(apart));
        assert!(!a.intersects(offset));
    }

    #[test]
    fn test_union() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::new(Vec2::new(2.0, -1.0), Vec2::new(3.0, 0.5));
        let u = a.union(b);

        assert_eq!(u.min, Vec2::new(0.0, -1.0));
        assert_eq!(u.max, Vec2::new(3.0, 1.0));
        assert!(u.contains_aabb(a));
        assert!(u.contains_aabb(b));
    }

    #[test]
    fn test_empty_union_is_identity() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        assert!(Aabb::EMPTY.is_empty());
        assert_eq!(Aabb::EMPTY.union(a), a);
    }

    #[test]
    fn test_longest_axis() {
        assert_eq!(Aabb::new(Vec2::ZERO, Vec2::new(3.0, 1.0)).longest_axis(), 0);
        assert_eq!(Aabb::new(Vec2::ZERO, Vec2::new(1.0, 3.0)).longest_axis(), 1);
        assert_eq!(Aabb::new(Vec2::ZERO, Vec2::ONE).longest_axis(), 1);
    }

    #[test]
    fn test_from_points() {
        let points = [Vec2::new(1.0, 2.0), Vec2::new(-1.0, 0.0), Vec2::new(0.0, -2.0)];
        let aabb = Aabb::from_points(&points);

        assert_eq!(aabb.min, Vec2::new(-1.0, -2.0));
        assert_eq!(aabb.max, Vec2::new(1.0, 2.0));
        assert!(aabb.contains_point(Vec2::ZERO));
    }

    #[test]
    fn test_expand() {
        let aabb = Aabb::new(Vec2::ZERO, Vec2::ONE).expand(0.5);
        assert_eq!(aabb.min, Vec2::splat(-0.5));
        assert_eq!(aabb.max, Vec2::splat(1.5));
    }
}
