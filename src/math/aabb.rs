use std::fmt;

use cgmath::prelude::*;
use cgmath::{Matrix4, Point3, Vector3};

/// A three-dimensional axis-aligned bounding box.
#[derive(Copy, Clone, PartialEq)]
pub struct Aabb3 {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb3 {
    /// Construct a empty axis-aligned bounding box at the origin.
    #[inline]
    pub fn zero() -> Self {
        Aabb3 {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }

    /// Construct a new axis-aligned bounding box from two points.
    #[inline]
    pub fn new(p1: Point3<f32>, p2: Point3<f32>) -> Aabb3 {
        Aabb3 {
            min: Point3::new(p1.x.min(p2.x), p1.y.min(p2.y), p1.z.min(p2.z)),
            max: Point3::new(p1.x.max(p2.x), p1.y.max(p2.y), p1.z.max(p2.z)),
        }
    }

    /// Returns the smallest box enclosing all `points`, or `None` if there are none.
    pub fn from_points<I>(points: I) -> Option<Aabb3>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Aabb3::new(first, first), |u, p| u.grow(p)))
    }

    /// Return the dimensions of this AABB.
    #[inline]
    pub fn dim(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Return the center point of this AABB.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.min + self.dim() / 2.0
    }

    /// Returns a new AABB that is grown to include the given point.
    #[inline]
    pub fn grow(&self, p: Point3<f32>) -> Self {
        Aabb3::new(
            Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        )
    }

    /// Returns the union of two boxes.
    #[inline]
    pub fn union(&self, other: &Aabb3) -> Self {
        self.grow(other.min).grow(other.max)
    }

    /// Apply a transform to the corners of this bounding box, return a new
    /// conservative bound.
    pub fn transform(&self, m: &Matrix4<f32>) -> Self {
        let corners = [
            self.min,
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            self.max,
        ];

        let first = m.transform_point(corners[0]);
        corners[1..]
            .iter()
            .fold(Aabb3::new(first, first), |u, &c| u.grow(m.transform_point(c)))
    }
}

impl fmt::Debug for Aabb3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:?} - {:?}]", self.min, self.max)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn center_of_transformed_points() {
        let aabb = Aabb3::from_points(vec![
            Point3::new(-1.0, 0.0, 2.0),
            Point3::new(1.0, 4.0, -2.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();

        assert_eq!(aabb.center(), Point3::new(0.0, 2.0, 0.0));
        assert_eq!(aabb.dim(), Vector3::new(2.0, 4.0, 4.0));

        let moved = aabb.transform(&Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0)));
        assert_eq!(moved.center(), Point3::new(10.0, 2.0, 0.0));
        assert!(Aabb3::from_points(vec![]).is_none());
    }
}
