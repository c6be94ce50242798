//! Spawn shapes

use crate::foundation::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Plane a 2D policy works in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Plane {
    /// Horizontal x, vertical y
    #[default]
    XY,
    /// Horizontal x, vertical z
    XZ,
    /// Horizontal y, vertical z
    YZ,
}

impl Plane {
    /// Lift plane coordinates into 3D, leaving the orthogonal axis at zero
    pub fn embed(self, a: f32, b: f32) -> Vec3 {
        match self {
            Plane::XY => Vec3::new(a, b, 0.0),
            Plane::XZ => Vec3::new(a, 0.0, b),
            Plane::YZ => Vec3::new(0.0, a, b),
        }
    }

    /// Plane coordinates of a 3D vector
    pub fn project(self, v: Vec3) -> Vec2 {
        match self {
            Plane::XY => Vec2::new(v.x, v.y),
            Plane::XZ => Vec2::new(v.x, v.z),
            Plane::YZ => Vec2::new(v.y, v.z),
        }
    }

    /// Zero the axis orthogonal to the plane
    pub fn flatten(self, v: Vec3) -> Vec3 {
        let p = self.project(v);
        self.embed(p.x, p.y)
    }
}

/// Axis-aligned box given by its minimum corner and size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Box3 {
    /// Minimum corner
    pub position: Vec3,
    /// Extent along each axis
    pub size: Vec3,
}

impl Box3 {
    /// Box from minimum corner and size
    pub fn new(position: Vec3, size: Vec3) -> Self {
        Self { position, size }
    }

    /// Box spanning `[-half, half]` on each axis
    pub fn from_half_extents(half: Vec3) -> Self {
        Self {
            position: -half,
            size: half * 2.0,
        }
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.position + self.size
    }

    /// Center point
    pub fn center(&self) -> Vec3 {
        self.position + self.size * 0.5
    }

    /// Move the box so its center lands on `center`
    pub fn set_center(&mut self, center: Vec3) {
        self.position = center - self.size * 0.5;
    }

    /// Whether `point` lies inside or on the boundary
    pub fn contains(&self, point: Vec3) -> bool {
        let max = self.max();
        (0..3).all(|i| point[i] >= self.position[i] && point[i] <= max[i])
    }

    /// Whether the interiors of two boxes intersect
    pub fn overlaps(&self, other: &Box3) -> bool {
        let a = self.max();
        let b = other.max();
        (0..3).all(|i| self.position[i] < b[i] && a[i] > other.position[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_embed_and_project() {
        for plane in [Plane::XY, Plane::XZ, Plane::YZ] {
            let v = plane.embed(2.0, 3.0);
            assert_eq!(plane.project(v), Vec2::new(2.0, 3.0));
        }
        assert_eq!(Plane::XZ.flatten(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 0.0, 3.0));
    }

    #[test]
    fn test_half_extents_box_is_centered() {
        let b = Box3::from_half_extents(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.center(), Vec3::zeros());
        assert_eq!(b.size, Vec3::new(2.0, 4.0, 6.0));
        assert!(b.contains(Vec3::new(-1.0, 2.0, 0.0)));
        assert!(!b.contains(Vec3::new(0.0, 0.0, 3.5)));
    }

    #[test]
    fn test_overlaps() {
        let a = Box3::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let b = Box3::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0));
        let c = Box3::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Touching faces do not overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_set_center() {
        let mut b = Box3::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        b.set_center(Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(b.position, Vec3::new(4.0, 4.0, 4.0));
    }
}
