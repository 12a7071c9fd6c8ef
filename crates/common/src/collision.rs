use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Overlap test for the closed intervals `[s1, f1]` and `[s2, f2]`.
///
/// Intervals that only touch at an endpoint count as overlapping. Collision
/// against voxels relies on this: a body resting exactly on a face is blocked.
pub fn intervals_overlap(s1: f32, f1: f32, s2: f32, f2: f32) -> bool {
    if s1 == s2 {
        return true;
    }
    if s1 < s2 { f1 >= s2 } else { f2 >= s1 }
}

/// Axis-aligned bounding box given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` extending `half_extents` along each axis.
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Cube centered on `center` with edge length `edge`.
    pub fn cube(center: Vec3, edge: f32) -> Self {
        Self::from_center(center, Vec3::splat(edge / 2.0))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when the boxes overlap on all three axes (touching included).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        intervals_overlap(self.min.x, self.max.x, other.min.x, other.max.x)
            && intervals_overlap(self.min.y, self.max.y, other.min.y, other.max.y)
            && intervals_overlap(self.min.z, self.max.z, other.min.z, other.max.z)
    }
}
