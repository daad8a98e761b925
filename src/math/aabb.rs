use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner of the AABB
    pub min: Vector3,

    /// Maximum corner of the AABB
    pub max: Vector3,
}

impl Aabb {
    /// Creates a new AABB from minimum and maximum points
    #[inline]
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Creates an AABB centered at a position with the given half extents
    #[inline]
    pub fn from_center_half_extents(center: Vector3, half_extents: Vector3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates an AABB centered on the origin
    #[inline]
    pub fn from_half_extents(half_extents: Vector3) -> Self {
        Self::from_center_half_extents(Vector3::zero(), half_extents)
    }

    /// Returns the center of the AABB
    #[inline]
    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    /// Full edge lengths
    #[inline]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Half edge lengths
    #[inline]
    pub fn half_extents(&self) -> Vector3 {
        self.extents() * 0.5
    }

    /// Inclusive point containment
    #[inline]
    pub fn contains_point(&self, point: Vector3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
            && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Returns true if `other` lies entirely inside this box
    #[inline]
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Inclusive overlap test; touching boxes intersect
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Grows the box to include a point
    #[inline]
    pub fn expand_to_include_point(&mut self, point: Vector3) {
        self.min = self.min.min(&point);
        self.max = self.max.max(&point);
    }

    /// Clamps a point into the box
    #[inline]
    pub fn clamp_point(&self, point: Vector3) -> Vector3 {
        point.clamp(&self.min, &self.max)
    }
}
