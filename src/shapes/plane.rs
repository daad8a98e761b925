use crate::math::{Vector3, EPSILON};
use crate::shapes::Line;

/// An infinite plane defined by a unit normal and its distance from the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// The normal vector of the plane (normalized)
    pub normal: Vector3,

    /// Signed distance from the origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Creates a new plane with the given normal and distance
    pub fn new(normal: Vector3, distance: f32) -> Self {
        Self {
            normal: normal.normalize(),
            distance,
        }
    }

    /// Intersects a segment with the plane.
    ///
    /// Returns `None` when the segment is parallel to the plane (within `EPSILON`)
    /// or when the crossing lies outside the segment's `[0, 1]` parameter range.
    pub fn clip_segment(&self, line: &Line) -> Option<Vector3> {
        let ab = line.end - line.start;
        let n_a = self.normal.dot(&line.start);
        let n_ab = self.normal.dot(&ab);

        if n_ab.abs() < EPSILON {
            return None;
        }

        let t = (self.distance - n_a) / n_ab;
        if (0.0..=1.0).contains(&t) {
            Some(line.start + ab * t)
        } else {
            None
        }
    }
}
