use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Ray representation for intersection tests
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Ray {
    /// Origin of the ray
    pub origin: Vector3,

    /// Direction of the ray (normalized on construction)
    pub direction: Vector3,
}

impl Ray {
    /// Creates a new ray, normalizing the direction
    #[inline]
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Returns the point at a given distance along the ray
    #[inline]
    pub fn point_at(&self, t: f32) -> Vector3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first hit with a sphere, if any.
    ///
    /// A ray starting inside the sphere reports the exit distance.
    pub fn intersect_sphere(&self, center: Vector3, radius: f32) -> Option<f32> {
        let e = center - self.origin;
        let rad_sq = radius * radius;
        let e_sq = e.length_squared();
        let a = e.dot(&self.direction);
        let b_sq = e_sq - a * a;
        if rad_sq - b_sq < 0.0 {
            return None;
        }
        let f = (rad_sq - b_sq).sqrt();

        let t = if e_sq < rad_sq { a + f } else { a - f };
        if t < 0.0 {
            None
        } else {
            Some(t)
        }
    }
}
