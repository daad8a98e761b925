use crate::math::{Vector3, Aabb, Ray};

/// A sphere in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere; negative radii are clamped to zero
    pub fn new(center: Vector3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Squared radius
    #[inline]
    pub fn radius_squared(&self) -> f32 {
        self.radius * self.radius
    }

    /// Returns true if the point lies inside or on the sphere
    #[inline]
    pub fn contains_point(&self, point: Vector3) -> bool {
        self.center.distance_squared(&point) <= self.radius_squared()
    }

    /// Overlap depth with another sphere, or `None` when the spheres do not touch
    pub fn overlap(&self, other: &Sphere) -> Option<f32> {
        let distance = self.center.distance(&other.center);
        let sum = self.radius + other.radius;
        if distance < sum {
            Some(sum - distance)
        } else {
            None
        }
    }

    /// Bounding box of the sphere
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vector3::splat(self.radius))
    }

    /// Distance along `ray` to the sphere, if it is hit
    #[inline]
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_sphere(self.center, self.radius)
    }
}
