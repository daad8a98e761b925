//! Exact contact generation for sphere and box pairs.
//!
//! Every routine reports a [`Contact`] whose normal points from the first
//! shape toward the second, with one point on each shape. Pushing the first
//! shape back by `-normal * depth` (or the second by `+normal * depth`)
//! separates the pair.

use crate::collision::collider::ColliderShape;
use crate::collision::contact_manifold::{find_collision_features, CollisionManifold};
use crate::math::{Vector3, EPSILON};
use crate::shapes::{OrientedBox, Sphere};

/// A single resolved contact between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vector3,

    /// Penetration depth along `normal`
    pub depth: f32,

    /// Deepest point of the first shape inside the second
    pub point_a: Vector3,

    /// Deepest point of the second shape inside the first
    pub point_b: Vector3,
}

impl Contact {
    /// The same contact seen from the second shape
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
            point_a: self.point_b,
            point_b: self.point_a,
        }
    }
}

/// Sphere-sphere contact; colliding iff the centers are closer than the radius sum
pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> Option<Contact> {
    let delta = b.center - a.center;
    let sum = a.radius + b.radius;
    let distance_sq = delta.length_squared();
    if distance_sq >= sum * sum {
        return None;
    }

    let distance = distance_sq.sqrt();
    // Coincident centers have no preferred direction; push along +y
    let normal = if distance > EPSILON { delta / distance } else { Vector3::unit_y() };
    Some(Contact {
        normal,
        depth: sum - distance,
        point_a: a.center + normal * a.radius,
        point_b: b.center - normal * b.radius,
    })
}

/// Sphere-box contact with the sphere as the first shape.
///
/// A center outside the box collides when the closest point is within the
/// radius. A center inside the box always collides and is pushed out through
/// the nearest face.
pub fn sphere_box(sphere: &Sphere, obb: &OrientedBox) -> Option<Contact> {
    let closest = obb.closest_point(sphere.center);
    let to_closest = closest.point - sphere.center;
    let distance_sq = to_closest.length_squared();

    if !closest.inside && distance_sq >= sphere.radius_squared() {
        return None;
    }

    let distance = distance_sq.sqrt();
    let (normal, depth) = if closest.inside {
        let normal = if distance > EPSILON { -(to_closest / distance) } else { -closest.face_normal };
        (normal, sphere.radius + distance)
    } else {
        let normal = if distance > EPSILON { to_closest / distance } else { -closest.face_normal };
        (normal, sphere.radius - distance)
    };

    Some(Contact {
        normal,
        depth,
        point_a: sphere.center + normal * sphere.radius,
        point_b: closest.point,
    })
}

/// Box-sphere contact with the box as the first shape
pub fn box_sphere(obb: &OrientedBox, sphere: &Sphere) -> Option<Contact> {
    sphere_box(sphere, obb).map(|contact| contact.flipped())
}

/// Reduces a box-box manifold to one contact through its centroids
pub fn from_manifold(manifold: &CollisionManifold) -> Option<Contact> {
    if !manifold.colliding {
        return None;
    }
    Some(Contact {
        normal: manifold.normal,
        depth: manifold.depth,
        point_a: manifold.avg_depth_point,
        point_b: manifold.avg_contact,
    })
}

/// Full narrow phase between two posed shapes, without any caching
pub fn contact_between(a: &ColliderShape, b: &ColliderShape) -> Option<Contact> {
    match (a, b) {
        (ColliderShape::Sphere(a), ColliderShape::Sphere(b)) => sphere_sphere(a, b),
        (ColliderShape::Sphere(a), ColliderShape::Box(b)) => sphere_box(a, b),
        (ColliderShape::Box(a), ColliderShape::Sphere(b)) => box_sphere(a, b),
        (ColliderShape::Box(a), ColliderShape::Box(b)) => from_manifold(&find_collision_features(a, b)),
    }
}
