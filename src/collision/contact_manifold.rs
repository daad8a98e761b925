use crate::collision::clipping::{clip_edges_to_box, corners_inside};
use crate::collision::sat::{candidate_axes, usable_axis};
use crate::math::Vector3;
use crate::shapes::OrientedBox;

/// Penetrations at or below this are treated as touching, not colliding
pub const PENETRATION_EPSILON: f32 = 1.0e-3;

/// Squared distance under which two contact points are merged
pub const CONTACT_MERGE_EPSILON: f32 = 1.0e-4;

/// Slack added to the bounding-sphere early out
pub const BOUNDING_SPHERE_MARGIN: f32 = 0.1;

/// Contact description between two boxes.
///
/// `normal` points from the first box toward the second. Contact points lie on
/// the second box's surface inside the first; depth points lie on the first
/// box's surface inside the second.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionManifold {
    pub colliding: bool,
    pub normal: Vector3,
    pub depth: f32,
    pub contacts: Vec<Vector3>,
    pub depth_points: Vec<Vector3>,
    pub avg_contact: Vector3,
    pub avg_depth_point: Vector3,
}

impl CollisionManifold {
    /// Empty, non-colliding manifold
    pub fn new() -> Self {
        Self {
            colliding: false,
            normal: Vector3::unit_z(),
            depth: f32::MAX,
            contacts: Vec::new(),
            depth_points: Vec::new(),
            avg_contact: Vector3::ZERO,
            avg_depth_point: Vector3::ZERO,
        }
    }

    /// Clears the manifold back to its non-colliding state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for CollisionManifold {
    fn default() -> Self {
        Self::new()
    }
}

/// Full box-box narrow phase: SAT for the normal and depth, then edge clipping
/// for the contact points.
pub fn find_collision_features(a: &OrientedBox, b: &OrientedBox) -> CollisionManifold {
    let mut result = CollisionManifold::new();

    // Bounding spheres first
    let radius_sum = a.bounding_radius() + b.bounding_radius() + 2.0 * BOUNDING_SPHERE_MARGIN;
    if a.center().distance_squared(&b.center()) > radius_sum * radius_sum {
        return result;
    }

    let mut min_depth = f32::MAX;
    let mut normal = Vector3::unit_z();
    for axis in candidate_axes(a, b) {
        let axis = match usable_axis(axis) {
            Some(axis) => axis,
            None => continue,
        };
        let ia = a.project(axis);
        let ib = b.project(axis);
        let depth = ia.overlap(&ib);
        if depth <= PENETRATION_EPSILON {
            return result;
        }
        if depth < min_depth {
            min_depth = depth;
            normal = if ib.min < ia.min { -axis } else { axis };
        }
    }
    if min_depth == f32::MAX {
        return result;
    }

    let mut points = clip_edges_to_box(&b.edges(), a);
    points.extend(clip_edges_to_box(&a.edges(), b));
    if points.is_empty() {
        // One box swallowed the other without any edge crossing a face
        points.extend(corners_inside(b, a));
        points.extend(corners_inside(a, b));
    }
    if points.is_empty() {
        points.push((a.center() + b.center()) * 0.5);
    }

    // Project every point onto a's face along the normal and onto the plane
    // `depth` below it, where b's surface sits.
    let half = a.project(normal).length() * 0.5;
    let depth_plane = a.center() + normal * half;
    let contact_plane = a.center() + normal * (half - min_depth);

    let mut contacts: Vec<Vector3> = Vec::with_capacity(points.len());
    let mut depth_points: Vec<Vector3> = Vec::with_capacity(points.len());
    for point in points {
        let contact = point + normal * normal.dot(&(contact_plane - point));
        if contacts.iter().any(|c| c.distance_squared(&contact) < CONTACT_MERGE_EPSILON) {
            continue;
        }
        depth_points.push(point + normal * normal.dot(&(depth_plane - point)));
        contacts.push(contact);
    }

    result.colliding = true;
    result.normal = normal;
    result.depth = min_depth;
    result.avg_contact = Vector3::centroid(&contacts).unwrap_or(contact_plane);
    result.avg_depth_point = Vector3::centroid(&depth_points).unwrap_or(depth_plane);
    result.contacts = contacts;
    result.depth_points = depth_points;
    result
}
