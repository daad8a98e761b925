use crate::math::Vector3;
use crate::shapes::{Line, OrientedBox};

/// Intersects each edge with each face plane of `target` and keeps the
/// crossings that lie on the box.
pub fn clip_edges_to_box(edges: &[Line], target: &OrientedBox) -> Vec<Vector3> {
    let mut points = Vec::new();
    for plane in target.planes() {
        for edge in edges {
            if let Some(point) = plane.clip_segment(edge) {
                if target.contains_point(point) {
                    points.push(point);
                }
            }
        }
    }
    points
}

/// Corners of `source` lying inside `target`
pub fn corners_inside(source: &OrientedBox, target: &OrientedBox) -> Vec<Vector3> {
    source
        .vertices()
        .iter()
        .copied()
        .filter(|v| target.contains_point(*v))
        .collect()
}
