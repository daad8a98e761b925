//! Separating Axis Theorem core shared by box-box detection, the manifold
//! generator and octree node containment.

use crate::math::Vector3;
use crate::shapes::OrientedBox;

/// Candidate axes whose squared length falls below this are skipped.
///
/// Cross products of (nearly) parallel edges land here; skipping them can only
/// make the test more conservative, never report a false separation.
pub const DEGENERATE_AXIS_EPSILON: f32 = 1.0e-3;

/// Number of candidate axes between two boxes
pub const AXIS_COUNT: usize = 15;

/// Outcome of a full axis sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SatResult {
    /// The boxes are disjoint; `axis` separates them
    Separated { axis: Vector3 },

    /// No axis separates the boxes; `axis` is the one with the least penetration
    Overlapping { axis: Vector3, depth: f32 },
}

impl SatResult {
    /// True for [`SatResult::Overlapping`]
    pub fn is_overlapping(&self) -> bool {
        matches!(self, SatResult::Overlapping { .. })
    }
}

/// The 3 face normals of each box followed by the 9 pairwise edge cross products
pub fn candidate_axes(a: &OrientedBox, b: &OrientedBox) -> [Vector3; AXIS_COUNT] {
    let axes_a = a.axes();
    let axes_b = b.axes();
    let mut axes = [Vector3::ZERO; AXIS_COUNT];
    axes[..3].copy_from_slice(&axes_a);
    axes[3..6].copy_from_slice(&axes_b);
    for i in 0..3 {
        for j in 0..3 {
            axes[6 + i * 3 + j] = axes_a[i].cross(&axes_b[j]);
        }
    }
    axes
}

/// Normalizes a candidate axis, or rejects it as degenerate
#[inline]
pub fn usable_axis(axis: Vector3) -> Option<Vector3> {
    let length_sq = axis.length_squared();
    if !(length_sq >= DEGENERATE_AXIS_EPSILON) {
        return None;
    }
    Some(axis / length_sq.sqrt())
}

/// Penetration of the two boxes' projections on `axis`.
///
/// Negative values mean the axis separates the boxes. Degenerate axes return
/// `None` and must be treated as non-separating.
pub fn penetration_on_axis(a: &OrientedBox, b: &OrientedBox, axis: Vector3) -> Option<f32> {
    let axis = usable_axis(axis)?;
    let ia = a.project(axis);
    let ib = b.project(axis);
    Some(ia.overlap(&ib))
}

/// Returns true if `axis` strictly separates the boxes
#[inline]
pub fn separates(a: &OrientedBox, b: &OrientedBox, axis: Vector3) -> bool {
    matches!(penetration_on_axis(a, b, axis), Some(depth) if depth < 0.0)
}

/// Sweeps all 15 candidate axes, stopping at the first separating one
pub fn find_separating_axis(a: &OrientedBox, b: &OrientedBox) -> SatResult {
    let mut best_axis = Vector3::unit_y();
    let mut best_depth = f32::MAX;

    for axis in candidate_axes(a, b) {
        let axis = match usable_axis(axis) {
            Some(axis) => axis,
            None => continue,
        };
        let depth = a.project(axis).overlap(&b.project(axis));
        if depth < 0.0 {
            return SatResult::Separated { axis };
        }
        if depth < best_depth {
            best_depth = depth;
            best_axis = axis;
        }
    }

    SatResult::Overlapping {
        axis: best_axis,
        depth: best_depth,
    }
}

/// Boolean overlap test without any caching
#[inline]
pub fn boxes_overlap(a: &OrientedBox, b: &OrientedBox) -> bool {
    find_separating_axis(a, b).is_overlapping()
}
