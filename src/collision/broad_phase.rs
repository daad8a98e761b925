use std::collections::BTreeMap;

use crate::collision::{ColliderHandle, CollisionPair};
use crate::core::telemetry::Telemetry;
use crate::math::Aabb;
use crate::shapes::OrientedBox;
use crate::spatial::{Octree, OctreeConfig};
use crate::Result;

/// Trait for broad-phase pruning of body-level collider pairs.
///
/// Implementations may report pairs that do not touch, but must never drop a
/// pair that could.
pub trait BroadPhase {
    /// Starts tracking a collider, or refreshes it if already tracked
    fn insert(&mut self, handle: ColliderHandle, bounds: &OrientedBox);

    /// Refreshes the bounds of a tracked collider
    fn update(&mut self, handle: ColliderHandle, bounds: &OrientedBox);

    /// Stops tracking a collider
    fn remove(&mut self, handle: ColliderHandle);

    /// Potentially touching pairs, ordered by collider id
    fn candidate_pairs(&self) -> Vec<CollisionPair>;
}

/// Every pair whose AABBs intersect
#[derive(Debug, Default)]
pub struct BruteForceBroadPhase {
    bounds: BTreeMap<ColliderHandle, Aabb>,
}

impl BruteForceBroadPhase {
    /// Creates a new brute-force broad-phase
    pub fn new() -> Self {
        Self::default()
    }
}

impl BroadPhase for BruteForceBroadPhase {
    fn insert(&mut self, handle: ColliderHandle, bounds: &OrientedBox) {
        self.bounds.insert(handle, bounds.aabb());
    }

    fn update(&mut self, handle: ColliderHandle, bounds: &OrientedBox) {
        if let Some(aabb) = self.bounds.get_mut(&handle) {
            *aabb = bounds.aabb();
        }
    }

    fn remove(&mut self, handle: ColliderHandle) {
        self.bounds.remove(&handle);
    }

    fn candidate_pairs(&self) -> Vec<CollisionPair> {
        let entries: Vec<(&ColliderHandle, &Aabb)> = self.bounds.iter().collect();
        let mut pairs = Vec::new();
        for (i, (handle_a, aabb_a)) in entries.iter().enumerate() {
            for (handle_b, aabb_b) in &entries[i + 1..] {
                if aabb_a.intersects(aabb_b) {
                    pairs.push(CollisionPair::new(**handle_a, **handle_b));
                }
            }
        }
        pairs
    }
}

/// Broad phase backed by the split/merge octree
#[derive(Debug)]
pub struct OctreeBroadPhase {
    tree: Octree<ColliderHandle>,
}

impl OctreeBroadPhase {
    /// Creates an empty octree broad phase
    pub fn new(config: OctreeConfig, telemetry: Telemetry) -> Result<Self> {
        Ok(Self {
            tree: Octree::with_telemetry(config, telemetry)?,
        })
    }

    /// The underlying tree
    pub fn tree(&self) -> &Octree<ColliderHandle> {
        &self.tree
    }
}

impl BroadPhase for OctreeBroadPhase {
    fn insert(&mut self, handle: ColliderHandle, bounds: &OrientedBox) {
        self.tree.insert(handle, *bounds);
    }

    fn update(&mut self, handle: ColliderHandle, bounds: &OrientedBox) {
        self.tree.update(handle, *bounds);
    }

    fn remove(&mut self, handle: ColliderHandle) {
        self.tree.remove(handle);
    }

    fn candidate_pairs(&self) -> Vec<CollisionPair> {
        self.tree
            .candidate_pairs()
            .into_iter()
            .map(|(a, b)| CollisionPair::new(a, b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    fn cube(x: f32) -> OrientedBox {
        OrientedBox::axis_aligned(Vector3::new(x, 0.0, 0.0), Vector3::splat(0.5))
    }

    #[test]
    fn brute_force_reports_overlapping_bounds_only() {
        let mut broad = BruteForceBroadPhase::new();
        broad.insert(ColliderHandle(0), &cube(0.0));
        broad.insert(ColliderHandle(1), &cube(0.8));
        broad.insert(ColliderHandle(2), &cube(5.0));
        assert_eq!(
            broad.candidate_pairs(),
            vec![CollisionPair::new(ColliderHandle(0), ColliderHandle(1))]
        );
    }

    #[test]
    fn octree_and_brute_force_agree_on_touching_pairs() {
        let mut brute = BruteForceBroadPhase::new();
        let mut tree = OctreeBroadPhase::new(OctreeConfig::default(), Telemetry::disabled()).unwrap();
        for (id, x) in [(0u32, -6.0f32), (1, -5.2), (2, 0.0), (3, 7.0), (4, 7.5)] {
            brute.insert(ColliderHandle(id), &cube(x));
            tree.insert(ColliderHandle(id), &cube(x));
        }
        let from_tree = tree.candidate_pairs();
        for pair in brute.candidate_pairs() {
            assert!(from_tree.contains(&pair), "octree dropped {:?}", pair);
        }
    }
}
