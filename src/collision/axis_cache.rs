use std::collections::HashMap;

use crate::collision::CollisionPair;
use crate::math::Vector3;

/// Last known separating axis per collider pair.
///
/// An entry is only trusted until it fails to separate the pair again; callers
/// evict it at that point and fall back to a full sweep.
#[derive(Debug, Default, Clone)]
pub struct SeparatingAxisCache {
    axes: HashMap<u64, Vector3>,
}

impl SeparatingAxisCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached axis for the pair, if any
    pub fn get(&self, pair: &CollisionPair) -> Option<Vector3> {
        self.axes.get(&pair.key()).copied()
    }

    /// Stores (or replaces) the separating axis of a pair
    pub fn insert(&mut self, pair: &CollisionPair, axis: Vector3) {
        self.axes.insert(pair.key(), axis);
    }

    /// Drops the entry of a pair, returning it
    pub fn evict(&mut self, pair: &CollisionPair) -> Option<Vector3> {
        self.axes.remove(&pair.key())
    }

    /// Drops the entries of several pairs at once
    pub fn evict_pairs(&mut self, pairs: impl IntoIterator<Item = CollisionPair>) {
        for pair in pairs {
            self.axes.remove(&pair.key());
        }
    }

    /// Number of cached axes
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Forgets all cached axes
    pub fn clear(&mut self) {
        self.axes.clear();
    }
}
