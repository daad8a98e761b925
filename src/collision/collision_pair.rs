use crate::collision::ColliderHandle;

/// An unordered pair of colliders, stored with the lower id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    /// The collider with the lower id
    pub first: ColliderHandle,

    /// The collider with the higher id
    pub second: ColliderHandle,
}

impl CollisionPair {
    /// Creates a new collision pair
    pub fn new(a: ColliderHandle, b: ColliderHandle) -> Self {
        // Always sort the handles to ensure consistent ordering
        if a.0 <= b.0 {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Checks if this collision pair contains the specified collider
    pub fn contains(&self, collider: ColliderHandle) -> bool {
        self.first == collider || self.second == collider
    }

    /// Dense index of the pair in the strictly lower triangle of the id matrix.
    ///
    /// `key = max * (max - 1) / 2 + min` enumerates every unordered pair of
    /// distinct ids exactly once and does not depend on how many colliders exist.
    pub fn key(&self) -> u64 {
        triangular_key(self.first.0, self.second.0)
    }
}

/// Triangular-number index of an unordered id pair
#[inline]
pub fn triangular_key(a: u32, b: u32) -> u64 {
    let (lo, hi) = if a <= b { (a as u64, b as u64) } else { (b as u64, a as u64) };
    hi * hi.saturating_sub(1) / 2 + lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_ignores_order() {
        assert_eq!(triangular_key(3, 9), triangular_key(9, 3));
        let pair = CollisionPair::new(ColliderHandle(7), ColliderHandle(2));
        assert_eq!(pair.first, ColliderHandle(2));
        assert_eq!(pair.key(), triangular_key(2, 7));
    }

    #[test]
    fn keys_are_unique_for_distinct_pairs() {
        let mut seen = HashSet::new();
        for hi in 1..64u32 {
            for lo in 0..hi {
                assert!(seen.insert(triangular_key(lo, hi)), "duplicate key for ({}, {})", lo, hi);
            }
        }
    }
}
