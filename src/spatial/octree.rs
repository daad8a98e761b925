//! Arena-backed octree used as the collision broad phase.
//!
//! Nodes and items live in flat vectors and refer to each other by index, so
//! splitting and merging never fight over ownership. Every leaf lists the
//! items whose bounding boxes overlap its region, and every item lists the
//! leaves that hold it. Overlap is decided with the same SAT test used for
//! box-box collision.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use crate::collision::sat::boxes_overlap;
use crate::core::telemetry::{Telemetry, CATEGORY_OCTREE};
use crate::error::PhysicsError;
use crate::math::{Vector3, EPSILON};
use crate::shapes::OrientedBox;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Configuration for octree behavior
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct OctreeConfig {
    /// Center of the root region
    pub center: Vector3,

    /// Half edge length of the cubic root region
    pub half_extent: f32,

    /// Maximum subdivision depth (the root is depth 0)
    pub max_depth: u32,

    /// Items a leaf may hold before it splits
    pub max_object_limit: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            center: Vector3::ZERO,
            half_extent: 15.0,
            max_depth: 3,
            max_object_limit: 1,
        }
    }
}

impl OctreeConfig {
    /// Rejects empty or non-finite root regions
    pub fn validate(&self) -> Result<()> {
        if !self.center.is_finite() || !self.half_extent.is_finite() || self.half_extent <= EPSILON {
            return Err(PhysicsError::InvalidParameter(format!(
                "octree root must have a finite, positive extent (center {}, half extent {})",
                self.center, self.half_extent
            )));
        }
        Ok(())
    }
}

/// Index of a node in the octree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena slot
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Index of an item in the octree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct ItemId(usize);

#[derive(Debug, Clone)]
struct Node {
    region: OrientedBox,
    depth: u32,
    parent: Option<NodeId>,
    children: Option<[NodeId; 8]>,
    items: Vec<ItemId>,
}

impl Node {
    fn leaf(region: OrientedBox, depth: u32, parent: Option<NodeId>) -> Self {
        Self {
            region,
            depth,
            parent,
            children: None,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Item<K> {
    key: K,
    bounds: OrientedBox,
    owners: Vec<NodeId>,
}

/// Snapshot of one leaf, mostly for inspection and tests
#[derive(Debug, Clone)]
pub struct LeafInfo<K> {
    pub id: NodeId,
    pub region: OrientedBox,
    pub depth: u32,
    pub items: Vec<K>,
}

/// Loose octree keyed by `K` (collider handles in practice)
#[derive(Debug)]
pub struct Octree<K> {
    config: OctreeConfig,
    nodes: Vec<Option<Node>>,
    free_nodes: Vec<usize>,
    items: Vec<Option<Item<K>>>,
    free_items: Vec<usize>,
    lookup: HashMap<K, ItemId>,
    root: NodeId,
    telemetry: Telemetry,
}

impl<K> Octree<K>
where
    K: Copy + Eq + Hash + Ord,
{
    /// Creates an empty tree with a single leaf root
    pub fn new(config: OctreeConfig) -> Result<Self> {
        Self::with_telemetry(config, Telemetry::disabled())
    }

    /// Creates an empty tree that reports splits and merges to `telemetry`
    pub fn with_telemetry(config: OctreeConfig, telemetry: Telemetry) -> Result<Self> {
        config.validate()?;
        let region = OrientedBox::axis_aligned(config.center, Vector3::splat(config.half_extent));
        Ok(Self {
            config,
            nodes: vec![Some(Node::leaf(region, 0, None))],
            free_nodes: Vec::new(),
            items: Vec::new(),
            free_items: Vec::new(),
            lookup: HashMap::new(),
            root: NodeId(0),
            telemetry,
        })
    }

    /// The configuration the tree was built with
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of tracked items
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Returns true if no items are tracked
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Returns true if `key` is tracked
    pub fn contains(&self, key: K) -> bool {
        self.lookup.contains_key(&key)
    }

    /// Number of live nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Region of a live node
    pub fn node_region(&self, id: NodeId) -> Option<&OrientedBox> {
        self.node(id).map(|n| &n.region)
    }

    /// Returns true if the node exists and has no children
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).map_or(false, |n| n.children.is_none())
    }

    /// Current bounding box of an item
    pub fn bounds(&self, key: K) -> Option<&OrientedBox> {
        let id = self.lookup.get(&key)?;
        self.item(*id).map(|item| &item.bounds)
    }

    /// Leaves currently holding `key`
    pub fn owners(&self, key: K) -> Option<&[NodeId]> {
        let id = self.lookup.get(&key)?;
        self.item(*id).map(|item| item.owners.as_slice())
    }

    /// Every live leaf with the keys it holds
    pub fn leaves(&self) -> Vec<LeafInfo<K>> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let node = node.as_ref()?;
                if node.children.is_some() {
                    return None;
                }
                Some(LeafInfo {
                    id: NodeId(index),
                    region: node.region,
                    depth: node.depth,
                    items: node
                        .items
                        .iter()
                        .filter_map(|id| self.item(*id).map(|item| item.key))
                        .collect(),
                })
            })
            .collect()
    }

    /// Starts tracking `key`, or moves it if it is already tracked
    pub fn insert(&mut self, key: K, bounds: OrientedBox) {
        if self.lookup.contains_key(&key) {
            self.update(key, bounds);
            return;
        }

        let item = Item {
            key,
            bounds,
            owners: Vec::new(),
        };
        let id = match self.free_items.pop() {
            Some(slot) => {
                self.items[slot] = Some(item);
                ItemId(slot)
            }
            None => {
                self.items.push(Some(item));
                ItemId(self.items.len() - 1)
            }
        };
        self.lookup.insert(key, id);
        self.process_item(self.root, id);
    }

    /// Moves `key` to `bounds`, refreshing its owner leaves.
    ///
    /// Leaves the item entered absorb it (splitting if they overflow); leaves
    /// it left drop it and try to merge with their siblings. Returns false for
    /// unknown keys.
    pub fn update(&mut self, key: K, bounds: OrientedBox) -> bool {
        let id = match self.lookup.get(&key) {
            Some(id) => *id,
            None => return false,
        };
        match self.item_mut(id) {
            Some(item) => item.bounds = bounds,
            None => return false,
        }

        self.process_item(self.root, id);

        let owners = self.item(id).map(|item| item.owners.clone()).unwrap_or_default();
        let departed: Vec<NodeId> = owners
            .into_iter()
            .filter(|owner| {
                self.node(*owner)
                    .map_or(true, |node| !boxes_overlap(&node.region, &bounds))
            })
            .collect();
        if departed.is_empty() {
            return true;
        }

        // Detach from every departed leaf before merging anything, so a merge
        // never carries a stale reference up into the parent.
        for owner in &departed {
            self.detach(*owner, id);
        }
        for owner in departed {
            self.attempt_reduce(owner);
        }
        true
    }

    /// Stops tracking `key`. Returns false for unknown keys.
    pub fn remove(&mut self, key: K) -> bool {
        let id = match self.lookup.remove(&key) {
            Some(id) => id,
            None => return false,
        };
        let owners = match self.items.get_mut(id.0).and_then(Option::take) {
            Some(item) => item.owners,
            None => return false,
        };
        self.free_items.push(id.0);

        for owner in &owners {
            if let Some(node) = self.node_mut(*owner) {
                node.items.retain(|i| *i != id);
            }
        }
        for owner in owners {
            self.attempt_reduce(owner);
        }
        true
    }

    /// Drops every item and collapses the tree back to its root
    pub fn clear(&mut self) {
        let region = OrientedBox::axis_aligned(self.config.center, Vector3::splat(self.config.half_extent));
        self.nodes = vec![Some(Node::leaf(region, 0, None))];
        self.free_nodes.clear();
        self.items.clear();
        self.free_items.clear();
        self.lookup.clear();
        self.root = NodeId(0);
    }

    /// Unordered key pairs that may be touching.
    ///
    /// Two items pair up when they share a leaf. Items whose box is not fully
    /// inside the root region pair with everything, so nothing overlapping
    /// outside the tree is ever dropped. Each pair is `(min, max)` and appears
    /// once, in ascending order.
    pub fn candidate_pairs(&self) -> Vec<(K, K)> {
        let mut pairs = BTreeSet::new();

        for node in self.nodes.iter().flatten() {
            if node.children.is_some() {
                continue;
            }
            for (i, a) in node.items.iter().enumerate() {
                for b in &node.items[i + 1..] {
                    if let (Some(a), Some(b)) = (self.item(*a), self.item(*b)) {
                        pairs.insert(ordered(a.key, b.key));
                    }
                }
            }
        }

        let root_bounds = match self.node(self.root) {
            Some(root) => root.region.aabb(),
            None => return pairs.into_iter().collect(),
        };
        let keys: Vec<K> = self.items.iter().flatten().map(|item| item.key).collect();
        for item in self.items.iter().flatten() {
            if root_bounds.contains_aabb(&item.bounds.aabb()) {
                continue;
            }
            for other in &keys {
                if *other != item.key {
                    pairs.insert(ordered(item.key, *other));
                }
            }
        }

        pairs.into_iter().collect()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn item(&self, id: ItemId) -> Option<&Item<K>> {
        self.items.get(id.0).and_then(Option::as_ref)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut Item<K>> {
        self.items.get_mut(id.0).and_then(Option::as_mut)
    }

    fn alloc_node(&mut self, node: Node) -> NodeId {
        match self.free_nodes.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn free_node(&mut self, id: NodeId) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            if slot.take().is_some() {
                self.free_nodes.push(id.0);
            }
        }
    }

    /// Removes the link between a node and an item, in both directions
    fn detach(&mut self, node_id: NodeId, item_id: ItemId) {
        if let Some(node) = self.node_mut(node_id) {
            node.items.retain(|i| *i != item_id);
        }
        if let Some(item) = self.item_mut(item_id) {
            item.owners.retain(|o| *o != node_id);
        }
    }

    /// Pushes the item into every leaf under `node_id` that overlaps it
    fn process_item(&mut self, node_id: NodeId, item_id: ItemId) {
        let (overlaps, children, holds) = match (self.node(node_id), self.item(item_id)) {
            (Some(node), Some(item)) => (
                boxes_overlap(&node.region, &item.bounds),
                node.children,
                node.items.contains(&item_id),
            ),
            _ => return,
        };
        if !overlaps {
            return;
        }

        match children {
            Some(children) => {
                for child in children {
                    self.process_item(child, item_id);
                }
            }
            None if !holds => self.push_item(node_id, item_id),
            None => {}
        }
    }

    fn push_item(&mut self, node_id: NodeId, item_id: ItemId) {
        let (count, depth) = match self.node_mut(node_id) {
            Some(node) => {
                node.items.push(item_id);
                (node.items.len(), node.depth)
            }
            None => return,
        };
        if let Some(item) = self.item_mut(item_id) {
            item.owners.push(node_id);
        }

        // A full leaf at max depth keeps its excess items
        if count > self.config.max_object_limit && depth < self.config.max_depth {
            self.split(node_id);
        }
    }

    fn split(&mut self, node_id: NodeId) {
        let (region, depth, items) = match self.node_mut(node_id) {
            Some(node) if node.children.is_none() => {
                (node.region, node.depth, std::mem::take(&mut node.items))
            }
            _ => return,
        };
        for item_id in &items {
            if let Some(item) = self.item_mut(*item_id) {
                item.owners.retain(|o| *o != node_id);
            }
        }

        let center = region.center();
        let quarter = region.half_extents() * 0.5;
        let mut children = [NodeId(0); 8];
        for (octant, child) in children.iter_mut().enumerate() {
            let x_sign = if octant & 1 != 0 { 1.0 } else { -1.0 };
            let y_sign = if octant & 2 != 0 { 1.0 } else { -1.0 };
            let z_sign = if octant & 4 != 0 { 1.0 } else { -1.0 };
            let child_center = Vector3::new(
                center.x + quarter.x * x_sign,
                center.y + quarter.y * y_sign,
                center.z + quarter.z * z_sign,
            );
            let child_region = OrientedBox::axis_aligned(child_center, quarter);
            *child = self.alloc_node(Node::leaf(child_region, depth + 1, Some(node_id)));
        }
        if let Some(node) = self.node_mut(node_id) {
            node.children = Some(children);
        }

        self.telemetry.emit(CATEGORY_OCTREE, || {
            format!("split node {} at depth {} ({} items)", node_id.0, depth, items.len())
        });

        for item_id in items {
            for child in children {
                self.process_item(child, item_id);
            }
        }
    }

    /// Called after a leaf lost an item: merges siblings upward while they fit
    fn attempt_reduce(&mut self, departed: NodeId) {
        let mut current = self.node(departed).and_then(|node| node.parent);
        while let Some(parent) = current {
            if !self.merge_children(parent) {
                break;
            }
            current = self.node(parent).and_then(|node| node.parent);
        }
    }

    /// Folds the eight leaf children of `node_id` back into it if their
    /// combined unique items fit in one leaf
    fn merge_children(&mut self, node_id: NodeId) -> bool {
        let children = match self.node(node_id).and_then(|node| node.children) {
            Some(children) => children,
            None => return false,
        };

        let mut merged: Vec<ItemId> = Vec::new();
        for child in children {
            match self.node(child) {
                Some(node) if node.children.is_none() => merged.extend_from_slice(&node.items),
                _ => return false,
            }
        }
        merged.sort_unstable();
        merged.dedup();
        if merged.len() > self.config.max_object_limit {
            return false;
        }

        for item_id in &merged {
            if let Some(item) = self.item_mut(*item_id) {
                item.owners.retain(|o| !children.contains(o));
                item.owners.push(node_id);
            }
        }
        for child in children {
            self.free_node(child);
        }
        let depth = match self.node_mut(node_id) {
            Some(node) => {
                node.children = None;
                node.items = merged.clone();
                node.depth
            }
            None => return false,
        };

        self.telemetry.emit(CATEGORY_OCTREE, || {
            format!("merged children of node {} at depth {} ({} items)", node_id.0, depth, merged.len())
        });
        true
    }
}

fn ordered<K: Ord>(a: K, b: K) -> (K, K) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(center: Vector3, half: f32) -> OrientedBox {
        OrientedBox::axis_aligned(center, Vector3::splat(half))
    }

    #[test]
    fn second_item_splits_the_root() {
        let mut tree = Octree::new(OctreeConfig::default()).unwrap();
        tree.insert(1u32, cube(Vector3::new(-5.0, -5.0, -5.0), 0.5));
        assert!(tree.is_leaf(tree.root()));

        tree.insert(2u32, cube(Vector3::new(5.0, 5.0, 5.0), 0.5));
        assert!(!tree.is_leaf(tree.root()));
        assert_eq!(tree.owners(1).unwrap().len(), 1);
        assert_eq!(tree.owners(2).unwrap().len(), 1);
        assert!(tree.candidate_pairs().is_empty());
    }

    #[test]
    fn removing_an_item_merges_back_to_the_root() {
        let mut tree = Octree::new(OctreeConfig::default()).unwrap();
        tree.insert(1u32, cube(Vector3::new(-5.0, -5.0, -5.0), 0.5));
        tree.insert(2u32, cube(Vector3::new(5.0, 5.0, 5.0), 0.5));
        assert!(tree.remove(2));

        assert!(tree.is_leaf(tree.root()));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.owners(1).unwrap(), &[tree.root()]);
    }

    #[test]
    fn full_leaf_at_max_depth_keeps_excess_items() {
        let config = OctreeConfig {
            max_depth: 1,
            ..OctreeConfig::default()
        };
        let mut tree = Octree::new(config).unwrap();
        for key in 0..4u32 {
            tree.insert(key, cube(Vector3::splat(7.0 + key as f32 * 0.1), 0.2));
        }
        let crowded = tree.leaves().into_iter().find(|leaf| leaf.items.len() == 4);
        assert!(crowded.is_some());
        assert_eq!(tree.candidate_pairs().len(), 6);
    }

    #[test]
    fn items_outside_the_root_pair_with_everything() {
        let mut tree = Octree::new(OctreeConfig::default()).unwrap();
        tree.insert(1u32, cube(Vector3::ZERO, 1.0));
        tree.insert(2u32, cube(Vector3::new(-10.0, 0.0, 0.0), 1.0));
        tree.insert(3u32, cube(Vector3::new(40.0, 0.0, 0.0), 1.0));
        assert!(tree.owners(3).unwrap().is_empty());
        assert_eq!(tree.candidate_pairs(), vec![(1, 3), (2, 3)]);
    }
}
