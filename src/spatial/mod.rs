//! Spatial partitioning for broad-phase pruning

pub mod octree;

pub use self::octree::{LeafInfo, NodeId, Octree, OctreeConfig};
