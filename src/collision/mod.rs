//! Collision pipeline: colliders, SAT, contact manifolds, resolution and the
//! manager that ties them together each iteration.

pub mod sat;
pub mod clipping;
pub mod contact_manifold;
pub mod narrow_phase;
pub mod resolution;
mod collider;
mod collision_pair;
mod axis_cache;
mod broad_phase;
mod collision_manager;

pub use self::collider::{Collider, ColliderDesc, ColliderHandle, ColliderOwner, ColliderShape};
pub use self::collision_pair::{triangular_key, CollisionPair};
pub use self::axis_cache::SeparatingAxisCache;
pub use self::broad_phase::{BroadPhase, BruteForceBroadPhase, OctreeBroadPhase};
pub use self::collision_manager::{CollisionManager, CollisionStats, ContactKind};
pub use self::contact_manifold::{find_collision_features, CollisionManifold};
pub use self::narrow_phase::Contact;
pub use self::sat::SatResult;
