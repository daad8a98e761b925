pub mod math;
pub mod core;
pub mod bodies;
pub mod shapes;
pub mod collision;
pub mod constraints;
pub mod integration;
pub mod spatial;

/// Re-export common types for easier usage
pub use crate::core::{BodyHandle, GravityType, PhysicsWorld, SimulationConfig, SimulationHost};
pub use crate::bodies::{Body, BodyDesc, BodyKind, BodyType, ParticleBody, RigidBody};
pub use crate::collision::{ColliderDesc, ColliderHandle, CollisionManager};
pub use crate::math::Vector3;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Malformed content: {0}")]
        MalformedContent(String),

        #[error("Simulation error: {0}")]
        SimulationError(String),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
