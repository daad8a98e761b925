pub mod world;
pub mod config;
pub mod storage;
pub mod events;
pub mod host;
pub mod telemetry;
mod scheduler;

pub use self::world::{PhysicsWorld, ParticleHit};
pub use self::config::SimulationConfig;
pub use self::storage::{BodyStorage, Storage};
pub use self::events::{BodyEvent, BodyEventType, CollisionEvent, EventQueue};
pub use self::host::{NullHost, SimulationHost};
pub use self::telemetry::{DebugSink, LogSink, Telemetry};
pub use self::scheduler::{SimulationClock, SimulationState};

use crate::math::{Vector3, EPSILON};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A unique identifier for a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// Raw id
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// The gravity to apply to the physics world
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum GravityType {
    /// No gravity
    None,

    /// Constant gravity in a direction (typically downward along y-axis)
    Constant(Vector3),

    /// Point gravity source (e.g., planet/star)
    Point {
        /// The position of the gravity source
        position: Vector3,

        /// The strength of the gravity
        strength: f32,
    },
}

impl GravityType {
    /// Acceleration felt at `position`.
    ///
    /// Point sources fall off with the squared distance and vanish at the
    /// source itself.
    pub fn acceleration_at(&self, position: Vector3) -> Vector3 {
        match *self {
            GravityType::None => Vector3::ZERO,
            GravityType::Constant(acceleration) => acceleration,
            GravityType::Point { position: source, strength } => {
                let to_source = source - position;
                let distance_sq = to_source.length_squared();
                if distance_sq <= EPSILON {
                    return Vector3::ZERO;
                }
                to_source * (strength / (distance_sq * distance_sq.sqrt()))
            }
        }
    }
}

impl Default for GravityType {
    fn default() -> Self {
        // Default gravity is -9.81 in y direction
        Self::Constant(Vector3::new(0.0, -9.81, 0.0))
    }
}
