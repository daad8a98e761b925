mod particle;
mod body_type;
mod desc;
mod particle_body;
mod rigid_body;
pub mod cloth;
pub mod soft_body;
pub mod soft_structure;

pub use self::particle::Particle;
pub use self::body_type::{BodyType, BodyKind, MeshSpace};
pub use self::desc::{BodyDesc, BoneDesc, BoundsDesc, DistanceDesc, ParticleDesc, PointDesc};
pub use self::particle_body::{Bone, ParticleBody};
pub use self::rigid_body::RigidBody;
pub use self::cloth::ClothGrid;
pub use self::soft_body::SoftBodyMesh;
pub use self::soft_structure::SoftStructure;

use crate::collision::ColliderHandle;
use crate::math::Transform;

/// Flags for controlling body behavior
pub mod body_flags {
    use bitflags::bitflags;

    bitflags! {
        /// Flags for controlling the behavior of simulated bodies
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct BodyFlags: u32 {
            /// Body is affected by gravity
            const AFFECTED_BY_GRAVITY = 0x01;

            /// The next integration pass is skipped, then the flag clears
            const SKIP_NEXT_INTEGRATION = 0x02;

            /// Integration and constraints are suspended while the host drags particles
            const FROZEN = 0x04;
        }
    }
}

/// Any body the world simulates
#[derive(Debug, Clone)]
pub enum Body {
    Rigid(RigidBody),
    Particles(ParticleBody),
}

impl Body {
    /// Particles carrying the body's state
    pub fn particles(&self) -> &[Particle] {
        match self {
            Body::Rigid(body) => std::slice::from_ref(body.particle()),
            Body::Particles(body) => body.particles(),
        }
    }

    /// Mutable particles carrying the body's state
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        match self {
            Body::Rigid(body) => std::slice::from_mut(body.particle_mut()),
            Body::Particles(body) => body.particles_mut(),
        }
    }

    /// Dynamic or kinematic
    pub fn body_type(&self) -> BodyType {
        match self {
            Body::Rigid(body) => body.body_type(),
            Body::Particles(body) => body.body_type(),
        }
    }

    /// Current pose
    pub fn transform(&self) -> Transform {
        match self {
            Body::Rigid(body) => body.transform(),
            Body::Particles(body) => body.transform(),
        }
    }

    /// Collider attached to the whole body
    pub fn collider(&self) -> Option<ColliderHandle> {
        match self {
            Body::Rigid(body) => body.collider(),
            Body::Particles(body) => body.collider(),
        }
    }

    /// True if collisions may displace the body
    pub fn is_movable(&self) -> bool {
        match self {
            Body::Rigid(body) => body.is_movable(),
            Body::Particles(body) => body.is_movable(),
        }
    }

    /// Inverse of the movable mass, 0 for immovable bodies
    pub fn inverse_mass(&self) -> f32 {
        match self {
            Body::Rigid(body) => body.inverse_mass(),
            Body::Particles(body) => body.inverse_mass(),
        }
    }

    pub fn as_rigid(&self) -> Option<&RigidBody> {
        match self {
            Body::Rigid(body) => Some(body),
            Body::Particles(_) => None,
        }
    }

    pub fn as_rigid_mut(&mut self) -> Option<&mut RigidBody> {
        match self {
            Body::Rigid(body) => Some(body),
            Body::Particles(_) => None,
        }
    }

    pub fn as_particles(&self) -> Option<&ParticleBody> {
        match self {
            Body::Particles(body) => Some(body),
            Body::Rigid(_) => None,
        }
    }

    pub fn as_particles_mut(&mut self) -> Option<&mut ParticleBody> {
        match self {
            Body::Particles(body) => Some(body),
            Body::Rigid(_) => None,
        }
    }
}

impl From<RigidBody> for Body {
    fn from(body: RigidBody) -> Self {
        Body::Rigid(body)
    }
}

impl From<ParticleBody> for Body {
    fn from(body: ParticleBody) -> Self {
        Body::Particles(body)
    }
}
