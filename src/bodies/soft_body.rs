//! Soft bodies built from a mesh: one particle per vertex, every pair linked.

use crate::bodies::{BodyDesc, BodyKind, BoundsDesc, DistanceDesc, ParticleDesc};
use crate::error::PhysicsError;
use crate::math::Vector3;
use crate::Result;

/// Default stiffness of the all-pairs links
pub const SOFT_BODY_STIFFNESS: f32 = 0.5;

/// Default damping of the all-pairs links
pub const SOFT_BODY_DAMPING: f32 = 0.5;

/// Parameters for turning a vertex buffer into a soft body
#[derive(Debug, Clone, PartialEq)]
pub struct SoftBodyMesh {
    pub vertices: Vec<Vector3>,
    pub particle_mass: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl SoftBodyMesh {
    /// Soft body over the given local-space vertices
    pub fn new(vertices: Vec<Vector3>) -> Self {
        Self {
            vertices,
            particle_mass: 1.0,
            stiffness: SOFT_BODY_STIFFNESS,
            damping: SOFT_BODY_DAMPING,
        }
    }

    pub fn with_stiffness(mut self, stiffness: f32, damping: f32) -> Self {
        self.stiffness = stiffness;
        self.damping = damping;
        self
    }

    /// Number of links, `n * (n - 1) / 2`
    pub fn constraint_count(&self) -> usize {
        let n = self.vertices.len();
        n * n.saturating_sub(1) / 2
    }

    /// Authoring data: all-pairs links at their current length, bounded by the world box
    pub fn build(&self) -> Result<BodyDesc> {
        if self.vertices.len() < 2 {
            return Err(PhysicsError::InvalidParameter(format!(
                "soft body needs at least two vertices, got {}",
                self.vertices.len()
            )));
        }

        let particles = self
            .vertices
            .iter()
            .map(|v| ParticleDesc::new(*v, self.particle_mass))
            .collect();

        let n = self.vertices.len();
        let mut links = Vec::with_capacity(self.constraint_count());
        for i in 0..n {
            for j in (i + 1)..n {
                links.push(
                    DistanceDesc::new(i, j)
                        .with_stiffness(self.stiffness)
                        .with_damping(self.damping),
                );
            }
        }

        Ok(BodyDesc {
            particles,
            distance_constraints: links,
            bounds: BoundsDesc::WorldDefault,
            ..BodyDesc::new(BodyKind::SoftBody)
        })
    }
}
