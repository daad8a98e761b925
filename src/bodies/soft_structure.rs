//! Soft structures: particles that each carry a sphere collider, held together
//! by links and anchors, optionally driving bones.

use crate::bodies::{BodyDesc, BodyKind, BoneDesc, DistanceDesc, ParticleDesc, PointDesc};
use crate::error::PhysicsError;
use crate::Result;

/// Default radius of the per-particle sphere colliders
pub const PARTICLE_COLLIDER_RADIUS: f32 = 0.3;

/// Builder for a soft structure body
#[derive(Debug, Clone, PartialEq)]
pub struct SoftStructure {
    pub particles: Vec<ParticleDesc>,
    pub links: Vec<DistanceDesc>,
    pub anchors: Vec<PointDesc>,
    pub bones: Vec<BoneDesc>,
    pub collider_radius: f32,
}

impl SoftStructure {
    /// Structure over the given particles
    pub fn new(particles: Vec<ParticleDesc>) -> Self {
        Self {
            particles,
            links: Vec::new(),
            anchors: Vec::new(),
            bones: Vec::new(),
            collider_radius: PARTICLE_COLLIDER_RADIUS,
        }
    }

    pub fn link(mut self, link: DistanceDesc) -> Self {
        self.links.push(link);
        self
    }

    pub fn anchor(mut self, anchor: PointDesc) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn bone(mut self, bone: BoneDesc) -> Self {
        self.bones.push(bone);
        self
    }

    pub fn with_collider_radius(mut self, radius: f32) -> Self {
        self.collider_radius = radius;
        self
    }

    /// Authoring data with one sphere collider per particle
    pub fn build(&self) -> Result<BodyDesc> {
        if self.particles.is_empty() {
            return Err(PhysicsError::InvalidParameter("soft structure has no particles".to_string()));
        }
        Ok(BodyDesc {
            particles: self.particles.clone(),
            distance_constraints: self.links.clone(),
            point_constraints: self.anchors.clone(),
            bones: self.bones.clone(),
            particle_collider_radius: Some(self.collider_radius),
            ..BodyDesc::new(BodyKind::SoftStructure)
        })
    }
}
