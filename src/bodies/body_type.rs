#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BodyType {
    /// Integrated, relaxed and pushed around by collisions
    #[default]
    Dynamic,

    /// Moved only by the host; acts as an immovable obstacle for collisions
    Kinematic,
}

/// Which particle aggregate a body was authored as.
///
/// The kind only selects defaults and how the body reports its mesh; the
/// simulation treats all particle aggregates the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BodyKind {
    /// A small rigid-ish cluster of particles (e.g. a tetrahedron) driving a transform
    #[default]
    ParticleObject,

    /// A grid of particles with structural, shear and bend links
    Cloth,

    /// One particle per mesh vertex, linked all-to-all
    SoftBody,

    /// Particles with individual sphere colliders, anchors and optional bones
    SoftStructure,
}

/// Space in which a body reports its vertex buffer to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshSpace {
    /// The body does not feed a mesh
    None,

    /// Vertices are reported in world space
    World,

    /// Vertices are reported relative to the body's derived transform
    Local,
}

impl BodyKind {
    /// Default mesh space for the kind
    pub fn mesh_space(&self) -> MeshSpace {
        match self {
            BodyKind::Cloth => MeshSpace::World,
            BodyKind::SoftBody => MeshSpace::Local,
            BodyKind::ParticleObject | BodyKind::SoftStructure => MeshSpace::None,
        }
    }
}
