//! Authoring data for particle bodies, loaded once when a body is added.

use crate::bodies::{BodyKind, BodyType};
use crate::collision::ColliderDesc;
use crate::constraints::{DEFAULT_STIFFNESS, USE_CURRENT_LENGTH};
use crate::math::{Aabb, Quaternion, Transform, Vector3};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// One authored particle, positioned in the body's local space
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ParticleDesc {
    pub position: Vector3,
    pub mass: f32,
}

impl ParticleDesc {
    pub fn new(position: Vector3, mass: f32) -> Self {
        Self { position, mass }
    }

    /// Particle that never moves
    pub fn pinned(position: Vector3) -> Self {
        Self { position, mass: 0.0 }
    }
}

/// A distance link between two particles of the same body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DistanceDesc {
    pub a: usize,
    pub b: usize,
    /// `-1` takes the distance at creation time
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl DistanceDesc {
    /// Stiff link at the current distance
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            rest_length: USE_CURRENT_LENGTH,
            stiffness: DEFAULT_STIFFNESS,
            damping: 0.0,
        }
    }

    pub fn with_rest_length(mut self, rest_length: f32) -> Self {
        self.rest_length = rest_length;
        self
    }

    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }
}

/// Anchors a particle to a world-space point
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PointDesc {
    pub particle: usize,
    pub anchor: Vector3,
    pub stiffness: f32,
    pub damping: f32,
}

impl PointDesc {
    pub fn new(particle: usize, anchor: Vector3, stiffness: f32, damping: f32) -> Self {
        Self { particle, anchor, stiffness, damping }
    }
}

/// A bone whose rotation follows the direction between two particles
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BoneDesc {
    pub name: String,
    pub from: usize,
    pub to: usize,
    /// Rotation of the bone in its authored pose
    pub rest_rotation: Quaternion,
}

impl BoneDesc {
    pub fn new(name: impl Into<String>, from: usize, to: usize) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            rest_rotation: Quaternion::identity(),
        }
    }
}

/// Which bound constraint, if any, a body receives
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BoundsDesc {
    /// No bound constraint
    #[default]
    None,

    /// The world's configured default bounds
    WorldDefault,

    /// An explicit box
    Explicit(Aabb),
}

/// Complete authoring data for one particle aggregate
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub body_type: BodyType,
    /// Initial pose; particle positions are local to it
    pub transform: Transform,
    pub particles: Vec<ParticleDesc>,
    pub distance_constraints: Vec<DistanceDesc>,
    pub point_constraints: Vec<PointDesc>,
    pub bounds: BoundsDesc,
    pub use_gravity: bool,
    /// Extra constant acceleration on every particle
    pub acceleration: Vector3,
    /// Initial per-tick displacement of every movable particle
    pub initial_velocity: Vector3,
    pub collider: Option<ColliderDesc>,
    /// Gives every particle its own sphere collider of this radius
    pub particle_collider_radius: Option<f32>,
    pub bones: Vec<BoneDesc>,
    /// Particles spanning the orientation frame; defaults to `[0, 2, 3]` for four or more particles
    pub frame_particles: Option<[usize; 3]>,
}

impl BodyDesc {
    /// Empty description of the given kind
    pub fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            body_type: BodyType::Dynamic,
            transform: Transform::identity(),
            particles: Vec::new(),
            distance_constraints: Vec::new(),
            point_constraints: Vec::new(),
            bounds: BoundsDesc::None,
            use_gravity: true,
            acceleration: Vector3::ZERO,
            initial_velocity: Vector3::ZERO,
            collider: None,
            particle_collider_radius: None,
            bones: Vec::new(),
            frame_particles: None,
        }
    }

    /// Particle object from explicit particles and links, bounded by the world default box
    pub fn particle_object(particles: Vec<ParticleDesc>, links: Vec<DistanceDesc>) -> Self {
        Self {
            particles,
            distance_constraints: links,
            bounds: BoundsDesc::WorldDefault,
            ..Self::new(BodyKind::ParticleObject)
        }
    }

    /// Regular tetrahedron of unit-mass particles, fully linked.
    ///
    /// Particles 0, 2 and 3 span a non-degenerate orientation frame.
    pub fn tetrahedron(edge: f32) -> Self {
        let s = edge / (2.0 * std::f32::consts::SQRT_2);
        let particles = vec![
            ParticleDesc::new(Vector3::new(s, s, s), 1.0),
            ParticleDesc::new(Vector3::new(s, -s, -s), 1.0),
            ParticleDesc::new(Vector3::new(-s, s, -s), 1.0),
            ParticleDesc::new(Vector3::new(-s, -s, s), 1.0),
        ];
        let mut links = Vec::with_capacity(6);
        for i in 0..4 {
            for j in (i + 1)..4 {
                links.push(DistanceDesc::new(i, j));
            }
        }
        Self::particle_object(particles, links)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        self
    }

    pub fn with_collider(mut self, collider: ColliderDesc) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_bounds(mut self, bounds: BoundsDesc) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vector3) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_initial_velocity(mut self, velocity: Vector3) -> Self {
        self.initial_velocity = velocity;
        self
    }

    pub fn with_particle_colliders(mut self, radius: f32) -> Self {
        self.particle_collider_radius = Some(radius);
        self
    }

    pub fn with_point_constraint(mut self, point: PointDesc) -> Self {
        self.point_constraints.push(point);
        self
    }

    pub fn with_bone(mut self, bone: BoneDesc) -> Self {
        self.bones.push(bone);
        self
    }
}
