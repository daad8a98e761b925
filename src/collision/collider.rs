use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::math::{Aabb, Transform, Vector3};
use crate::shapes::{OrientedBox, Sphere};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Unique, monotonically increasing collider id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(pub(crate) u32);

impl ColliderHandle {
    /// Raw id
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Authoring data for a collider
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ColliderDesc {
    /// Sphere of `radius`, centered `offset` away from the body origin (local space)
    Sphere { radius: f32, offset: Vector3 },

    /// Box with full edge lengths `size`, centered `offset` away from the body origin
    Box { size: Vector3, offset: Vector3 },
}

impl ColliderDesc {
    /// Sphere centered on the body
    pub fn sphere(radius: f32) -> Self {
        ColliderDesc::Sphere { radius, offset: Vector3::ZERO }
    }

    /// Box centered on the body
    pub fn cuboid(size: Vector3) -> Self {
        ColliderDesc::Box { size, offset: Vector3::ZERO }
    }

    /// Shifts the collider in the body's local space
    pub fn with_offset(self, offset: Vector3) -> Self {
        match self {
            ColliderDesc::Sphere { radius, .. } => ColliderDesc::Sphere { radius, offset },
            ColliderDesc::Box { size, .. } => ColliderDesc::Box { size, offset },
        }
    }

    /// Rejects negative or non-finite dimensions
    pub fn validate(&self) -> Result<()> {
        let ok = match self {
            ColliderDesc::Sphere { radius, offset } => radius.is_finite() && *radius >= 0.0 && offset.is_finite(),
            ColliderDesc::Box { size, offset } => {
                size.is_finite() && size.x >= 0.0 && size.y >= 0.0 && size.z >= 0.0 && offset.is_finite()
            }
        };
        if ok {
            Ok(())
        } else {
            Err(PhysicsError::InvalidParameter(format!("invalid collider dimensions: {:?}", self)))
        }
    }
}

/// What a collider's pose is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderOwner {
    /// World geometry, posed once from an explicit transform
    Static,

    /// The derived transform of a body
    Body(BodyHandle),

    /// A single particle of a body
    Particle { body: BodyHandle, index: usize },
}

impl ColliderOwner {
    /// Owning body, if any
    pub fn body(&self) -> Option<BodyHandle> {
        match self {
            ColliderOwner::Static => None,
            ColliderOwner::Body(body) => Some(*body),
            ColliderOwner::Particle { body, .. } => Some(*body),
        }
    }
}

/// Closed set of collider geometries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Sphere(Sphere),
    Box(OrientedBox),
}

/// A sphere or box with its world-space pose cached
#[derive(Debug, Clone)]
pub struct Collider {
    handle: ColliderHandle,
    owner: ColliderOwner,
    desc: ColliderDesc,
    shape: ColliderShape,
}

impl Collider {
    pub(crate) fn new(handle: ColliderHandle, owner: ColliderOwner, desc: ColliderDesc) -> Self {
        let shape = match desc {
            ColliderDesc::Sphere { radius, offset } => ColliderShape::Sphere(Sphere::new(offset, radius)),
            ColliderDesc::Box { size, offset } => {
                ColliderShape::Box(OrientedBox::axis_aligned(offset, size * 0.5))
            }
        };
        Self { handle, owner, desc, shape }
    }

    /// The collider's id
    pub fn handle(&self) -> ColliderHandle {
        self.handle
    }

    /// Where the pose comes from
    pub fn owner(&self) -> ColliderOwner {
        self.owner
    }

    /// Authored dimensions
    pub fn desc(&self) -> &ColliderDesc {
        &self.desc
    }

    /// Current world-space geometry
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// True for colliders that follow a single particle
    pub fn is_particle_collider(&self) -> bool {
        matches!(self.owner, ColliderOwner::Particle { .. })
    }

    /// World-space bounds of the current pose
    pub fn bounds(&self) -> Aabb {
        match &self.shape {
            ColliderShape::Sphere(sphere) => sphere.aabb(),
            ColliderShape::Box(obb) => obb.aabb(),
        }
    }

    /// Bounding box as an oriented box, used for octree containment
    pub fn bounding_box(&self) -> OrientedBox {
        match &self.shape {
            ColliderShape::Sphere(sphere) => {
                OrientedBox::axis_aligned(sphere.center, Vector3::splat(sphere.radius))
            }
            ColliderShape::Box(obb) => *obb,
        }
    }

    /// Recomputes the world pose from a body (or static) transform.
    ///
    /// `displace` shifts the result in world space without touching the owner,
    /// which lets callers probe nearby poses.
    pub fn update_pose(&mut self, transform: &Transform, displace: Vector3) {
        self.shape = self.posed(transform, displace);
    }

    /// Geometry the collider would have at `transform` shifted by `displace`
    pub fn posed(&self, transform: &Transform, displace: Vector3) -> ColliderShape {
        match self.desc {
            ColliderDesc::Sphere { radius, offset } => {
                let scale = transform.scale.abs();
                let radius = radius * scale.x.max(scale.y).max(scale.z);
                ColliderShape::Sphere(Sphere::new(transform.transform_point(offset) + displace, radius))
            }
            ColliderDesc::Box { size, offset } => {
                let center = transform.transform_point(offset) + displace;
                let size = size.component_mul(&transform.scale.abs());
                ColliderShape::Box(OrientedBox::from_size(center, size, transform.rotation))
            }
        }
    }

    /// Recomputes the pose of a single-particle collider directly from the particle position
    pub fn update_from_particle(&mut self, position: Vector3, displace: Vector3) {
        self.shape = match self.desc {
            ColliderDesc::Sphere { radius, .. } => ColliderShape::Sphere(Sphere::new(position + displace, radius)),
            ColliderDesc::Box { size, .. } => {
                ColliderShape::Box(OrientedBox::axis_aligned(position + displace, size * 0.5))
            }
        };
    }
}
