use crate::math::{Vector3, Quaternion, EPSILON};
use crate::math::rotation::Rotation;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Represents a transformation in 3D space (position, rotation, and scale)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Transform {
    /// Position in 3D space
    pub position: Vector3,

    /// Rotation as a quaternion
    pub rotation: Quaternion,

    /// Scale in each axis
    pub scale: Vector3,
}

impl Transform {
    /// Creates a new transform with the given position, rotation, and scale
    #[inline]
    pub fn new(position: Vector3, rotation: Quaternion, scale: Vector3) -> Self {
        Self { position, rotation, scale }
    }

    /// Creates a new identity transform (no translation, no rotation, unit scale)
    #[inline]
    pub fn identity() -> Self {
        Self::new(Vector3::zero(), Quaternion::identity(), Vector3::one())
    }

    /// Creates a new transform from just a position
    #[inline]
    pub fn from_position(position: Vector3) -> Self {
        Self::new(position, Quaternion::identity(), Vector3::one())
    }

    /// Creates a new transform from a position and rotation
    #[inline]
    pub fn from_position_rotation(position: Vector3, rotation: Quaternion) -> Self {
        Self::new(position, rotation, Vector3::one())
    }

    /// Transforms a local-space point into world space
    #[inline]
    pub fn transform_point(&self, point: Vector3) -> Vector3 {
        self.rotation.rotate_vector(point.component_mul(&self.scale)) + self.position
    }

    /// Transforms a world-space point into local space.
    ///
    /// Scale components below `EPSILON` are treated as 1 on the way back.
    pub fn inverse_transform_point(&self, point: Vector3) -> Vector3 {
        let local = self.rotation.inverse().rotate_vector(point - self.position);
        let safe = |s: f32| if s.abs() > EPSILON { s } else { 1.0 };
        Vector3::new(
            local.x / safe(self.scale.x),
            local.y / safe(self.scale.y),
            local.z / safe(self.scale.z),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
