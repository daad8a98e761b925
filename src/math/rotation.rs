use crate::math::{Vector3, EPSILON};
use std::fmt;
use std::ops::{Mul, MulAssign};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Quaternion for representing rotations in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Quaternion {
    /// Real component
    pub w: f32,

    /// First imaginary component
    pub x: f32,

    /// Second imaginary component
    pub y: f32,

    /// Third imaginary component
    pub z: f32,
}

/// Rotation trait for rotation representations
pub trait Rotation {
    /// Rotate a vector by this rotation
    fn rotate_vector(&self, v: Vector3) -> Vector3;

    /// Get the angle in radians of this rotation
    fn angle(&self) -> f32;
}

impl Quaternion {
    /// Creates a new quaternion
    #[inline]
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Creates an identity quaternion (no rotation)
    #[inline]
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Creates a quaternion from an axis-angle representation
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Self {
        let axis = match axis.try_normalize() {
            Some(axis) => axis,
            None => return Self::identity(),
        };
        let half_angle = angle * 0.5;
        let s = half_angle.sin();

        Self::new(half_angle.cos(), axis.x * s, axis.y * s, axis.z * s)
    }

    /// Creates a quaternion from Euler angles in radians, applied in Z, X, Y order
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        let qx = Self::from_axis_angle(Vector3::unit_x(), x);
        let qy = Self::from_axis_angle(Vector3::unit_y(), y);
        let qz = Self::from_axis_angle(Vector3::unit_z(), z);
        qy * qx * qz
    }

    /// Builds the rotation whose columns are the given orthonormal basis vectors
    pub fn from_basis(right: Vector3, up: Vector3, forward: Vector3) -> Self {
        let (m00, m01, m02) = (right.x, up.x, forward.x);
        let (m10, m11, m12) = (right.y, up.y, forward.y);
        let (m20, m21, m22) = (right.z, up.z, forward.z);
        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new(0.25 / s, (m21 - m12) * s, (m02 - m20) * s, (m10 - m01) * s)
        } else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            Self::new((m21 - m12) / s, 0.25 * s, (m01 + m10) / s, (m02 + m20) / s)
        } else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            Self::new((m02 - m20) / s, (m01 + m10) / s, 0.25 * s, (m12 + m21) / s)
        } else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            Self::new((m10 - m01) / s, (m02 + m20) / s, (m12 + m21) / s, 0.25 * s)
        };
        q.normalize()
    }

    /// Rotation whose local +z looks along `forward` with local +y as close to `up` as possible.
    ///
    /// Degenerate inputs (zero forward, or up parallel to forward) fall back to
    /// a stable perpendicular so the result is always a valid rotation.
    pub fn look_rotation(forward: Vector3, up: Vector3) -> Self {
        let forward = match forward.try_normalize() {
            Some(f) => f,
            None => return Self::identity(),
        };
        let right = match up.cross(&forward).try_normalize() {
            Some(r) => r,
            None => {
                let fallback = if forward.y.abs() < 0.9 { Vector3::unit_y() } else { Vector3::unit_x() };
                fallback.cross(&forward).normalize()
            }
        };
        let up = forward.cross(&right);
        Self::from_basis(right, up, forward)
    }

    /// Shortest-arc rotation taking direction `from` onto direction `to`
    pub fn from_to_rotation(from: Vector3, to: Vector3) -> Self {
        let (from, to) = match (from.try_normalize(), to.try_normalize()) {
            (Some(f), Some(t)) => (f, t),
            _ => return Self::identity(),
        };
        let d = from.dot(&to);
        if d >= 1.0 - EPSILON {
            return Self::identity();
        }
        if d <= -1.0 + EPSILON {
            // Opposite directions: half turn about any perpendicular axis
            let mut axis = Vector3::unit_x().cross(&from);
            if axis.length_squared() < EPSILON {
                axis = Vector3::unit_y().cross(&from);
            }
            return Self::from_axis_angle(axis, std::f32::consts::PI);
        }
        let axis = from.cross(&to);
        Self::new(1.0 + d, axis.x, axis.y, axis.z).normalize()
    }

    /// Returns the conjugate of this quaternion
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Returns the squared length of this quaternion
    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the length of this quaternion
    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Normalizes this quaternion, returning identity for a degenerate one
    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > EPSILON {
            let inv = 1.0 / len;
            Self::new(self.w * inv, self.x * inv, self.y * inv, self.z * inv)
        } else {
            Self::identity()
        }
    }

    /// Inverse rotation
    #[inline]
    pub fn inverse(&self) -> Self {
        let len_sq = self.length_squared();
        if len_sq > EPSILON {
            let c = self.conjugate();
            let inv = 1.0 / len_sq;
            Self::new(c.w * inv, c.x * inv, c.y * inv, c.z * inv)
        } else {
            Self::identity()
        }
    }

    /// Dot product of two quaternions
    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Rotation for Quaternion {
    fn rotate_vector(&self, v: Vector3) -> Vector3 {
        let q = Vector3::new(self.x, self.y, self.z);
        let t = q.cross(&v) * 2.0;
        v + t * self.w + q.cross(&t)
    }

    fn angle(&self) -> f32 {
        2.0 * crate::math::clamp(self.w.abs(), 0.0, 1.0).acos()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, o: Self) -> Self {
        Self::new(
            self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
            self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            self.w * o.y - self.x * o.z + self.y * o.w + self.z * o.x,
            self.w * o.z + self.x * o.y - self.y * o.x + self.z * o.w,
        )
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Mul<Vector3> for Quaternion {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        self.rotate_vector(v)
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quaternion({:.4}, {:.4}, {:.4}, {:.4})", self.w, self.x, self.y, self.z)
    }
}
