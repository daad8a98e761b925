use crate::math::{Vector3, Quaternion, Rotation, Aabb, EPSILON};
use crate::shapes::{Interval, Line, Plane};

/// Tolerance used when deciding whether a point lies inside a box
pub const POINT_IN_BOX_TOLERANCE: f32 = 1.0e-4;

/// Corner indices of the oriented cube.
///
/// The bottom face is `A B C D`, the top face `E F G H`. `A` is the minimum
/// corner, `B` lies along +z (forward), `D` along +x (right) and `E` along +y (up).
pub mod corner {
    pub const A: usize = 0;
    pub const B: usize = 1;
    pub const C: usize = 2;
    pub const D: usize = 3;
    pub const E: usize = 4;
    pub const F: usize = 5;
    pub const G: usize = 6;
    pub const H: usize = 7;
}

/// Pairs of corners forming the 12 edges of the cube
const EDGES: [(usize, usize); 12] = {
    use corner::*;
    [
        (A, B), (A, D), (A, E),
        (G, F), (G, C), (G, H),
        (E, F), (E, H), (C, B),
        (C, D), (B, F), (D, H),
    ]
};

/// Result of a closest-point query against a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Closest point on the box surface or interior
    pub point: Vector3,

    /// Whether the query point was inside the box
    pub inside: bool,

    /// Outward normal of the face the point was pushed to (only meaningful when `inside`)
    pub face_normal: Vector3,
}

/// An oriented box with its eight world-space corners precomputed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    center: Vector3,
    half_extents: Vector3,
    rotation: Quaternion,
    axes: [Vector3; 3],
    vertices: [Vector3; 8],
}

impl OrientedBox {
    /// Creates a box from its center, half extents and orientation
    pub fn new(center: Vector3, half_extents: Vector3, rotation: Quaternion) -> Self {
        let half_extents = half_extents.abs();
        let rotation = rotation.normalize();
        let axes = [
            rotation.rotate_vector(Vector3::unit_x()),
            rotation.rotate_vector(Vector3::unit_y()),
            rotation.rotate_vector(Vector3::unit_z()),
        ];

        let right = axes[0] * (half_extents.x * 2.0);
        let up = axes[1] * (half_extents.y * 2.0);
        let forward = axes[2] * (half_extents.z * 2.0);

        let a = center - axes[0] * half_extents.x - axes[1] * half_extents.y - axes[2] * half_extents.z;
        let b = a + forward;
        let c = b + right;
        let d = a + right;
        let e = a + up;
        let f = e + forward;
        let g = f + right;
        let h = e + right;

        Self {
            center,
            half_extents,
            rotation,
            axes,
            vertices: [a, b, c, d, e, f, g, h],
        }
    }

    /// Creates a box from full edge lengths
    pub fn from_size(center: Vector3, size: Vector3, rotation: Quaternion) -> Self {
        Self::new(center, size * 0.5, rotation)
    }

    /// Axis-aligned box with the given center and half extents
    pub fn axis_aligned(center: Vector3, half_extents: Vector3) -> Self {
        Self::new(center, half_extents, Quaternion::identity())
    }

    /// Center of the box
    #[inline]
    pub fn center(&self) -> Vector3 {
        self.center
    }

    /// Half extents along the local axes
    #[inline]
    pub fn half_extents(&self) -> Vector3 {
        self.half_extents
    }

    /// Full edge lengths
    #[inline]
    pub fn size(&self) -> Vector3 {
        self.half_extents * 2.0
    }

    /// Orientation of the box
    #[inline]
    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    /// Unit local axes in `[x, y, z]` order
    #[inline]
    pub fn axes(&self) -> [Vector3; 3] {
        self.axes
    }

    /// The eight corners, indexed by [`corner`]
    #[inline]
    pub fn vertices(&self) -> &[Vector3; 8] {
        &self.vertices
    }

    /// Radius of the sphere enclosing the box
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.half_extents.length()
    }

    /// World-space AABB enclosing the corners
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::new(self.vertices[0], self.vertices[0]);
        for v in &self.vertices[1..] {
            aabb.expand_to_include_point(*v);
        }
        aabb
    }

    /// The twelve edges of the box
    pub fn edges(&self) -> [Line; 12] {
        EDGES.map(|(i, j)| Line::new(self.vertices[i], self.vertices[j]))
    }

    /// The six face planes with outward normals, in `+x, -x, +y, -y, +z, -z` order
    pub fn planes(&self) -> [Plane; 6] {
        let c = self.center;
        let h = [self.half_extents.x, self.half_extents.y, self.half_extents.z];
        let mut planes = [Plane { normal: Vector3::ZERO, distance: 0.0 }; 6];
        for (i, axis) in self.axes.iter().enumerate() {
            let n = *axis;
            planes[i * 2] = Plane { normal: n, distance: n.dot(&(c + n * h[i])) };
            planes[i * 2 + 1] = Plane { normal: -n, distance: -n.dot(&(c - n * h[i])) };
        }
        planes
    }

    /// Projects the eight corners onto `axis`
    #[inline]
    pub fn project(&self, axis: Vector3) -> Interval {
        Interval::from_projection(&self.vertices, axis)
    }

    /// Returns true if the point lies inside the box (with a small tolerance)
    pub fn contains_point(&self, point: Vector3) -> bool {
        let dir = point - self.center;
        let h = [self.half_extents.x, self.half_extents.y, self.half_extents.z];
        self.axes.iter().zip(h).all(|(axis, half)| {
            let distance = dir.dot(axis);
            distance <= half + POINT_IN_BOX_TOLERANCE && distance >= -half - POINT_IN_BOX_TOLERANCE
        })
    }

    /// Closest point on (or in) the box to `point`.
    ///
    /// A point already inside is pushed to the nearest face so that the result
    /// always lies on the surface in that case.
    pub fn closest_point(&self, point: Vector3) -> ClosestPoint {
        let dir = point - self.center;
        let h = [self.half_extents.x, self.half_extents.y, self.half_extents.z];
        let mut result = self.center;
        let mut inside = true;
        let mut nearest_face = (f32::MAX, 0usize, 1.0f32);

        for (i, axis) in self.axes.iter().enumerate() {
            let distance = dir.dot(axis);
            if distance > h[i] || distance < -h[i] {
                inside = false;
            }
            let clamped = crate::math::clamp(distance, -h[i], h[i]);
            result += *axis * clamped;

            let gap = h[i] - distance.abs();
            if gap < nearest_face.0 {
                let sign = if distance < 0.0 { -1.0 } else { 1.0 };
                nearest_face = (gap, i, sign);
            }
        }

        let (gap, index, sign) = nearest_face;
        let face_normal = self.axes[index] * sign;
        if inside {
            result += face_normal * gap.max(0.0);
        }

        ClosestPoint {
            point: result,
            inside,
            face_normal,
        }
    }

    /// Returns a copy translated by `offset`
    pub fn translated(&self, offset: Vector3) -> Self {
        if offset.length_squared() < EPSILON * EPSILON {
            return *self;
        }
        Self::new(self.center + offset, self.half_extents, self.rotation)
    }
}
