mod vector;
mod transform;
mod rotation;
mod aabb;
mod ray;

pub use vector::Vector3;
pub use transform::Transform;
pub use rotation::{Quaternion, Rotation};
pub use aabb::Aabb;
pub use ray::Ray;

/// Constant for a very small number, used to guard every division in the crate
pub const EPSILON: f32 = 1.0e-6;

/// Clamps a value between a minimum and maximum value
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
