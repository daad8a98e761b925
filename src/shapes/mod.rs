//! Geometric primitives shared by colliders, the SAT core and the octree.
//!
//! Everything here is stateless value math; nothing in this module logs.

mod primitives;
mod plane;
pub mod box_shape;
mod sphere;

pub use self::primitives::{Interval, Line};
pub use self::plane::Plane;
pub use self::box_shape::{OrientedBox, ClosestPoint, POINT_IN_BOX_TOLERANCE};
pub use self::sphere::Sphere;
