//! Particle constraints relaxed Gauss-Seidel style, in array order.

mod constraint;
mod distance;
mod point;
mod bound;

pub use self::constraint::{Constraint, ParticleConstraint};
pub use self::distance::{DistanceConstraint, USE_CURRENT_LENGTH, DAMPING_SCALE, DEFAULT_STIFFNESS};
pub use self::point::PointConstraint;
pub use self::bound::BoundConstraint;
