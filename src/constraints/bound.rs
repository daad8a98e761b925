use crate::bodies::Particle;
use crate::constraints::Constraint;
use crate::math::{Aabb, Vector3};

/// Hard clamp of every movable particle into an axis-aligned box
#[derive(Debug, Clone, PartialEq)]
pub struct BoundConstraint {
    bounds: Aabb,
}

impl BoundConstraint {
    /// Creates a bound from an explicit box
    pub fn new(bounds: Aabb) -> Self {
        Self { bounds }
    }

    /// Box centered on the origin
    pub fn from_half_extents(half_extents: Vector3) -> Self {
        Self::new(Aabb::from_half_extents(half_extents.abs()))
    }

    /// The clamping box
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}

impl Constraint for BoundConstraint {
    fn constraint_type(&self) -> &'static str {
        "Bound"
    }

    fn particle_indices(&self) -> Vec<usize> {
        Vec::new()
    }

    fn apply(&self, particles: &mut [Particle]) {
        for particle in particles.iter_mut().filter(|p| !p.is_pinned()) {
            particle.position = self.bounds.clamp_point(particle.position);
        }
    }
}
