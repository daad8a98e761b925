use crate::bodies::Particle;
use crate::constraints::{BoundConstraint, DistanceConstraint, PointConstraint};
use crate::error::PhysicsError;
use crate::Result;

/// Base trait for constraints relaxed over a body's particle array
pub trait Constraint {
    /// Returns the type name of the constraint
    fn constraint_type(&self) -> &'static str;

    /// Indices of the particles this constraint reads or writes.
    /// Constraints that touch every particle return an empty list.
    fn particle_indices(&self) -> Vec<usize>;

    /// Runs one relaxation step
    fn apply(&self, particles: &mut [Particle]);

    /// Checks that every referenced particle exists
    fn validate(&self, particle_count: usize) -> Result<()> {
        match self.particle_indices().into_iter().find(|&i| i >= particle_count) {
            Some(index) => Err(PhysicsError::MalformedContent(format!(
                "{} constraint references particle {} but the body has {} particles",
                self.constraint_type(),
                index,
                particle_count
            ))),
            None => Ok(()),
        }
    }
}

/// The closed set of particle constraints a body can carry
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleConstraint {
    Distance(DistanceConstraint),
    Point(PointConstraint),
    Bound(BoundConstraint),
}

impl ParticleConstraint {
    /// Gives lazily-resolved parameters their value from the current particle layout
    pub fn resolve(&mut self, particles: &[Particle]) {
        if let Self::Distance(distance) = self {
            distance.resolve_rest_length(particles);
        }
    }
}

impl Constraint for ParticleConstraint {
    fn constraint_type(&self) -> &'static str {
        match self {
            Self::Distance(c) => c.constraint_type(),
            Self::Point(c) => c.constraint_type(),
            Self::Bound(c) => c.constraint_type(),
        }
    }

    fn particle_indices(&self) -> Vec<usize> {
        match self {
            Self::Distance(c) => c.particle_indices(),
            Self::Point(c) => c.particle_indices(),
            Self::Bound(c) => c.particle_indices(),
        }
    }

    fn apply(&self, particles: &mut [Particle]) {
        match self {
            Self::Distance(c) => c.apply(particles),
            Self::Point(c) => c.apply(particles),
            Self::Bound(c) => c.apply(particles),
        }
    }
}

impl From<DistanceConstraint> for ParticleConstraint {
    fn from(c: DistanceConstraint) -> Self {
        Self::Distance(c)
    }
}

impl From<PointConstraint> for ParticleConstraint {
    fn from(c: PointConstraint) -> Self {
        Self::Point(c)
    }
}

impl From<BoundConstraint> for ParticleConstraint {
    fn from(c: BoundConstraint) -> Self {
        Self::Bound(c)
    }
}
