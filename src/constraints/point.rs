use crate::bodies::Particle;
use crate::constraints::{Constraint, DAMPING_SCALE};
use crate::math::{Vector3, EPSILON};

/// Pulls a single particle toward a fixed world-space anchor
#[derive(Debug, Clone, PartialEq)]
pub struct PointConstraint {
    particle: usize,
    anchor: Vector3,
    stiffness: f32,
    damping: f32,
}

impl PointConstraint {
    /// Creates a new anchor constraint
    pub fn new(particle: usize, anchor: Vector3, stiffness: f32, damping: f32) -> Self {
        Self {
            particle,
            anchor,
            stiffness: crate::math::clamp(stiffness, 0.0, 1.0),
            damping: damping.max(0.0),
        }
    }

    /// Index of the anchored particle
    pub fn particle(&self) -> usize {
        self.particle
    }

    /// World-space anchor position
    pub fn anchor(&self) -> Vector3 {
        self.anchor
    }

    /// Moves the anchor
    pub fn set_anchor(&mut self, anchor: Vector3) {
        self.anchor = anchor;
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }
}

impl Constraint for PointConstraint {
    fn constraint_type(&self) -> &'static str {
        "Point"
    }

    fn particle_indices(&self) -> Vec<usize> {
        vec![self.particle]
    }

    fn apply(&self, particles: &mut [Particle]) {
        let p = match particles.get_mut(self.particle) {
            Some(p) => p,
            None => return,
        };
        // Pinned particles stay where they are; the anchor would otherwise divide by zero
        if p.inv_mass <= EPSILON {
            return;
        }
        let delta = p.position - self.anchor;
        // Already on the anchor, or degenerate: damping alone would push it off
        if !delta.is_finite() || !(delta.length() > EPSILON) {
            return;
        }

        // Correction scaled by the particle's mass so that, once multiplied back by
        // the inverse mass, a stiffness of 1 lands the particle on the anchor.
        let correction = delta * (self.stiffness / p.inv_mass);
        let d = self.damping * DAMPING_SCALE;
        p.position -= (correction - p.velocity * d) * p.inv_mass;
    }
}
