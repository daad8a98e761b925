use crate::bodies::Particle;
use crate::constraints::Constraint;
use crate::math::EPSILON;

/// Authored rest length meaning "use the distance at body creation"
pub const USE_CURRENT_LENGTH: f32 = -1.0;

/// Scale applied to the authored damping coefficient.
///
/// Velocities are positional deltas per tick, so the raw coefficient would overshoot.
pub const DAMPING_SCALE: f32 = 0.01;

/// Default stiffness for authored distance constraints
pub const DEFAULT_STIFFNESS: f32 = 1.0;

/// Spring-like constraint keeping two particles at a rest length
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConstraint {
    a: usize,
    b: usize,
    rest_length: f32,
    stiffness: f32,
    damping: f32,
}

impl DistanceConstraint {
    /// Creates a new distance constraint.
    ///
    /// Pass [`USE_CURRENT_LENGTH`] as `rest_length` to take the distance the
    /// particles have when [`resolve_rest_length`](Self::resolve_rest_length) runs.
    pub fn new(a: usize, b: usize, rest_length: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            a,
            b,
            rest_length,
            stiffness: crate::math::clamp(stiffness, 0.0, 1.0),
            damping: damping.max(0.0),
        }
    }

    /// Rigid link (stiffness 1, no damping) using the current distance
    pub fn rigid(a: usize, b: usize) -> Self {
        Self::new(a, b, USE_CURRENT_LENGTH, DEFAULT_STIFFNESS, 0.0)
    }

    /// Index of the first particle
    pub fn first(&self) -> usize {
        self.a
    }

    /// Index of the second particle
    pub fn second(&self) -> usize {
        self.b
    }

    /// Target distance
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Returns true while the rest length still waits to be taken from the particles
    pub fn uses_current_length(&self) -> bool {
        (self.rest_length - USE_CURRENT_LENGTH).abs() < EPSILON
    }

    /// Replaces the "current length" marker with the actual particle distance
    pub fn resolve_rest_length(&mut self, particles: &[Particle]) {
        if !self.uses_current_length() {
            return;
        }
        if let (Some(p1), Some(p2)) = (particles.get(self.a), particles.get(self.b)) {
            self.rest_length = p1.position.distance(&p2.position);
        }
    }
}

impl Constraint for DistanceConstraint {
    fn constraint_type(&self) -> &'static str {
        "Distance"
    }

    fn particle_indices(&self) -> Vec<usize> {
        vec![self.a, self.b]
    }

    fn apply(&self, particles: &mut [Particle]) {
        if self.a == self.b || self.a >= particles.len() || self.b >= particles.len() {
            return;
        }
        let p1 = particles[self.a];
        let p2 = particles[self.b];

        let delta = p2.position - p1.position;
        let length = delta.length();
        // Also rejects NaN
        if !(length > EPSILON) {
            return;
        }
        let inv_mass_sum = p1.inv_mass + p2.inv_mass;
        if inv_mass_sum <= EPSILON {
            return;
        }

        let diff = (length - self.rest_length) / (length * inv_mass_sum);
        let correction = delta * 0.5 * diff;
        let d = self.damping * DAMPING_SCALE;

        particles[self.a].position += (correction * self.stiffness - p1.velocity * d) * p1.inv_mass;
        particles[self.b].position -= (correction * self.stiffness + p2.velocity * d) * p2.inv_mass;
    }
}
