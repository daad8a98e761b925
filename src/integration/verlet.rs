use crate::bodies::Particle;
use crate::integration::Integrator;
use crate::math::Vector3;

/// Position Verlet: velocity lives implicitly in the previous position
#[derive(Debug, Clone, Copy, Default)]
pub struct VerletIntegrator;

impl VerletIntegrator {
    /// Creates a new Verlet integrator
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for VerletIntegrator {
    fn integrate(&self, particle: &mut Particle, acceleration: Vector3, dt: f32) {
        // Zero inverse mass gates drift as well as acceleration
        if particle.is_pinned() {
            return;
        }

        let current = particle.position;
        let next = current + (current - particle.prev_position)
            + acceleration * (dt * dt * particle.inv_mass);
        if !next.is_finite() {
            return;
        }

        particle.prev_position = current;
        particle.position = next;
        particle.velocity = next - current;
    }

    fn name(&self) -> &str {
        "Verlet"
    }
}
