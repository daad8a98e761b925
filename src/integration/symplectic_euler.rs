use crate::bodies::Particle;
use crate::integration::Integrator;
use crate::math::Vector3;

/// Semi-implicit Euler for rigid point bodies.
///
/// The particle's `velocity` is a per-second velocity here, updated before the position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymplecticEulerIntegrator;

impl SymplecticEulerIntegrator {
    /// Creates a new Symplectic Euler integrator
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for SymplecticEulerIntegrator {
    fn integrate(&self, particle: &mut Particle, acceleration: Vector3, dt: f32) {
        if particle.is_pinned() {
            return;
        }

        let velocity = particle.velocity + acceleration * dt;
        let next = particle.position + velocity * dt;
        if !next.is_finite() {
            return;
        }

        particle.velocity = velocity;
        particle.prev_position = particle.position;
        particle.position = next;
    }

    fn name(&self) -> &str {
        "SymplecticEuler"
    }
}
