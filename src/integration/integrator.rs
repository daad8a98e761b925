use crate::bodies::Particle;
use crate::math::Vector3;

/// Trait for numerical integration schemes advancing a single particle
pub trait Integrator {
    /// Advances `particle` by one step of length `dt` under `acceleration`
    fn integrate(&self, particle: &mut Particle, acceleration: Vector3, dt: f32);

    /// Returns the name of the integrator
    fn name(&self) -> &str;
}
