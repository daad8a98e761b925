mod integrator;
mod verlet;
mod symplectic_euler;

pub use self::integrator::Integrator;
pub use self::verlet::VerletIntegrator;
pub use self::symplectic_euler::SymplecticEulerIntegrator;
