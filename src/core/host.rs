//! Narrow interface to the host engine: transforms, mesh vertices and bone
//! rotations flow out of the simulation through [`SimulationHost`] after
//! every tick.

use crate::core::BodyHandle;
use crate::math::{Quaternion, Transform, Vector3};

/// Receives simulation output. Every method defaults to a no-op so a host
/// only implements what it renders.
pub trait SimulationHost {
    /// Derived world transform of a body
    fn write_transform(&mut self, _body: BodyHandle, _transform: &Transform) {}

    /// One vertex per particle, in authoring order
    fn write_vertices(&mut self, _body: BodyHandle, _vertices: &[Vector3]) {}

    /// Current rotations of a body's bones, in authoring order
    fn write_bones(&mut self, _body: BodyHandle, _rotations: &[(String, Quaternion)]) {}
}

/// Host that ignores every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl SimulationHost for NullHost {}
