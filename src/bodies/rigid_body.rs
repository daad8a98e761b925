use crate::bodies::body_flags::BodyFlags;
use crate::bodies::{BodyType, Particle};
use crate::collision::ColliderHandle;
use crate::core::GravityType;
use crate::error::PhysicsError;
use crate::integration::Integrator;
use crate::math::{Quaternion, Transform, Vector3};
use crate::Result;

/// A collider-carrying point mass without angular state.
///
/// Its state is a single particle so collision resolution can treat it exactly
/// like a one-particle aggregate.
#[derive(Debug, Clone)]
pub struct RigidBody {
    particle: Particle,
    rotation: Quaternion,
    scale: Vector3,
    body_type: BodyType,
    flags: BodyFlags,
    force: Vector3,
    pub(crate) collider: Option<ColliderHandle>,
}

impl RigidBody {
    /// Creates a dynamic body of the given mass
    pub fn new_dynamic(position: Vector3, mass: f32) -> Result<Self> {
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "dynamic rigid body needs a positive mass, got {}",
                mass
            )));
        }
        Ok(Self::with_particle(Particle::new(position, mass), BodyType::Dynamic))
    }

    /// Creates a host-driven body that acts as an immovable obstacle
    pub fn new_kinematic(position: Vector3) -> Self {
        Self::with_particle(Particle::pinned(position), BodyType::Kinematic)
    }

    fn with_particle(particle: Particle, body_type: BodyType) -> Self {
        Self {
            particle,
            rotation: Quaternion::identity(),
            scale: Vector3::one(),
            body_type,
            flags: BodyFlags::AFFECTED_BY_GRAVITY,
            force: Vector3::ZERO,
            collider: None,
        }
    }

    /// Sets the (fixed) orientation used to pose the collider
    pub fn with_rotation(mut self, rotation: Quaternion) -> Self {
        self.rotation = rotation.normalize();
        self
    }

    /// Sets the scale applied to the collider extents
    pub fn with_scale(mut self, scale: Vector3) -> Self {
        self.scale = scale;
        self
    }

    /// Enables or disables gravity
    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.flags.set(BodyFlags::AFFECTED_BY_GRAVITY, use_gravity);
        self
    }

    /// Returns the body type
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// World position
    pub fn position(&self) -> Vector3 {
        self.particle.position
    }

    /// Teleports the body, keeping its velocity
    pub fn set_position(&mut self, position: Vector3) {
        let offset = position - self.particle.position;
        self.particle.position = position;
        self.particle.prev_position += offset;
    }

    /// Linear velocity in units per second
    pub fn linear_velocity(&self) -> Vector3 {
        self.particle.velocity
    }

    /// Sets the linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vector3) {
        self.particle.velocity = velocity;
    }

    /// Mass of the body (0 for kinematic)
    pub fn mass(&self) -> f32 {
        self.particle.mass
    }

    /// Accumulates a force for the next integration step
    pub fn apply_force(&mut self, force: Vector3) {
        self.force += force;
    }

    /// Pose used by the collider
    pub fn transform(&self) -> Transform {
        Transform::new(self.particle.position, self.rotation, self.scale)
    }

    /// The single particle carrying the body's state
    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub(crate) fn particle_mut(&mut self) -> &mut Particle {
        &mut self.particle
    }

    /// Collider attached to the body
    pub fn collider(&self) -> Option<ColliderHandle> {
        self.collider
    }

    /// True if the body can be moved by integration and collisions
    pub fn is_movable(&self) -> bool {
        self.body_type == BodyType::Dynamic && !self.particle.is_pinned()
    }

    /// Inverse mass, 0 if the body cannot move
    pub fn inverse_mass(&self) -> f32 {
        if self.is_movable() {
            self.particle.inv_mass
        } else {
            0.0
        }
    }

    /// Removes the part of the velocity heading along `direction` (a unit
    /// contact normal), so a body pushed out of a contact stops driving into it
    pub(crate) fn stop_approach(&mut self, direction: Vector3) {
        let approach = self.particle.velocity.dot(&direction);
        if approach > 0.0 {
            self.particle.velocity -= direction * approach;
        }
    }

    /// Applies accumulated forces and gravity, then clears the force accumulator
    pub fn integrate(&mut self, integrator: &dyn Integrator, gravity: &GravityType, dt: f32) {
        if !self.is_movable() {
            self.force = Vector3::ZERO;
            return;
        }
        let mut acceleration = self.force * self.particle.inv_mass;
        if self.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY) {
            acceleration += gravity.acceleration_at(self.particle.position);
        }
        integrator.integrate(&mut self.particle, acceleration, dt);
        self.force = Vector3::ZERO;
    }
}
