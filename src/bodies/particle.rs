use crate::math::{Vector3, EPSILON};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A point mass advanced by position Verlet.
///
/// `velocity` is derived: for Verlet particles it holds the positional delta of
/// the last tick (`position - prev_position`) and is only consumed by damping
/// terms. Rigid bodies store their per-second velocity in it instead.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Particle {
    pub position: Vector3,
    pub prev_position: Vector3,
    pub velocity: Vector3,
    pub mass: f32,
    /// Zero marks an immovable (pinned) particle
    pub inv_mass: f32,
}

impl Particle {
    /// Creates a resting particle. A mass at or below `EPSILON` pins it.
    pub fn new(position: Vector3, mass: f32) -> Self {
        let inv_mass = if mass > EPSILON && mass.is_finite() { 1.0 / mass } else { 0.0 };
        Self {
            position,
            prev_position: position,
            velocity: Vector3::ZERO,
            mass: mass.max(0.0),
            inv_mass,
        }
    }

    /// Creates an immovable particle
    pub fn pinned(position: Vector3) -> Self {
        Self::new(position, 0.0)
    }

    /// Returns true if the particle cannot be moved by integration or corrections
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.inv_mass <= 0.0
    }

    /// Pins the particle in place
    pub fn pin(&mut self) {
        self.inv_mass = 0.0;
        self.reset_velocity();
    }

    /// Restores a finite mass
    pub fn unpin(&mut self, mass: f32) {
        *self = Self {
            position: self.position,
            ..Self::new(self.position, mass)
        };
    }

    /// Positional delta of the last step
    #[inline]
    pub fn displacement(&self) -> Vector3 {
        self.position - self.prev_position
    }

    /// Teleports the particle, discarding its implicit velocity
    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
        self.reset_velocity();
    }

    /// Forgets the implicit velocity
    pub fn reset_velocity(&mut self) {
        self.prev_position = self.position;
        self.velocity = Vector3::ZERO;
    }
}
