use crate::core::GravityType;
use crate::error::PhysicsError;
use crate::math::{Aabb, Vector3, EPSILON};
use crate::spatial::OctreeConfig;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Configuration parameters for the physics simulation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Fixed tick period in seconds
    pub tick_period: f32,

    /// Multiplier applied to host-supplied elapsed time
    pub time_scale: f32,

    /// Collision + relaxation passes per tick
    pub constraint_iterations: u32,

    /// Ticks run at most per host frame; leftover time is dropped
    pub max_substeps: u32,

    /// The type of gravity in the simulation
    pub gravity: GravityType,

    /// Broad-phase octree; `None` uses brute-force AABB pruning
    pub octree: Option<OctreeConfig>,

    /// Region applied as a bound constraint to bodies that request the default bounds
    pub default_bounds: Option<Aabb>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_period: 1.0 / 60.0,
            time_scale: 1.0,
            constraint_iterations: 4,
            max_substeps: 1,
            gravity: GravityType::default(),
            octree: Some(OctreeConfig::default()),
            default_bounds: Some(Aabb::from_half_extents(Vector3::new(10.0, 5.0, 10.0))),
        }
    }
}

impl SimulationConfig {
    /// Checks that the configuration can drive a simulation
    pub fn validate(&self) -> Result<()> {
        if !self.tick_period.is_finite() || self.tick_period <= EPSILON {
            return Err(PhysicsError::InvalidParameter(format!(
                "tick period must be positive, got {}",
                self.tick_period
            )));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "time scale must be non-negative, got {}",
                self.time_scale
            )));
        }
        if self.constraint_iterations == 0 {
            return Err(PhysicsError::InvalidParameter(
                "at least one constraint iteration is required".to_string(),
            ));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidParameter(
                "at least one substep per frame is required".to_string(),
            ));
        }
        if let Some(octree) = &self.octree {
            octree.validate()?;
        }
        Ok(())
    }
}
