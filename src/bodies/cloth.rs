//! Cloth grids: a regular lattice of particles linked by structural, shear and bend constraints.

use crate::bodies::{BodyDesc, BodyKind, DistanceDesc, ParticleDesc};
use crate::error::PhysicsError;
use crate::math::Vector3;
use crate::Result;

/// Stiffness of the links between direct neighbours
pub const STRUCTURAL_STIFFNESS: f32 = 0.1;

/// Stiffness of the links skipping one particle
pub const BEND_STIFFNESS: f32 = 0.0075;

/// Stiffness of the diagonal links
pub const SHEAR_STIFFNESS: f32 = 1.0;

/// Parameters of a rectangular cloth lying in the local XY plane
#[derive(Debug, Clone, PartialEq)]
pub struct ClothGrid {
    pub x_size: usize,
    pub y_size: usize,
    pub tile_size: f32,
    pub particle_mass: f32,
    pub structural_stiffness: f32,
    pub shear_stiffness: f32,
    pub bend_stiffness: f32,
    pub damping: f32,
    /// Pins both corners of the top row
    pub pin_top_corners: bool,
}

impl ClothGrid {
    /// Grid of `x_size` by `y_size` tiles with the default link stiffnesses
    pub fn new(x_size: usize, y_size: usize, tile_size: f32) -> Self {
        Self {
            x_size,
            y_size,
            tile_size,
            particle_mass: 1.0,
            structural_stiffness: STRUCTURAL_STIFFNESS,
            shear_stiffness: SHEAR_STIFFNESS,
            bend_stiffness: BEND_STIFFNESS,
            damping: 0.0,
            pin_top_corners: true,
        }
    }

    /// Square grid
    pub fn square(size: usize, tile_size: f32) -> Self {
        Self::new(size, size, tile_size)
    }

    /// Number of particles, `(x_size + 1) * (y_size + 1)`
    pub fn particle_count(&self) -> usize {
        (self.x_size + 1) * (self.y_size + 1)
    }

    /// Number of links the grid generates
    pub fn constraint_count(&self) -> usize {
        let (x, y) = (self.x_size, self.y_size);
        let shear = x * y * 2;
        let structural = x * (y + 1) + y * (x + 1);
        let bend = x.saturating_sub(1) * (y + 1) + y.saturating_sub(1) * (x + 1);
        shear + structural + bend
    }

    /// Particle index of grid vertex `(x, y)`
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * (self.x_size + 1) + x
    }

    /// Indices of the particles pinned in place
    pub fn pinned_indices(&self) -> Vec<usize> {
        if self.pin_top_corners {
            vec![self.index(0, self.y_size), self.index(self.x_size, self.y_size)]
        } else {
            Vec::new()
        }
    }

    /// Local vertex positions, row by row, offset by half the vertex count per side
    pub fn vertices(&self) -> Vec<Vector3> {
        let half_x = (self.x_size + 1) as f32 * 0.5;
        let half_y = (self.y_size + 1) as f32 * 0.5;
        let mut vertices = Vec::with_capacity(self.particle_count());
        for y in 0..=self.y_size {
            for x in 0..=self.x_size {
                vertices.push(Vector3::new(
                    (x as f32 - half_x) * self.tile_size,
                    (y as f32 - half_y) * self.tile_size,
                    0.0,
                ));
            }
        }
        vertices
    }

    /// Links in relaxation order: shear, then structural, then bend
    pub fn links(&self) -> Vec<DistanceDesc> {
        let (xs, ys) = (self.x_size, self.y_size);
        let row = xs + 1;
        let link = |a: usize, b: usize, k: f32| {
            DistanceDesc::new(a, b).with_stiffness(k).with_damping(self.damping)
        };
        let mut links = Vec::with_capacity(self.constraint_count());

        for y in 0..ys {
            for x in 0..=xs {
                let i = self.index(x, y);
                let above = i + row;
                if x < xs {
                    links.push(link(i, above + 1, self.shear_stiffness));
                }
                if x > 0 {
                    links.push(link(i, above - 1, self.shear_stiffness));
                }
            }
        }

        for y in 0..=ys {
            for x in 0..=xs {
                let i = self.index(x, y);
                if x < xs {
                    links.push(link(i, i + 1, self.structural_stiffness));
                }
                if y < ys {
                    links.push(link(i, i + row, self.structural_stiffness));
                }
            }
        }

        for y in 0..=ys {
            for x in 0..=xs {
                let i = self.index(x, y);
                if x + 1 < xs {
                    links.push(link(i, i + 2, self.bend_stiffness));
                }
                if y + 1 < ys {
                    links.push(link(i, i + 2 * row, self.bend_stiffness));
                }
            }
        }

        links
    }

    /// Authoring data for the cloth body
    pub fn build(&self) -> Result<BodyDesc> {
        if self.x_size == 0 || self.y_size == 0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "cloth grid needs at least one tile per side, got {}x{}",
                self.x_size, self.y_size
            )));
        }
        if !(self.tile_size > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "cloth tile size must be positive, got {}",
                self.tile_size
            )));
        }

        let pinned = self.pinned_indices();
        let particles = self
            .vertices()
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                if pinned.contains(&i) {
                    ParticleDesc::pinned(v)
                } else {
                    ParticleDesc::new(v, self.particle_mass)
                }
            })
            .collect();

        Ok(BodyDesc {
            particles,
            distance_constraints: self.links(),
            ..BodyDesc::new(BodyKind::Cloth)
        })
    }
}
