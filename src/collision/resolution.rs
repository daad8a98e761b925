//! Jakobsen-style positional correction.
//!
//! A contact moves a point attached to a body from where it is to where it
//! should be. The body's particles are displaced with weights chosen so that
//! the weighted point lands exactly on the target: every contact type goes
//! through [`displace_particles`].

use nalgebra::{DMatrix, DVector};

use crate::bodies::Particle;
use crate::collision::narrow_phase::Contact;
use crate::math::{Vector3, EPSILON};

/// Smallest particle count that uses the exact barycentric solve
pub const EXACT_WEIGHTING_MIN_PARTICLES: usize = 4;

/// Per-particle weights expressing `point` in terms of the particles.
///
/// One particle gets the full weight. Four or more use the least-norm affine
/// combination (`Σc·p = point`, `Σc = 1`); smaller sets, and degenerate solves,
/// use a distance ratio where closer particles weigh more. Weights sum to 1.
pub fn weighting_coefficients(particles: &[Particle], point: Vector3) -> Vec<f32> {
    match particles.len() {
        0 => Vec::new(),
        1 => vec![1.0],
        n if n >= EXACT_WEIGHTING_MIN_PARTICLES => {
            barycentric_coefficients(particles, point).unwrap_or_else(|| distance_coefficients(particles, point))
        }
        _ => distance_coefficients(particles, point),
    }
}

/// Least-norm solution of the affine system through the 4x4 Gram matrix
fn barycentric_coefficients(particles: &[Particle], point: Vector3) -> Option<Vec<f32>> {
    let n = particles.len();
    let a = DMatrix::<f32>::from_fn(4, n, |row, col| {
        let p = particles[col].position;
        match row {
            0 => p.x,
            1 => p.y,
            2 => p.z,
            _ => 1.0,
        }
    });
    let b = DVector::<f32>::from_column_slice(&[point.x, point.y, point.z, 1.0]);

    let gram = &a * a.transpose();
    let y = gram.svd(true, true).solve(&b, EPSILON).ok()?;
    let c = a.transpose() * y;

    if c.iter().all(|v| v.is_finite()) {
        Some(c.iter().copied().collect())
    } else {
        None
    }
}

/// `c_i = 1 - d_i / Σd`, normalized to sum to one
fn distance_coefficients(particles: &[Particle], point: Vector3) -> Vec<f32> {
    let n = particles.len();
    let distances: Vec<f32> = particles.iter().map(|p| p.position.distance(&point)).collect();
    let total: f32 = distances.iter().sum();
    if !(total > EPSILON) {
        return vec![1.0 / n as f32; n];
    }

    let mut coefficients: Vec<f32> = distances.iter().map(|d| 1.0 - d / total).collect();
    let sum: f32 = coefficients.iter().sum();
    if sum > EPSILON {
        for c in &mut coefficients {
            *c /= sum;
        }
    } else {
        coefficients = vec![1.0 / n as f32; n];
    }
    coefficients
}

/// Moves the particles so that the weighted `current` point lands on `target`.
///
/// Each particle moves by `lambda * c_i * invMass_i * (target - current)` with
/// `lambda = 1 / Σ(c_i² · invMass_i)`. This weights the plain `1 / Σc_i²` by
/// inverse mass so the weighted point lands on `target` for any masses; the two
/// agree when every inverse mass is 1. Pinned particles never move. Returns
/// false when nothing could move.
pub fn displace_particles(particles: &mut [Particle], current: Vector3, target: Vector3) -> bool {
    let delta = target - current;
    if !delta.is_finite() || delta.length_squared() <= EPSILON * EPSILON {
        return false;
    }

    let coefficients = weighting_coefficients(particles, current);
    let weight: f32 = particles
        .iter()
        .zip(&coefficients)
        .map(|(p, c)| c * c * p.inv_mass)
        .sum();
    if !(weight > EPSILON) {
        return false;
    }
    let lambda = 1.0 / weight;

    for (particle, c) in particles.iter_mut().zip(coefficients) {
        if particle.is_pinned() {
            continue;
        }
        particle.position += delta * (lambda * c * particle.inv_mass);
    }
    true
}

/// Fraction of the correction each side takes, from the sides' inverse masses.
///
/// An immovable side passes 0 and the other side takes the whole correction.
/// Returns `None` when neither side can move.
pub fn split_shares(inverse_mass_a: f32, inverse_mass_b: f32) -> Option<(f32, f32)> {
    let total = inverse_mass_a + inverse_mass_b;
    if !(total > EPSILON) {
        return None;
    }
    Some((inverse_mass_a / total, inverse_mass_b / total))
}

/// One side of a contact: the particles that carry it and their inverse mass
pub struct ContactSide<'a> {
    pub particles: Option<&'a mut [Particle]>,
    pub inverse_mass: f32,
}

impl<'a> ContactSide<'a> {
    /// A side that can be displaced
    pub fn movable(particles: &'a mut [Particle], inverse_mass: f32) -> Self {
        Self {
            particles: Some(particles),
            inverse_mass,
        }
    }

    /// A side that never moves (static geometry, kinematic bodies)
    pub fn fixed() -> Self {
        Self {
            particles: None,
            inverse_mass: 0.0,
        }
    }

    fn weight(&self) -> f32 {
        if self.particles.is_some() {
            self.inverse_mass.max(0.0)
        } else {
            0.0
        }
    }
}

/// Pushes both sides of a contact apart along its normal.
///
/// The first side moves by `-normal * depth * share_a`, the second by
/// `+normal * depth * share_b`. Returns true if any particle moved.
pub fn resolve_contact(contact: &Contact, a: ContactSide<'_>, b: ContactSide<'_>) -> bool {
    if !(contact.depth > 0.0) || !contact.normal.is_finite() {
        return false;
    }
    let (share_a, share_b) = match split_shares(a.weight(), b.weight()) {
        Some(shares) => shares,
        None => return false,
    };

    let mut moved = false;
    if let Some(particles) = a.particles {
        if share_a > 0.0 {
            let target = contact.point_a - contact.normal * (contact.depth * share_a);
            moved |= displace_particles(particles, contact.point_a, target);
        }
    }
    if let Some(particles) = b.particles {
        if share_b > 0.0 {
            let target = contact.point_b + contact.normal * (contact.depth * share_b);
            moved |= displace_particles(particles, contact.point_b, target);
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn weighted_point(particles: &[Particle], coefficients: &[f32]) -> Vector3 {
        particles
            .iter()
            .zip(coefficients)
            .fold(Vector3::ZERO, |acc, (p, c)| acc + p.position * *c)
    }

    #[test]
    fn single_particle_takes_the_whole_weight() {
        let particles = [Particle::new(Vector3::new(3.0, 1.0, 0.0), 2.0)];
        assert_eq!(weighting_coefficients(&particles, Vector3::ZERO), vec![1.0]);
    }

    #[test]
    fn closer_particles_weigh_more() {
        let particles = [
            Particle::new(Vector3::ZERO, 1.0),
            Particle::new(Vector3::new(4.0, 0.0, 0.0), 1.0),
        ];
        let c = weighting_coefficients(&particles, Vector3::new(1.0, 0.0, 0.0));
        assert!(c[0] > c[1]);
        assert_relative_eq!(c[0] + c[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn tetrahedron_weights_reproduce_the_point() {
        let particles = [
            Particle::new(Vector3::ZERO, 1.0),
            Particle::new(Vector3::unit_x(), 1.0),
            Particle::new(Vector3::unit_y(), 1.0),
            Particle::new(Vector3::unit_z(), 1.0),
        ];
        let point = Vector3::new(0.2, 0.3, 0.1);
        let c = weighting_coefficients(&particles, point);
        assert_relative_eq!(c.iter().sum::<f32>(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(weighted_point(&particles, &c), point, epsilon = 1e-4);
    }

    #[test]
    fn displacement_moves_the_weighted_point_onto_the_target() {
        let mut particles = [
            Particle::new(Vector3::ZERO, 1.0),
            Particle::new(Vector3::new(1.0, 0.0, 0.0), 3.0),
            Particle::new(Vector3::new(0.0, 1.0, 0.0), 0.5),
        ];
        let current = Vector3::new(0.25, 0.25, 0.0);
        let c = weighting_coefficients(&particles, current);
        let before = weighted_point(&particles, &c);
        let delta = Vector3::new(0.0, 0.0, 0.4);

        assert!(displace_particles(&mut particles, current, current + delta));
        assert_relative_eq!(weighted_point(&particles, &c), before + delta, epsilon = 1e-5);
    }

    #[test]
    fn equal_heavy_masses_still_reach_the_target() {
        let mut particles = [
            Particle::new(Vector3::ZERO, 4.0),
            Particle::new(Vector3::new(2.0, 0.0, 0.0), 4.0),
        ];
        let current = Vector3::new(0.5, 0.0, 0.0);
        let c = weighting_coefficients(&particles, current);
        let before = weighted_point(&particles, &c);
        let delta = Vector3::new(0.0, 1.0, 0.0);

        assert!(displace_particles(&mut particles, current, current + delta));
        assert_relative_eq!(weighted_point(&particles, &c), before + delta, epsilon = 1e-5);
    }

    #[test]
    fn pinned_particles_stay_put() {
        let mut particles = [Particle::pinned(Vector3::ZERO), Particle::new(Vector3::unit_x(), 1.0)];
        displace_particles(&mut particles, Vector3::ZERO, Vector3::unit_y());
        assert_eq!(particles[0].position, Vector3::ZERO);
        assert!(particles[1].position.y > 0.0);
    }

    #[test]
    fn immovable_pairs_have_no_shares() {
        assert_eq!(split_shares(0.0, 0.0), None);
        assert_eq!(split_shares(0.0, 2.0), Some((0.0, 1.0)));
        assert_eq!(split_shares(1.0, 1.0), Some((0.5, 0.5)));
    }
}
