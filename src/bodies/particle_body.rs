use crate::bodies::body_flags::BodyFlags;
use crate::bodies::{BodyDesc, BodyKind, BodyType, BoundsDesc, MeshSpace, Particle};
use crate::collision::ColliderHandle;
use crate::constraints::{
    BoundConstraint, Constraint, DistanceConstraint, ParticleConstraint, PointConstraint,
};
use crate::core::GravityType;
use crate::error::PhysicsError;
use crate::integration::Integrator;
use crate::math::{Aabb, Quaternion, Transform, Vector3, EPSILON};
use crate::Result;

/// A bone driven by the direction between two particles
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    name: String,
    from: usize,
    to: usize,
    rest_direction: Vector3,
    rest_rotation: Quaternion,
    rotation: Quaternion,
}

impl Bone {
    /// Bone name as authored
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current world rotation
    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    /// Particle indices `(from, to)` spanning the bone
    pub fn particles(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    fn update(&mut self, particles: &[Particle]) {
        if let (Some(a), Some(b)) = (particles.get(self.from), particles.get(self.to)) {
            let direction = b.position - a.position;
            if direction.try_normalize().is_some() {
                self.rotation = Quaternion::from_to_rotation(self.rest_direction, direction) * self.rest_rotation;
            }
        }
    }
}

/// A particle aggregate: particle object, cloth, soft body or soft structure
#[derive(Debug, Clone)]
pub struct ParticleBody {
    kind: BodyKind,
    body_type: BodyType,
    flags: BodyFlags,
    particles: Vec<Particle>,
    constraints: Vec<ParticleConstraint>,
    acceleration: Vector3,
    transform: Transform,
    initial_rotation: Quaternion,
    initial_frame: Quaternion,
    frame: Option<[usize; 3]>,
    bones: Vec<Bone>,
    mesh_space: MeshSpace,
    pub(crate) collider: Option<ColliderHandle>,
    pub(crate) particle_colliders: Vec<ColliderHandle>,
}

fn check_index(what: &str, index: usize, count: usize) -> Result<()> {
    if index < count {
        Ok(())
    } else {
        Err(PhysicsError::MalformedContent(format!(
            "{} references particle {} but the body has {} particles",
            what, index, count
        )))
    }
}

impl ParticleBody {
    /// Builds a body from authoring data.
    ///
    /// Particle positions are moved from local to world space by the authored
    /// transform and "current length" links are resolved against that layout.
    /// Any index that does not name a particle is rejected as malformed content.
    pub fn from_desc(desc: &BodyDesc, default_bounds: Option<Aabb>) -> Result<Self> {
        if desc.particles.is_empty() {
            return Err(PhysicsError::InvalidParameter("body has no particles".to_string()));
        }
        let count = desc.particles.len();

        let mut particles = Vec::with_capacity(count);
        for (i, p) in desc.particles.iter().enumerate() {
            if !p.mass.is_finite() || p.mass < 0.0 || !p.position.is_finite() {
                return Err(PhysicsError::InvalidParameter(format!(
                    "particle {} has invalid mass {} or position {}",
                    i, p.mass, p.position
                )));
            }
            let mut particle = Particle::new(desc.transform.transform_point(p.position), p.mass);
            if !particle.is_pinned() {
                particle.prev_position = particle.position - desc.initial_velocity;
                particle.velocity = desc.initial_velocity;
            }
            particles.push(particle);
        }

        let mut constraints: Vec<ParticleConstraint> = Vec::with_capacity(
            desc.distance_constraints.len() + desc.point_constraints.len() + 1,
        );
        for link in &desc.distance_constraints {
            check_index("distance constraint", link.a, count)?;
            check_index("distance constraint", link.b, count)?;
            if link.a == link.b {
                return Err(PhysicsError::MalformedContent(format!(
                    "distance constraint links particle {} to itself",
                    link.a
                )));
            }
            let mut constraint =
                DistanceConstraint::new(link.a, link.b, link.rest_length, link.stiffness, link.damping);
            if !constraint.uses_current_length() && !(link.rest_length >= 0.0) {
                return Err(PhysicsError::InvalidParameter(format!(
                    "distance constraint {}-{} has rest length {}",
                    link.a, link.b, link.rest_length
                )));
            }
            constraint.resolve_rest_length(&particles);
            constraints.push(constraint.into());
        }
        for point in &desc.point_constraints {
            check_index("point constraint", point.particle, count)?;
            constraints.push(
                PointConstraint::new(point.particle, point.anchor, point.stiffness, point.damping).into(),
            );
        }
        match desc.bounds {
            BoundsDesc::None => {}
            BoundsDesc::WorldDefault => {
                if let Some(bounds) = default_bounds {
                    constraints.push(BoundConstraint::new(bounds).into());
                }
            }
            BoundsDesc::Explicit(bounds) => constraints.push(BoundConstraint::new(bounds).into()),
        }

        let frame = match desc.frame_particles {
            Some(frame) => {
                for index in frame {
                    check_index("orientation frame", index, count)?;
                }
                Some(frame)
            }
            None if count >= 4 => Some([0, 2, 3]),
            None => None,
        };

        let mut bones = Vec::with_capacity(desc.bones.len());
        for bone in &desc.bones {
            check_index("bone", bone.from, count)?;
            check_index("bone", bone.to, count)?;
            let rest_direction = particles[bone.to].position - particles[bone.from].position;
            if rest_direction.try_normalize().is_none() {
                return Err(PhysicsError::MalformedContent(format!(
                    "bone {} spans two coincident particles",
                    bone.name
                )));
            }
            bones.push(Bone {
                name: bone.name.clone(),
                from: bone.from,
                to: bone.to,
                rest_direction,
                rest_rotation: bone.rest_rotation,
                rotation: bone.rest_rotation,
            });
        }

        if let Some(radius) = desc.particle_collider_radius {
            if !(radius > 0.0) {
                return Err(PhysicsError::InvalidParameter(format!(
                    "particle collider radius must be positive, got {}",
                    radius
                )));
            }
        }

        let mut flags = BodyFlags::empty();
        flags.set(BodyFlags::AFFECTED_BY_GRAVITY, desc.use_gravity);

        let mut body = Self {
            kind: desc.kind,
            body_type: desc.body_type,
            flags,
            particles,
            constraints,
            acceleration: desc.acceleration,
            transform: desc.transform,
            initial_rotation: desc.transform.rotation,
            initial_frame: Quaternion::identity(),
            frame,
            bones,
            mesh_space: desc.kind.mesh_space(),
            collider: None,
            particle_colliders: Vec::new(),
        };
        body.initial_frame = body.frame_rotation().unwrap_or_else(Quaternion::identity);
        body.update_transform();
        Ok(body)
    }

    /// Aggregate kind
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Dynamic or kinematic
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Switches between dynamic and kinematic
    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
    }

    /// Behaviour flags
    pub fn flags(&self) -> BodyFlags {
        self.flags
    }

    /// Suspends integration and constraint relaxation while the host positions particles
    pub fn set_frozen(&mut self, frozen: bool) {
        self.flags.set(BodyFlags::FROZEN, frozen);
    }

    /// Returns true while the body is frozen
    pub fn is_frozen(&self) -> bool {
        self.flags.contains(BodyFlags::FROZEN)
    }

    /// Skips the next integration pass only
    pub fn skip_next_integration(&mut self) {
        self.flags.insert(BodyFlags::SKIP_NEXT_INTEGRATION);
    }

    /// Enables or disables gravity for this body
    pub fn set_use_gravity(&mut self, use_gravity: bool) {
        self.flags.set(BodyFlags::AFFECTED_BY_GRAVITY, use_gravity);
    }

    /// Particles in authoring order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable particles in authoring order
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Moves one particle, discarding its implicit velocity
    pub fn set_particle_position(&mut self, index: usize, position: Vector3) -> Result<()> {
        let count = self.particles.len();
        let particle = self.particles.get_mut(index).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("particle {} of {}", index, count))
        })?;
        particle.set_position(position);
        Ok(())
    }

    /// Constraints in relaxation order
    pub fn constraints(&self) -> &[ParticleConstraint] {
        &self.constraints
    }

    /// Appends a constraint after validating its indices
    pub fn add_constraint(&mut self, constraint: impl Into<ParticleConstraint>) -> Result<()> {
        let mut constraint = constraint.into();
        constraint.validate(self.particles.len())?;
        constraint.resolve(&self.particles);
        self.constraints.push(constraint);
        Ok(())
    }

    /// Derived pose (center of mass and tracked orientation)
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Mean particle position
    pub fn center_of_mass(&self) -> Vector3 {
        Vector3::centroid(&self.positions()).unwrap_or(self.transform.position)
    }

    /// Bones in authoring order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Collider attached to the whole body
    pub fn collider(&self) -> Option<ColliderHandle> {
        self.collider
    }

    /// Per-particle colliders, indexed like the particles
    pub fn particle_colliders(&self) -> &[ColliderHandle] {
        &self.particle_colliders
    }

    /// True if integration and collisions may move the body
    pub fn is_movable(&self) -> bool {
        self.body_type == BodyType::Dynamic
            && !self.is_frozen()
            && self.particles.iter().any(|p| !p.is_pinned())
    }

    /// Inverse of the total mass of the movable particles, 0 if the body cannot move
    pub fn inverse_mass(&self) -> f32 {
        if !self.is_movable() {
            return 0.0;
        }
        let total: f32 = self.particles.iter().filter(|p| !p.is_pinned()).map(|p| p.mass).sum();
        if total > EPSILON {
            1.0 / total
        } else {
            0.0
        }
    }

    /// Advances every particle by one tick
    pub fn integrate(&mut self, integrator: &dyn Integrator, gravity: &GravityType, dt: f32) {
        if self.body_type != BodyType::Dynamic || self.is_frozen() {
            return;
        }
        if self.flags.contains(BodyFlags::SKIP_NEXT_INTEGRATION) {
            self.flags.remove(BodyFlags::SKIP_NEXT_INTEGRATION);
            return;
        }
        let use_gravity = self.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY);
        for particle in &mut self.particles {
            let mut acceleration = self.acceleration;
            if use_gravity {
                acceleration += gravity.acceleration_at(particle.position);
            }
            integrator.integrate(particle, acceleration, dt);
        }
    }

    /// One relaxation pass over all constraints, in array order
    pub fn relax_constraints(&mut self) {
        if self.body_type != BodyType::Dynamic || self.is_frozen() {
            return;
        }
        for constraint in &self.constraints {
            constraint.apply(&mut self.particles);
        }
    }

    /// Recomputes center of mass, orientation and bone rotations
    pub fn update_transform(&mut self) {
        self.transform.position = self.center_of_mass();
        if let Some(current) = self.frame_rotation() {
            self.transform.rotation =
                (current * self.initial_frame.inverse() * self.initial_rotation).normalize();
        }
        for bone in &mut self.bones {
            bone.update(&self.particles);
        }
    }

    /// Vertex buffer for the host mesh, or `None` for bodies that do not feed one
    pub fn mesh_vertices(&self) -> Option<Vec<Vector3>> {
        match self.mesh_space {
            MeshSpace::None => None,
            MeshSpace::World => Some(self.positions()),
            MeshSpace::Local => Some(
                self.particles
                    .iter()
                    .map(|p| self.transform.inverse_transform_point(p.position))
                    .collect(),
            ),
        }
    }

    /// Overrides where the mesh is reported
    pub fn set_mesh_space(&mut self, space: MeshSpace) {
        self.mesh_space = space;
    }

    fn positions(&self) -> Vec<Vector3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    fn frame_rotation(&self) -> Option<Quaternion> {
        let [a, b, c] = self.frame?;
        let (pa, pb, pc) = (
            self.particles.get(a)?.position,
            self.particles.get(b)?.position,
            self.particles.get(c)?.position,
        );
        let forward = pb - pa;
        let up = pc - pb;
        if forward.try_normalize().is_none() || up.try_normalize().is_none() {
            return None;
        }
        Some(Quaternion::look_rotation(forward, up))
    }
}
