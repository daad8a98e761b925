use crate::bodies::{Body, BodyDesc, ParticleBody, RigidBody};
use crate::collision::{
    ColliderDesc, ColliderHandle, ColliderOwner, ColliderShape, CollisionManager,
};
use crate::core::events::BodyEventType;
use crate::core::host::SimulationHost;
use crate::core::storage::Storage;
use crate::core::telemetry::{Telemetry, CATEGORY_BODIES, CATEGORY_SIMULATION};
use crate::core::{
    BodyEvent, BodyHandle, BodyStorage, CollisionEvent, EventQueue, GravityType, SimulationClock,
    SimulationConfig, SimulationState,
};
use crate::integration::{SymplecticEulerIntegrator, VerletIntegrator};
use crate::math::{Ray, Transform, Vector3};
use crate::error::PhysicsError;
use crate::Result;

/// The main physics world: owns every body and collider and runs the tick
pub struct PhysicsWorld {
    /// All bodies, in registration order
    bodies: BodyStorage<Body>,

    /// Colliders, axis cache and broad phase
    collisions: CollisionManager,

    /// Configuration for the simulation
    config: SimulationConfig,

    /// Fixed-tick accumulator and run state
    clock: SimulationClock,

    /// Queue of simulation events
    events: EventQueue,

    verlet: VerletIntegrator,
    euler: SymplecticEulerIntegrator,
    telemetry: Telemetry,
}

/// Result of a particle ray pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleHit {
    /// Body owning the particle
    pub body: BodyHandle,

    /// Index of the particle in its body
    pub particle: usize,

    /// Distance along the ray to the particle's collider
    pub distance: f32,

    /// Hit position in world space
    pub point: Vector3,
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.bodies.len())
            .field("collisions", &self.collisions)
            .field("state", &self.clock.state())
            .field("ticks", &self.clock.ticks())
            .finish()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        Self::with_telemetry(config, Telemetry::disabled())
    }

    /// Creates a world that reports to a debug sink
    pub fn with_telemetry(config: SimulationConfig, telemetry: Telemetry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bodies: BodyStorage::new(),
            collisions: CollisionManager::new(config.octree, telemetry.clone())?,
            clock: SimulationClock::new(config.tick_period, config.max_substeps),
            config,
            events: EventQueue::new(),
            verlet: VerletIntegrator::new(),
            euler: SymplecticEulerIntegrator::new(),
            telemetry,
        })
    }

    /// Returns a reference to the simulation configuration
    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Sets the gravity for the simulation
    pub fn set_gravity(&mut self, gravity: GravityType) {
        self.config.gravity = gravity;
    }

    /// Gets the current gravity
    pub fn get_gravity(&self) -> GravityType {
        self.config.gravity
    }

    /// Returns the current simulation time in seconds
    pub fn get_time(&self) -> f64 {
        self.clock.time()
    }

    /// Number of ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.clock.ticks()
    }

    /// Current run state
    pub fn state(&self) -> SimulationState {
        self.clock.state()
    }

    /// Freezes the simulation
    pub fn stop(&mut self) {
        self.clock.stop();
        self.telemetry.emit(CATEGORY_SIMULATION, || "stopped".to_string());
    }

    /// Resumes continuous ticking
    pub fn resume(&mut self) {
        self.clock.resume();
        self.telemetry.emit(CATEGORY_SIMULATION, || "resumed".to_string());
    }

    /// Runs exactly one tick on the next [`advance`](Self::advance), then stops
    pub fn step_once(&mut self) {
        self.clock.step_once();
    }

    /// Returns a reference to the event queue
    pub fn get_events(&self) -> &EventQueue {
        &self.events
    }

    /// Returns a mutable reference to the event queue
    pub fn get_events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Removes and returns the pending collision events.
    ///
    /// The queue only holds the contacts of the most recent tick; each tick
    /// starts from an empty collision queue.
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        self.events.drain_collision_events()
    }

    /// The collision manager
    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    /// Mutable access to the collision manager
    pub fn collisions_mut(&mut self) -> &mut CollisionManager {
        &mut self.collisions
    }

    /// Returns the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Every body in registration order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    /// Gets a body by its handle
    pub fn get_body(&self, handle: BodyHandle) -> Result<&Body> {
        self.bodies.get_body(handle)
    }

    /// Gets a mutable body by its handle
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body> {
        self.bodies.get_body_mut(handle)
    }

    /// Gets a particle aggregate by its handle
    pub fn particle_body(&self, handle: BodyHandle) -> Result<&ParticleBody> {
        self.bodies
            .get_body(handle)?
            .as_particles()
            .ok_or_else(|| wrong_kind(handle, "particle body"))
    }

    /// Gets a mutable particle aggregate by its handle
    pub fn particle_body_mut(&mut self, handle: BodyHandle) -> Result<&mut ParticleBody> {
        self.bodies
            .get_body_mut(handle)?
            .as_particles_mut()
            .ok_or_else(|| wrong_kind(handle, "particle body"))
    }

    /// Gets a rigid body by its handle
    pub fn rigid_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies
            .get_body(handle)?
            .as_rigid()
            .ok_or_else(|| wrong_kind(handle, "rigid body"))
    }

    /// Gets a mutable rigid body by its handle
    pub fn rigid_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies
            .get_body_mut(handle)?
            .as_rigid_mut()
            .ok_or_else(|| wrong_kind(handle, "rigid body"))
    }

    /// Builds a particle aggregate from authoring data and registers its colliders
    pub fn add_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle> {
        if let Some(collider) = &desc.collider {
            collider.validate()?;
        }
        let body = ParticleBody::from_desc(desc, self.config.default_bounds)?;
        let particle_count = body.particles().len();
        let handle = self.bodies.add(Body::Particles(body));

        let registered = self.register_colliders(handle, desc.collider, desc.particle_collider_radius, particle_count);
        let (collider, particle_colliders) = match registered {
            Ok(colliders) => colliders,
            Err(err) => {
                self.bodies.remove(handle);
                return Err(err);
            }
        };
        if let Some(Body::Particles(body)) = self.bodies.get_mut(handle) {
            body.collider = collider;
            body.particle_colliders = particle_colliders;
        }

        self.collisions.update_poses(&self.bodies);
        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Added,
            body: handle,
        });
        self.telemetry.emit(CATEGORY_BODIES, || {
            format!("added {:?} body {} with {} particles", desc.kind, handle.0, particle_count)
        });
        Ok(handle)
    }

    /// Registers a rigid body, optionally with a collider
    pub fn add_rigid_body(&mut self, body: RigidBody, collider: Option<ColliderDesc>) -> Result<BodyHandle> {
        if let Some(collider) = &collider {
            collider.validate()?;
        }
        let handle = self.bodies.add(Body::Rigid(body));
        match self.register_colliders(handle, collider, None, 1) {
            Ok((collider, _)) => {
                if let Some(Body::Rigid(body)) = self.bodies.get_mut(handle) {
                    body.collider = collider;
                }
            }
            Err(err) => {
                self.bodies.remove(handle);
                return Err(err);
            }
        }

        self.collisions.update_poses(&self.bodies);
        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Added,
            body: handle,
        });
        self.telemetry.emit(CATEGORY_BODIES, || format!("added rigid body {}", handle.0));
        Ok(handle)
    }

    /// Registers immovable world geometry
    pub fn add_static_collider(&mut self, desc: ColliderDesc, transform: &Transform) -> Result<ColliderHandle> {
        self.collisions.add_static_collider(desc, transform)
    }

    /// Removes a body together with its colliders
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<Body> {
        let body = self.bodies.get_body(handle)?;
        let mut colliders: Vec<ColliderHandle> = body.collider().into_iter().collect();
        if let Some(particles) = body.as_particles() {
            colliders.extend_from_slice(particles.particle_colliders());
        }
        for collider in colliders {
            self.collisions.remove_collider(collider)?;
        }

        let body = self
            .bodies
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))?;
        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Removed,
            body: handle,
        });
        Ok(body)
    }

    /// Moves one particle of an aggregate, e.g. while the host drags it
    pub fn set_particle_position(&mut self, body: BodyHandle, index: usize, position: Vector3) -> Result<()> {
        self.particle_body_mut(body)?.set_particle_position(index, position)?;
        self.refresh_poses();
        Ok(())
    }

    /// Feeds one host frame into the clock and runs the ticks that are due.
    ///
    /// Transforms, vertices and bones are written to `host` once afterwards
    /// if any tick ran. Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: f32, host: &mut dyn SimulationHost) -> u32 {
        let ticks = self.clock.advance(elapsed * self.config.time_scale);
        for _ in 0..ticks {
            self.simulate_tick();
        }
        if ticks > 0 {
            self.publish(host);
        }
        ticks
    }

    /// Runs one tick immediately, ignoring the clock state
    pub fn tick(&mut self, host: &mut dyn SimulationHost) {
        self.simulate_tick();
        self.publish(host);
    }

    /// Nearest single-particle collider hit by `ray`
    pub fn raycast_particles(&self, ray: &Ray) -> Option<ParticleHit> {
        let mut best: Option<ParticleHit> = None;
        for collider in self.collisions.colliders() {
            let (body, particle) = match collider.owner() {
                ColliderOwner::Particle { body, index } => (body, index),
                _ => continue,
            };
            let sphere = match collider.shape() {
                ColliderShape::Sphere(sphere) => sphere,
                ColliderShape::Box(_) => continue,
            };
            if let Some(distance) = sphere.raycast(ray) {
                if best.map_or(true, |hit| distance < hit.distance) {
                    best = Some(ParticleHit {
                        body,
                        particle,
                        distance,
                        point: ray.point_at(distance),
                    });
                }
            }
        }
        best
    }

    /// Clears the world of all bodies and colliders
    pub fn clear(&mut self) -> Result<()> {
        self.bodies.clear();
        self.collisions = CollisionManager::new(self.config.octree, self.telemetry.clone())?;
        self.events.clear();
        Ok(())
    }

    fn register_colliders(
        &mut self,
        handle: BodyHandle,
        collider: Option<ColliderDesc>,
        particle_radius: Option<f32>,
        particle_count: usize,
    ) -> Result<(Option<ColliderHandle>, Vec<ColliderHandle>)> {
        let mut added = Vec::new();
        let result = self.try_register_colliders(handle, collider, particle_radius, particle_count, &mut added);
        if result.is_err() {
            for id in added {
                let _ = self.collisions.remove_collider(id);
            }
        }
        result
    }

    fn try_register_colliders(
        &mut self,
        handle: BodyHandle,
        collider: Option<ColliderDesc>,
        particle_radius: Option<f32>,
        particle_count: usize,
        added: &mut Vec<ColliderHandle>,
    ) -> Result<(Option<ColliderHandle>, Vec<ColliderHandle>)> {
        let body_collider = match collider {
            Some(desc) => {
                let id = self.collisions.add_collider(ColliderOwner::Body(handle), desc)?;
                added.push(id);
                Some(id)
            }
            None => None,
        };

        let mut particle_colliders = Vec::new();
        if let Some(radius) = particle_radius {
            for index in 0..particle_count {
                let owner = ColliderOwner::Particle { body: handle, index };
                let id = self.collisions.add_collider(owner, ColliderDesc::sphere(radius))?;
                added.push(id);
                particle_colliders.push(id);
            }
        }
        Ok((body_collider, particle_colliders))
    }

    /// Integrate, then alternate collision passes with constraint relaxation
    fn simulate_tick(&mut self) {
        self.events.clear_collision_events();
        let dt = self.config.tick_period;
        let gravity = self.config.gravity;

        for (_, body) in self.bodies.iter_mut() {
            match body {
                Body::Rigid(rigid) => rigid.integrate(&self.euler, &gravity, dt),
                Body::Particles(particles) => particles.integrate(&self.verlet, &gravity, dt),
            }
        }

        let mut contacts = 0;
        for _ in 0..self.config.constraint_iterations {
            self.refresh_poses();
            contacts += self.collisions.detect_and_resolve(&mut self.bodies, &mut self.events);
            for (_, body) in self.bodies.iter_mut() {
                if let Body::Particles(particles) = body {
                    particles.relax_constraints();
                }
            }
        }
        self.refresh_poses();

        self.clock.record_tick();
        let tick = self.clock.ticks();
        self.telemetry.emit(CATEGORY_SIMULATION, || {
            format!("tick {} resolved {} contacts", tick, contacts)
        });
    }

    fn refresh_poses(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            if let Body::Particles(particles) = body {
                particles.update_transform();
            }
        }
        self.collisions.update_poses(&self.bodies);
    }

    fn publish(&self, host: &mut dyn SimulationHost) {
        for (handle, body) in self.bodies.iter() {
            host.write_transform(handle, &body.transform());
            if let Body::Particles(particles) = body {
                if let Some(vertices) = particles.mesh_vertices() {
                    host.write_vertices(handle, &vertices);
                }
                if !particles.bones().is_empty() {
                    let rotations: Vec<_> = particles
                        .bones()
                        .iter()
                        .map(|bone| (bone.name().to_string(), bone.rotation()))
                        .collect();
                    host.write_bones(handle, &rotations);
                }
            }
        }
    }
}

fn wrong_kind(handle: BodyHandle, expected: &str) -> PhysicsError {
    PhysicsError::InvalidParameter(format!("body {:?} is not a {}", handle, expected))
}
