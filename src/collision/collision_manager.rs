//! Collider registry and the detect-then-resolve pass run every iteration.
//!
//! Body-level colliders are pruned by the broad phase and tested pairwise in
//! collider-id order (registration order). Single-particle colliders are then
//! tested against every body-level collider of another body. Box pairs go
//! through the separating-axis cache before any full sweep.

use crate::bodies::Body;
use crate::collision::collider::{Collider, ColliderDesc, ColliderHandle, ColliderOwner, ColliderShape};
use crate::collision::contact_manifold::{find_collision_features, CollisionManifold};
use crate::collision::narrow_phase::{self, Contact};
use crate::collision::resolution::{resolve_contact, ContactSide};
use crate::collision::sat::{self, SatResult};
use crate::collision::{
    BroadPhase, BruteForceBroadPhase, CollisionPair, OctreeBroadPhase, SeparatingAxisCache,
};
use crate::core::events::{CollisionEvent, EventQueue};
use crate::core::storage::{BodyStorage, Storage};
use crate::core::telemetry::{Telemetry, CATEGORY_COLLISION};
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::math::{Transform, Vector3};
use crate::shapes::{OrientedBox, Sphere};
use crate::spatial::OctreeConfig;
use crate::Result;

/// Which narrow-phase routine produced a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    SphereSphere,
    SphereBox,
    BoxBox,
}

impl ContactKind {
    fn of(a: &ColliderShape, b: &ColliderShape) -> Self {
        match (a, b) {
            (ColliderShape::Sphere(_), ColliderShape::Sphere(_)) => ContactKind::SphereSphere,
            (ColliderShape::Box(_), ColliderShape::Box(_)) => ContactKind::BoxBox,
            _ => ContactKind::SphereBox,
        }
    }
}

/// Running counters of the collision pipeline
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollisionStats {
    /// Pairs that reached the narrow phase
    pub pairs_tested: u64,

    /// Full 15-axis SAT sweeps
    pub full_sweeps: u64,

    /// Box pairs rejected by their cached axis alone
    pub cache_hits: u64,

    /// Cached axes that stopped separating their pair
    pub cache_evictions: u64,

    /// Contacts that displaced at least one particle
    pub contacts: u64,
}

/// Owns every collider, the axis cache and the broad phase
pub struct CollisionManager {
    colliders: Vec<Option<Collider>>,
    cache: SeparatingAxisCache,
    broad_phase: Box<dyn BroadPhase>,
    stats: CollisionStats,
    telemetry: Telemetry,
}

impl std::fmt::Debug for CollisionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionManager")
            .field("colliders", &self.len())
            .field("cached_axes", &self.cache.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl CollisionManager {
    /// Creates a manager; `octree: None` falls back to brute-force AABB pruning
    pub fn new(octree: Option<OctreeConfig>, telemetry: Telemetry) -> Result<Self> {
        let broad_phase: Box<dyn BroadPhase> = match octree {
            Some(config) => Box::new(OctreeBroadPhase::new(config, telemetry.clone())?),
            None => Box::new(BruteForceBroadPhase::new()),
        };
        Ok(Self {
            colliders: Vec::new(),
            cache: SeparatingAxisCache::new(),
            broad_phase,
            stats: CollisionStats::default(),
            telemetry,
        })
    }

    /// Registers a collider. Its pose is computed on the next [`update_poses`](Self::update_poses).
    pub fn add_collider(&mut self, owner: ColliderOwner, desc: ColliderDesc) -> Result<ColliderHandle> {
        desc.validate()?;
        let id = u32::try_from(self.colliders.len())
            .map_err(|_| PhysicsError::SimulationError("collider id space exhausted".to_string()))?;
        let handle = ColliderHandle(id);
        let collider = Collider::new(handle, owner, desc);
        if !collider.is_particle_collider() {
            self.broad_phase.insert(handle, &collider.bounding_box());
        }
        self.colliders.push(Some(collider));
        Ok(handle)
    }

    /// Registers immovable world geometry posed once at `transform`
    pub fn add_static_collider(&mut self, desc: ColliderDesc, transform: &Transform) -> Result<ColliderHandle> {
        let handle = self.add_collider(ColliderOwner::Static, desc)?;
        self.set_pose(handle, transform)?;
        Ok(handle)
    }

    /// Unregisters a collider and forgets every cached axis involving it
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Result<Collider> {
        let collider = self
            .colliders
            .get_mut(handle.0 as usize)
            .and_then(Option::take)
            .ok_or_else(|| not_found(handle))?;
        let others: Vec<ColliderHandle> = self.colliders.iter().flatten().map(|c| c.handle()).collect();
        self.cache
            .evict_pairs(others.into_iter().map(|other| CollisionPair::new(handle, other)));
        if !collider.is_particle_collider() {
            self.broad_phase.remove(handle);
        }
        Ok(collider)
    }

    /// Looks up a collider
    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle.0 as usize).and_then(Option::as_ref)
    }

    /// Every live collider in id order
    pub fn colliders(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter().flatten()
    }

    /// Number of live colliders
    pub fn len(&self) -> usize {
        self.colliders.iter().flatten().count()
    }

    /// Returns true if no colliders are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters accumulated since creation or the last reset
    pub fn stats(&self) -> CollisionStats {
        self.stats
    }

    /// Zeroes the counters
    pub fn reset_stats(&mut self) {
        self.stats = CollisionStats::default();
    }

    /// The separating-axis cache
    pub fn axis_cache(&self) -> &SeparatingAxisCache {
        &self.cache
    }

    /// Body-level pairs the broad phase currently reports
    pub fn candidate_pairs(&self) -> Vec<CollisionPair> {
        self.broad_phase.candidate_pairs()
    }

    /// Poses a collider directly from a transform, bypassing its owner
    pub fn set_pose(&mut self, handle: ColliderHandle, transform: &Transform) -> Result<()> {
        let collider = self
            .colliders
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| not_found(handle))?;
        collider.update_pose(transform, Vector3::ZERO);
        if !collider.is_particle_collider() {
            self.broad_phase.update(handle, &collider.bounding_box());
        }
        Ok(())
    }

    /// Recomputes every body-owned collider pose from the bodies
    pub fn update_poses(&mut self, bodies: &BodyStorage<Body>) {
        for slot in self.colliders.iter_mut() {
            let collider = match slot {
                Some(collider) => collider,
                None => continue,
            };
            if let Some(body) = collider.owner().body().and_then(|h| bodies.get(h)) {
                pose_from_body(collider, body, self.broad_phase.as_mut());
            }
        }
    }

    /// Fast box-box test: cached axis first, full sweep only when it fails
    pub fn are_obbs_colliding(&mut self, a: ColliderHandle, b: ColliderHandle) -> Result<bool> {
        let (box_a, box_b) = (self.box_shape(a)?, self.box_shape(b)?);
        self.stats.pairs_tested += 1;
        Ok(self.obbs_colliding(CollisionPair::new(a, b), &box_a, &box_b))
    }

    /// Full box-box manifold between two colliders
    pub fn find_collision_features(&mut self, a: ColliderHandle, b: ColliderHandle) -> Result<CollisionManifold> {
        let (box_a, box_b) = (self.box_shape(a)?, self.box_shape(b)?);
        Ok(find_collision_features(&box_a, &box_b))
    }

    /// Sphere-sphere overlap test
    pub fn are_spheres_colliding(&mut self, a: ColliderHandle, b: ColliderHandle) -> Result<bool> {
        let (sphere_a, sphere_b) = (self.sphere_shape(a)?, self.sphere_shape(b)?);
        self.stats.pairs_tested += 1;
        Ok(narrow_phase::sphere_sphere(&sphere_a, &sphere_b).is_some())
    }

    /// Contact between any two colliders at their current poses
    pub fn contact(&mut self, a: ColliderHandle, b: ColliderHandle) -> Result<Option<(ContactKind, Contact)>> {
        if self.collider(a).is_none() {
            return Err(not_found(a));
        }
        if self.collider(b).is_none() {
            return Err(not_found(b));
        }
        self.stats.pairs_tested += 1;
        Ok(self.contact_between(a, b))
    }

    /// One detection and resolution pass over all pairs.
    ///
    /// Each resolved contact pushes a [`CollisionEvent`] and refreshes the
    /// poses of the bodies it moved. Returns the number of resolved contacts.
    pub fn detect_and_resolve(&mut self, bodies: &mut BodyStorage<Body>, events: &mut EventQueue) -> usize {
        let mut resolved = 0;

        for pair in self.broad_phase.candidate_pairs() {
            if self.should_skip(pair.first, pair.second) {
                continue;
            }
            self.stats.pairs_tested += 1;
            if self.resolve_pair(pair.first, pair.second, bodies, events) {
                resolved += 1;
            }
        }

        let body_colliders: Vec<(ColliderHandle, ColliderOwner)> = self
            .colliders()
            .filter(|c| !c.is_particle_collider())
            .map(|c| (c.handle(), c.owner()))
            .collect();
        let particle_colliders: Vec<(ColliderHandle, ColliderOwner)> = self
            .colliders()
            .filter(|c| c.is_particle_collider())
            .map(|c| (c.handle(), c.owner()))
            .collect();

        for (body_collider, body_owner) in &body_colliders {
            for (particle_collider, particle_owner) in &particle_colliders {
                if body_owner.body().is_some() && body_owner.body() == particle_owner.body() {
                    continue;
                }
                let bounds_overlap = match (self.collider(*body_collider), self.collider(*particle_collider)) {
                    (Some(a), Some(b)) => a.bounds().intersects(&b.bounds()),
                    _ => false,
                };
                if !bounds_overlap {
                    continue;
                }
                self.stats.pairs_tested += 1;
                if self.resolve_pair(*body_collider, *particle_collider, bodies, events) {
                    resolved += 1;
                }
            }
        }

        resolved
    }

    fn should_skip(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        match (self.collider(a), self.collider(b)) {
            (Some(a), Some(b)) => match (a.owner().body(), b.owner().body()) {
                (None, None) => true,
                (Some(body_a), Some(body_b)) => body_a == body_b,
                _ => false,
            },
            _ => true,
        }
    }

    fn resolve_pair(
        &mut self,
        a: ColliderHandle,
        b: ColliderHandle,
        bodies: &mut BodyStorage<Body>,
        events: &mut EventQueue,
    ) -> bool {
        let (kind, contact) = match self.contact_between(a, b) {
            Some(found) => found,
            None => return false,
        };
        let (owner_a, owner_b) = match (self.collider(a), self.collider(b)) {
            (Some(ca), Some(cb)) => (ca.owner(), cb.owner()),
            _ => return false,
        };

        if !displace_owners(bodies, owner_a, owner_b, &contact) {
            return false;
        }

        for body in [owner_a.body(), owner_b.body()].into_iter().flatten() {
            self.refresh_body(bodies, body);
        }

        self.stats.contacts += 1;
        self.telemetry.emit(CATEGORY_COLLISION, || {
            format!(
                "{:?} contact between colliders {} and {}, depth {:.4}",
                kind, a.0, b.0, contact.depth
            )
        });
        events.add_collision_event(CollisionEvent {
            kind,
            collider_a: a,
            collider_b: b,
            body_a: owner_a.body(),
            body_b: owner_b.body(),
            normal: contact.normal,
            depth: contact.depth,
        });
        true
    }

    /// Narrow phase between two live colliders; box pairs go through the cache
    fn contact_between(&mut self, a: ColliderHandle, b: ColliderHandle) -> Option<(ContactKind, Contact)> {
        let shape_a = *self.collider(a)?.shape();
        let shape_b = *self.collider(b)?.shape();
        let kind = ContactKind::of(&shape_a, &shape_b);

        if let (ColliderShape::Box(box_a), ColliderShape::Box(box_b)) = (&shape_a, &shape_b) {
            if !self.obbs_colliding(CollisionPair::new(a, b), box_a, box_b) {
                return None;
            }
        }
        narrow_phase::contact_between(&shape_a, &shape_b).map(|contact| (kind, contact))
    }

    fn obbs_colliding(&mut self, pair: CollisionPair, a: &OrientedBox, b: &OrientedBox) -> bool {
        if let Some(axis) = self.cache.get(&pair) {
            if sat::separates(a, b, axis) {
                self.stats.cache_hits += 1;
                return false;
            }
            self.cache.evict(&pair);
            self.stats.cache_evictions += 1;
            self.telemetry.emit(CATEGORY_COLLISION, || {
                format!("evicted cached axis {} for pair ({}, {})", axis, pair.first.0, pair.second.0)
            });
        }

        self.stats.full_sweeps += 1;
        match sat::find_separating_axis(a, b) {
            SatResult::Separated { axis } => {
                self.cache.insert(&pair, axis);
                false
            }
            SatResult::Overlapping { .. } => true,
        }
    }

    /// Re-derives a moved body's transform and the poses of its colliders
    fn refresh_body(&mut self, bodies: &mut BodyStorage<Body>, handle: BodyHandle) {
        let body = match bodies.get_mut(handle) {
            Some(body) => body,
            None => return,
        };
        if let Some(particles) = body.as_particles_mut() {
            particles.update_transform();
        }
        let body: &Body = body;

        let mut owned: Vec<ColliderHandle> = body.collider().into_iter().collect();
        if let Some(particles) = body.as_particles() {
            owned.extend_from_slice(particles.particle_colliders());
        }
        for handle in owned {
            if let Some(collider) = self.colliders.get_mut(handle.0 as usize).and_then(Option::as_mut) {
                pose_from_body(collider, body, self.broad_phase.as_mut());
            }
        }
    }

    fn box_shape(&self, handle: ColliderHandle) -> Result<OrientedBox> {
        match self.collider(handle).map(Collider::shape) {
            Some(ColliderShape::Box(obb)) => Ok(*obb),
            Some(ColliderShape::Sphere(_)) => Err(PhysicsError::InvalidParameter(format!(
                "collider {} is not a box",
                handle.0
            ))),
            None => Err(not_found(handle)),
        }
    }

    fn sphere_shape(&self, handle: ColliderHandle) -> Result<Sphere> {
        match self.collider(handle).map(Collider::shape) {
            Some(ColliderShape::Sphere(sphere)) => Ok(*sphere),
            Some(ColliderShape::Box(_)) => Err(PhysicsError::InvalidParameter(format!(
                "collider {} is not a sphere",
                handle.0
            ))),
            None => Err(not_found(handle)),
        }
    }
}

fn not_found(handle: ColliderHandle) -> PhysicsError {
    PhysicsError::ResourceNotFound(format!("Collider with handle {:?} not found", handle))
}

fn pose_from_body(collider: &mut Collider, body: &Body, broad_phase: &mut dyn BroadPhase) {
    match collider.owner() {
        ColliderOwner::Static => {}
        ColliderOwner::Body(_) => {
            collider.update_pose(&body.transform(), Vector3::ZERO);
            broad_phase.update(collider.handle(), &collider.bounding_box());
        }
        ColliderOwner::Particle { index, .. } => {
            if let Some(particle) = body.particles().get(index) {
                collider.update_from_particle(particle.position, Vector3::ZERO);
            }
        }
    }
}

/// The particles a collider may push, with the weight its side carries
fn contact_side(body: &mut Body, owner: ColliderOwner) -> ContactSide<'_> {
    if !body.is_movable() {
        return ContactSide::fixed();
    }
    match owner {
        ColliderOwner::Particle { index, .. } => match body.particles_mut().get_mut(index) {
            Some(particle) if !particle.is_pinned() => {
                let inverse_mass = particle.inv_mass;
                ContactSide::movable(std::slice::from_mut(particle), inverse_mass)
            }
            _ => ContactSide::fixed(),
        },
        _ => {
            let inverse_mass = body.inverse_mass();
            ContactSide::movable(body.particles_mut(), inverse_mass)
        }
    }
}

fn displace_owners(
    bodies: &mut BodyStorage<Body>,
    owner_a: ColliderOwner,
    owner_b: ColliderOwner,
    contact: &Contact,
) -> bool {
    let moved = match (owner_a.body(), owner_b.body()) {
        (None, None) => false,
        (Some(a), None) => match bodies.get_mut(a) {
            Some(body) => resolve_contact(contact, contact_side(body, owner_a), ContactSide::fixed()),
            None => false,
        },
        (None, Some(b)) => match bodies.get_mut(b) {
            Some(body) => resolve_contact(contact, ContactSide::fixed(), contact_side(body, owner_b)),
            None => false,
        },
        (Some(a), Some(b)) => match bodies.get_pair_mut(a, b) {
            Some((body_a, body_b)) => {
                resolve_contact(contact, contact_side(body_a, owner_a), contact_side(body_b, owner_b))
            }
            None => false,
        },
    };

    if moved {
        // Rigid bodies carry a real velocity; stop it driving back into the contact
        if let Some(rigid) = owner_a.body().and_then(|h| bodies.get_mut(h)).and_then(Body::as_rigid_mut) {
            rigid.stop_approach(contact.normal);
        }
        if let Some(rigid) = owner_b.body().and_then(|h| bodies.get_mut(h)).and_then(Body::as_rigid_mut) {
            rigid.stop_approach(-contact.normal);
        }
    }
    moved
}
