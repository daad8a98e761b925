use std::collections::HashMap;

use approx::assert_relative_eq;
use verlet_physics::bodies::{
    BodyDesc, BoneDesc, ClothGrid, DistanceDesc, ParticleDesc, RigidBody, SoftStructure,
};
use verlet_physics::collision::{ColliderDesc, ContactKind};
use verlet_physics::core::{BodyEventType, NullHost, SimulationState};
use verlet_physics::error::PhysicsError;
use verlet_physics::math::{Quaternion, Ray, Rotation, Transform, Vector3};
use verlet_physics::spatial::OctreeConfig;
use verlet_physics::{BodyHandle, GravityType, PhysicsWorld, SimulationConfig, SimulationHost};

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct RecordingHost {
    transforms: HashMap<BodyHandle, Transform>,
    vertices: HashMap<BodyHandle, Vec<Vector3>>,
    bones: HashMap<BodyHandle, Vec<(String, Quaternion)>>,
    transform_writes: usize,
}

impl SimulationHost for RecordingHost {
    fn write_transform(&mut self, body: BodyHandle, transform: &Transform) {
        self.transforms.insert(body, *transform);
        self.transform_writes += 1;
    }

    fn write_vertices(&mut self, body: BodyHandle, vertices: &[Vector3]) {
        self.vertices.insert(body, vertices.to_vec());
    }

    fn write_bones(&mut self, body: BodyHandle, rotations: &[(String, Quaternion)]) {
        self.bones.insert(body, rotations.to_vec());
    }
}

fn weightless_world() -> PhysicsWorld {
    let config = SimulationConfig {
        gravity: GravityType::None,
        ..SimulationConfig::default()
    };
    PhysicsWorld::with_config(config).unwrap()
}

fn floor(world: &mut PhysicsWorld) {
    // Top face at y = 0
    world
        .add_static_collider(
            ColliderDesc::cuboid(Vector3::new(10.0, 1.0, 10.0)),
            &Transform::from_position(Vector3::new(0.0, -0.5, 0.0)),
        )
        .unwrap();
}

fn arm() -> BodyDesc {
    SoftStructure::new(vec![
        ParticleDesc::new(Vector3::new(0.0, 2.0, 0.0), 1.0),
        ParticleDesc::new(Vector3::new(1.0, 2.0, 0.0), 1.0),
    ])
    .link(DistanceDesc::new(0, 1))
    .bone(BoneDesc::new("forearm", 0, 1))
    .build()
    .unwrap()
}

#[test]
fn test_clock_states_through_the_world() {
    let mut world = PhysicsWorld::new().unwrap();
    let mut host = NullHost;

    assert_eq!(world.state(), SimulationState::Running);
    assert_eq!(world.advance(DT * 0.5, &mut host), 0);
    assert_eq!(world.advance(DT * 0.5, &mut host), 1);

    world.stop();
    assert_eq!(world.advance(1.0, &mut host), 0);
    assert_eq!(world.state(), SimulationState::Stopped);

    world.step_once();
    assert_eq!(world.state(), SimulationState::SingleStep);
    assert_eq!(world.advance(0.0, &mut host), 1);
    assert_eq!(world.state(), SimulationState::Stopped);
    assert_eq!(world.advance(DT, &mut host), 0);

    world.resume();
    assert_eq!(world.advance(DT, &mut host), 1);
    assert_eq!(world.tick_count(), 3);
    assert_relative_eq!(world.get_time(), 3.0 * DT as f64, epsilon = 1e-6);
}

#[test]
fn test_substeps_and_time_scale() {
    let config = SimulationConfig {
        max_substeps: 3,
        ..SimulationConfig::default()
    };
    let mut world = PhysicsWorld::with_config(config).unwrap();
    assert_eq!(world.advance(1.0, &mut NullHost), 3);
    // Leftover time beyond the substep budget is dropped
    assert_eq!(world.advance(DT * 0.5, &mut NullHost), 0);

    let frozen_time = SimulationConfig {
        time_scale: 0.0,
        ..SimulationConfig::default()
    };
    let mut world = PhysicsWorld::with_config(frozen_time).unwrap();
    assert_eq!(world.advance(1.0, &mut NullHost), 0);
}

#[test]
fn test_invalid_configs_are_rejected() {
    let zero_tick = SimulationConfig {
        tick_period: 0.0,
        ..SimulationConfig::default()
    };
    assert!(matches!(
        PhysicsWorld::with_config(zero_tick),
        Err(PhysicsError::InvalidParameter(_))
    ));

    let no_iterations = SimulationConfig {
        constraint_iterations: 0,
        ..SimulationConfig::default()
    };
    assert!(PhysicsWorld::with_config(no_iterations).is_err());

    let bad_octree = SimulationConfig {
        octree: Some(OctreeConfig {
            half_extent: -1.0,
            ..OctreeConfig::default()
        }),
        ..SimulationConfig::default()
    };
    assert!(PhysicsWorld::with_config(bad_octree).is_err());
}

#[test]
fn test_host_receives_transforms_vertices_and_bones() {
    let mut world = PhysicsWorld::new().unwrap();
    let cloth = world.add_body(&ClothGrid::square(2, 0.5).build().unwrap()).unwrap();
    let structure = world.add_body(&arm()).unwrap();
    let object = world.add_body(&BodyDesc::tetrahedron(1.0)).unwrap();

    let mut host = RecordingHost::default();
    assert_eq!(world.advance(DT, &mut host), 1);

    assert_eq!(host.transform_writes, 3);
    for handle in [cloth, structure, object] {
        assert!(host.transforms.contains_key(&handle));
    }

    assert_eq!(host.vertices.len(), 1);
    assert_eq!(host.vertices[&cloth].len(), 9);
    assert_eq!(host.vertices[&cloth], world.particle_body(cloth).unwrap().mesh_vertices().unwrap());

    assert_eq!(host.bones.len(), 1);
    let bones = &host.bones[&structure];
    assert_eq!(bones.len(), 1);
    assert_eq!(bones[0].0, "forearm");

    // No tick, no writes
    world.stop();
    let mut idle = RecordingHost::default();
    assert_eq!(world.advance(1.0, &mut idle), 0);
    assert_eq!(idle.transform_writes, 0);
}

#[test]
fn test_overlapping_rigid_spheres_are_pushed_apart() {
    let mut world = weightless_world();
    let a = world
        .add_rigid_body(RigidBody::new_dynamic(Vector3::ZERO, 1.0).unwrap(), Some(ColliderDesc::sphere(1.0)))
        .unwrap();
    let b = world
        .add_rigid_body(
            RigidBody::new_dynamic(Vector3::new(1.5, 0.0, 0.0), 1.0).unwrap(),
            Some(ColliderDesc::sphere(1.0)),
        )
        .unwrap();

    world.tick(&mut NullHost);

    let pa = world.rigid_body(a).unwrap().position();
    let pb = world.rigid_body(b).unwrap().position();
    assert!(pa.distance(&pb) >= 2.0 - 1e-4, "still overlapping: {}", pa.distance(&pb));
    // Equal masses share the correction, so the midpoint stays put
    assert_relative_eq!((pa + pb) * 0.5, Vector3::new(0.75, 0.0, 0.0), epsilon = 1e-4);

    let events = world.drain_collision_events();
    assert!(!events.is_empty());
    assert_eq!(events[0].kind, ContactKind::SphereSphere);
    assert_relative_eq!(events[0].depth, 0.5, epsilon = 1e-5);
    assert!(world.drain_collision_events().is_empty());
}

#[test]
fn test_kinematic_bodies_do_not_yield() {
    let mut world = weightless_world();
    let wall = world
        .add_rigid_body(RigidBody::new_kinematic(Vector3::ZERO), Some(ColliderDesc::sphere(1.0)))
        .unwrap();
    let ball = world
        .add_rigid_body(
            RigidBody::new_dynamic(Vector3::new(1.5, 0.0, 0.0), 1.0).unwrap(),
            Some(ColliderDesc::sphere(1.0)),
        )
        .unwrap();

    world.tick(&mut NullHost);

    assert_eq!(world.rigid_body(wall).unwrap().position(), Vector3::ZERO);
    assert_relative_eq!(world.rigid_body(ball).unwrap().position().x, 2.0, epsilon = 1e-4);
}

#[test]
fn test_rigid_sphere_comes_to_rest_on_static_box() {
    let mut world = PhysicsWorld::new().unwrap();
    floor(&mut world);
    let ball = world
        .add_rigid_body(
            RigidBody::new_dynamic(Vector3::new(0.0, 2.0, 0.0), 1.0).unwrap(),
            Some(ColliderDesc::sphere(0.5)),
        )
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..120 {
        world.tick(&mut NullHost);
        events.extend(world.drain_collision_events());
    }

    let body = world.rigid_body(ball).unwrap();
    assert!(
        (body.position().y - 0.5).abs() < 0.05,
        "ball settled at {}",
        body.position().y
    );
    assert!(body.linear_velocity().y.abs() < 0.5);

    assert!(!events.is_empty());
    let event = events[0];
    assert_eq!(event.kind, ContactKind::SphereBox);
    assert!(event.body_a.is_none() || event.body_b.is_none());
    assert!(event.body_a == Some(ball) || event.body_b == Some(ball));
}

#[test]
fn test_undrained_collision_events_hold_one_tick() {
    let mut world = PhysicsWorld::new().unwrap();
    floor(&mut world);
    world
        .add_rigid_body(
            RigidBody::new_dynamic(Vector3::new(0.0, 0.5, 0.0), 1.0).unwrap(),
            Some(ColliderDesc::sphere(0.5)),
        )
        .unwrap();
    let per_tick = world.get_config().constraint_iterations as usize;

    for _ in 0..600 {
        world.tick(&mut NullHost);
        let pending = world.get_events().collision_events_of_kind(ContactKind::SphereBox).len();
        assert!(pending <= per_tick, "{} events pending", pending);
    }

    let events = world.drain_collision_events();
    assert!(!events.is_empty());
    assert!(events.len() <= per_tick);
}

#[test]
fn test_particle_object_lands_on_static_box() {
    let mut world = PhysicsWorld::new().unwrap();
    floor(&mut world);
    let desc = BodyDesc::tetrahedron(1.0)
        .with_transform(Transform::from_position(Vector3::new(0.0, 1.5, 0.0)))
        .with_collider(ColliderDesc::sphere(0.5));
    let handle = world.add_body(&desc).unwrap();

    for _ in 0..120 {
        world.tick(&mut NullHost);
    }

    let body = world.particle_body(handle).unwrap();
    // Without the floor the world bounds would stop it at y = -5
    assert!(body.transform().position.y > 0.0, "fell through to {}", body.transform().position.y);
    assert!(world.collisions().stats().contacts > 0);
    assert!(world
        .get_events()
        .collision_events_for_body(handle)
        .iter()
        .all(|e| e.kind == ContactKind::SphereBox));
}

#[test]
fn test_raycast_picks_the_nearest_particle() {
    let mut world = weightless_world();
    let handle = world.add_body(&arm()).unwrap();
    assert_eq!(world.particle_body(handle).unwrap().particle_colliders().len(), 2);

    let along = Ray::new(Vector3::new(-5.0, 2.0, 0.0), Vector3::unit_x());
    let hit = world.raycast_particles(&along).unwrap();
    assert_eq!(hit.body, handle);
    assert_eq!(hit.particle, 0);
    assert_relative_eq!(hit.distance, 4.7, epsilon = 1e-4);
    assert_relative_eq!(hit.point, Vector3::new(-0.3, 2.0, 0.0), epsilon = 1e-4);

    let down = Ray::new(Vector3::new(1.0, 10.0, 0.0), -Vector3::unit_y());
    assert_eq!(world.raycast_particles(&down).unwrap().particle, 1);

    let miss = Ray::new(Vector3::new(0.0, 10.0, 5.0), -Vector3::unit_y());
    assert!(world.raycast_particles(&miss).is_none());

    // Dragging a particle moves its collider with it
    world.set_particle_position(handle, 1, Vector3::new(3.0, 2.0, 0.0)).unwrap();
    let dragged = Ray::new(Vector3::new(3.0, 10.0, 0.0), -Vector3::unit_y());
    assert_eq!(world.raycast_particles(&dragged).unwrap().particle, 1);
    assert!(world.raycast_particles(&down).is_none());
}

#[test]
fn test_bones_follow_a_dragged_particle() {
    let mut world = weightless_world();
    let handle = world.add_body(&arm()).unwrap();
    {
        let body = world.particle_body_mut(handle).unwrap();
        body.set_frozen(true);
    }
    world.set_particle_position(handle, 1, Vector3::new(0.0, 3.0, 0.0)).unwrap();

    let mut host = RecordingHost::default();
    world.tick(&mut host);

    let (name, rotation) = &host.bones[&handle][0];
    assert_eq!(name, "forearm");
    assert_relative_eq!(rotation.rotate_vector(Vector3::unit_x()), Vector3::unit_y(), epsilon = 1e-5);
}

#[test]
fn test_remove_body_drops_its_colliders() {
    let mut world = weightless_world();
    floor(&mut world);
    let handle = world.add_body(&arm()).unwrap();
    assert_eq!(world.collisions().len(), 3);

    let added = world.get_events_mut().next_body_event().unwrap();
    assert_eq!(added.event_type, BodyEventType::Added);
    assert_eq!(added.body, handle);

    world.remove_body(handle).unwrap();
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.collisions().len(), 1);
    assert!(matches!(world.get_body(handle), Err(PhysicsError::ResourceNotFound(_))));
    assert!(world.remove_body(handle).is_err());

    let removed = world.get_events_mut().next_body_event().unwrap();
    assert_eq!(removed.event_type, BodyEventType::Removed);

    let ray = Ray::new(Vector3::new(-5.0, 2.0, 0.0), Vector3::unit_x());
    assert!(world.raycast_particles(&ray).is_none());
}

#[test]
fn test_rejected_bodies_leave_no_trace() {
    let mut world = PhysicsWorld::new().unwrap();
    let bad = BodyDesc::particle_object(
        vec![ParticleDesc::new(Vector3::ZERO, 1.0)],
        vec![DistanceDesc::new(0, 3)],
    );
    assert!(matches!(world.add_body(&bad), Err(PhysicsError::MalformedContent(_))));

    let bad_collider = BodyDesc::tetrahedron(1.0).with_collider(ColliderDesc::sphere(-1.0));
    assert!(world.add_body(&bad_collider).is_err());

    assert_eq!(world.body_count(), 0);
    assert!(world.collisions().is_empty());
}

#[test]
fn test_wrong_body_kind_lookups_fail() {
    let mut world = weightless_world();
    let rigid = world
        .add_rigid_body(RigidBody::new_dynamic(Vector3::ZERO, 1.0).unwrap(), None)
        .unwrap();
    assert!(world.rigid_body(rigid).is_ok());
    assert!(matches!(world.particle_body(rigid), Err(PhysicsError::InvalidParameter(_))));
}

#[test]
fn test_clear_resets_bodies_and_colliders() {
    let mut world = PhysicsWorld::new().unwrap();
    floor(&mut world);
    world.add_body(&arm()).unwrap();
    world.add_body(&BodyDesc::tetrahedron(1.0)).unwrap();
    world.tick(&mut NullHost);

    world.clear().unwrap();
    assert_eq!(world.body_count(), 0);
    assert!(world.collisions().is_empty());
    assert!(world.get_events().is_empty());

    // The world keeps working after a clear
    let handle = world.add_body(&BodyDesc::tetrahedron(1.0)).unwrap();
    world.tick(&mut NullHost);
    assert!(world.particle_body(handle).is_ok());
}
