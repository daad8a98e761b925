use approx::assert_relative_eq;
use verlet_physics::bodies::{
    BodyDesc, BodyKind, BodyType, BoneDesc, BoundsDesc, ClothGrid, DistanceDesc, MeshSpace, ParticleBody,
    ParticleDesc, PointDesc, RigidBody, SoftBodyMesh, SoftStructure,
};
use verlet_physics::constraints::{Constraint, ParticleConstraint};
use verlet_physics::core::GravityType;
use verlet_physics::error::PhysicsError;
use verlet_physics::integration::{SymplecticEulerIntegrator, VerletIntegrator};
use verlet_physics::math::{Aabb, Quaternion, Rotation, Transform, Vector3};

const DT: f32 = 1.0 / 60.0;

fn cloth_formula(x: usize, y: usize) -> usize {
    x * y * 2 + y * (x + 1) * 2 + (y - 1) * (x + 1) * 2
}

#[test]
fn test_cloth_grid_generation() {
    let grid = ClothGrid::square(3, 0.5);
    assert_eq!(grid.particle_count(), 16);
    assert_eq!(grid.constraint_count(), cloth_formula(3, 3));
    assert_eq!(grid.constraint_count(), 58);

    let desc = grid.build().unwrap();
    assert_eq!(desc.kind, BodyKind::Cloth);
    assert_eq!(desc.particles.len(), 16);
    assert_eq!(desc.distance_constraints.len(), 58);

    // Generation is deterministic
    assert_eq!(grid.build().unwrap(), desc);

    let body = ParticleBody::from_desc(&desc, None).unwrap();
    assert_eq!(body.constraints().len(), 58);
    for index in grid.pinned_indices() {
        assert!(body.particles()[index].is_pinned());
    }
    assert_eq!(body.particles().iter().filter(|p| p.is_pinned()).count(), 2);
}

#[test]
fn test_cloth_link_stiffness_by_family() {
    let grid = ClothGrid::square(2, 1.0);
    let links = grid.links();
    let count = |k: f32| links.iter().filter(|l| (l.stiffness - k).abs() < 1e-6).count();
    // Shear, structural, bend for a 2x2 grid
    assert_eq!(count(grid.shear_stiffness), 8);
    assert_eq!(count(grid.structural_stiffness), 12);
    assert_eq!(count(grid.bend_stiffness), 6);
}

#[test]
fn test_cloth_rejects_empty_grids() {
    assert!(ClothGrid::new(0, 3, 1.0).build().is_err());
    assert!(ClothGrid::new(3, 3, 0.0).build().is_err());
}

#[test]
fn test_tetrahedron_particle_object() {
    let desc = BodyDesc::tetrahedron(1.0)
        .with_transform(Transform::from_position(Vector3::new(0.0, 2.0, 0.0)));
    let bounds = Aabb::from_half_extents(Vector3::new(10.0, 5.0, 10.0));
    let body = ParticleBody::from_desc(&desc, Some(bounds)).unwrap();

    assert_eq!(body.particles().len(), 4);
    // Six links plus the world bound
    assert_eq!(body.constraints().len(), 7);
    for constraint in body.constraints() {
        if let ParticleConstraint::Distance(link) = constraint {
            assert_relative_eq!(link.rest_length(), 1.0, epsilon = 1e-5);
        }
    }
    assert!(matches!(body.constraints()[6], ParticleConstraint::Bound(_)));
    assert_relative_eq!(body.transform().position, Vector3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    assert!(body.mesh_vertices().is_none());
}

#[test]
fn test_orientation_follows_the_particle_frame() {
    let desc = BodyDesc::tetrahedron(1.0).with_bounds(BoundsDesc::None);
    let mut body = ParticleBody::from_desc(&desc, None).unwrap();
    assert_relative_eq!(
        body.transform().rotation.rotate_vector(Vector3::unit_x()),
        Vector3::unit_x(),
        epsilon = 1e-5
    );

    let turn = Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0), 0.7);
    let center = body.center_of_mass();
    for particle in body.particles_mut() {
        particle.set_position(center + turn.rotate_vector(particle.position - center));
    }
    body.update_transform();

    for v in [Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()] {
        assert_relative_eq!(
            body.transform().rotation.rotate_vector(v),
            turn.rotate_vector(v),
            epsilon = 1e-4
        );
    }
}

#[test]
fn test_soft_body_from_mesh() {
    let mut vertices = Vec::new();
    for x in [-0.5, 0.5] {
        for y in [-0.5, 0.5] {
            for z in [-0.5, 0.5] {
                vertices.push(Vector3::new(x, y, z));
            }
        }
    }
    let mesh = SoftBodyMesh::new(vertices.clone());
    assert_eq!(mesh.constraint_count(), 28);

    let desc = mesh
        .build()
        .unwrap()
        .with_transform(Transform::from_position(Vector3::new(1.0, 2.0, 3.0)));
    let body = ParticleBody::from_desc(&desc, Some(Aabb::from_half_extents(Vector3::splat(10.0)))).unwrap();
    assert_eq!(body.constraints().len(), 29);

    // Soft bodies report vertices relative to their derived transform
    let local = body.mesh_vertices().unwrap();
    for (reported, authored) in local.iter().zip(&vertices) {
        assert_relative_eq!(*reported, *authored, epsilon = 1e-4);
    }
}

#[test]
fn test_cloth_reports_world_vertices() {
    let desc = ClothGrid::square(1, 1.0)
        .build()
        .unwrap()
        .with_transform(Transform::from_position(Vector3::new(0.0, 4.0, 0.0)));
    let body = ParticleBody::from_desc(&desc, None).unwrap();
    let vertices = body.mesh_vertices().unwrap();
    assert_eq!(vertices.len(), 4);
    for (vertex, particle) in vertices.iter().zip(body.particles()) {
        assert_eq!(*vertex, particle.position);
        assert!(vertex.y >= 2.5);
    }
}

#[test]
fn test_out_of_range_links_are_malformed() {
    let particles = vec![
        ParticleDesc::new(Vector3::ZERO, 1.0),
        ParticleDesc::new(Vector3::unit_x(), 1.0),
    ];
    let desc = BodyDesc::particle_object(particles.clone(), vec![DistanceDesc::new(0, 5)]);
    assert!(matches!(
        ParticleBody::from_desc(&desc, None),
        Err(PhysicsError::MalformedContent(_))
    ));

    let self_link = BodyDesc::particle_object(particles.clone(), vec![DistanceDesc::new(1, 1)]);
    assert!(matches!(
        ParticleBody::from_desc(&self_link, None),
        Err(PhysicsError::MalformedContent(_))
    ));

    let anchor = BodyDesc::particle_object(particles.clone(), Vec::new())
        .with_point_constraint(PointDesc::new(2, Vector3::ZERO, 1.0, 0.0));
    assert!(matches!(
        ParticleBody::from_desc(&anchor, None),
        Err(PhysicsError::MalformedContent(_))
    ));

    let bone = BodyDesc::particle_object(particles, Vec::new()).with_bone(BoneDesc::new("arm", 0, 9));
    assert!(matches!(
        ParticleBody::from_desc(&bone, None),
        Err(PhysicsError::MalformedContent(_))
    ));
}

#[test]
fn test_invalid_authoring_values_are_rejected() {
    let empty = BodyDesc::new(BodyKind::ParticleObject);
    assert!(matches!(
        ParticleBody::from_desc(&empty, None),
        Err(PhysicsError::InvalidParameter(_))
    ));

    let negative = BodyDesc::particle_object(vec![ParticleDesc::new(Vector3::ZERO, -1.0)], Vec::new());
    assert!(ParticleBody::from_desc(&negative, None).is_err());

    let bad_rest = BodyDesc::particle_object(
        vec![ParticleDesc::new(Vector3::ZERO, 1.0), ParticleDesc::new(Vector3::unit_x(), 1.0)],
        vec![DistanceDesc::new(0, 1).with_rest_length(-3.0)],
    );
    assert!(matches!(
        ParticleBody::from_desc(&bad_rest, None),
        Err(PhysicsError::InvalidParameter(_))
    ));
}

#[test]
fn test_added_constraints_are_validated() {
    let desc = BodyDesc::tetrahedron(1.0);
    let mut body = ParticleBody::from_desc(&desc, None).unwrap();
    let before = body.constraints().len();
    assert!(body
        .add_constraint(verlet_physics::constraints::DistanceConstraint::rigid(0, 4))
        .is_err());
    assert!(body
        .add_constraint(verlet_physics::constraints::DistanceConstraint::rigid(0, 3))
        .is_ok());
    assert_eq!(body.constraints().len(), before + 1);
    assert_eq!(body.constraints()[before].particle_indices(), vec![0, 3]);
}

#[test]
fn test_gravity_and_skip_next_integration() {
    let desc = BodyDesc::tetrahedron(1.0);
    let mut body = ParticleBody::from_desc(&desc, None).unwrap();
    let verlet = VerletIntegrator::new();
    let gravity = GravityType::default();
    let start = body.center_of_mass();

    body.skip_next_integration();
    body.integrate(&verlet, &gravity, DT);
    assert_eq!(body.center_of_mass(), start);

    body.integrate(&verlet, &gravity, DT);
    assert!(body.center_of_mass().y < start.y);

    body.set_use_gravity(false);
    let before = body.center_of_mass();
    let drift = body.particles()[0].displacement();
    body.integrate(&verlet, &gravity, DT);
    // Without gravity the body keeps drifting at its last per-tick velocity
    assert_relative_eq!(body.center_of_mass() - before, drift, epsilon = 1e-6);
}

#[test]
fn test_kinematic_and_frozen_bodies_hold_still() {
    let verlet = VerletIntegrator::new();
    let gravity = GravityType::default();

    let desc = BodyDesc::tetrahedron(1.0).with_body_type(BodyType::Kinematic);
    let mut kinematic = ParticleBody::from_desc(&desc, None).unwrap();
    let start = kinematic.center_of_mass();
    kinematic.integrate(&verlet, &gravity, DT);
    assert_eq!(kinematic.center_of_mass(), start);
    assert_eq!(kinematic.inverse_mass(), 0.0);

    let mut frozen = ParticleBody::from_desc(&BodyDesc::tetrahedron(1.0), None).unwrap();
    frozen.set_frozen(true);
    let start = frozen.center_of_mass();
    frozen.integrate(&verlet, &gravity, DT);
    frozen.relax_constraints();
    assert_eq!(frozen.center_of_mass(), start);
    assert!(!frozen.is_movable());

    frozen.set_frozen(false);
    assert!(frozen.is_movable());
    assert_relative_eq!(frozen.inverse_mass(), 0.25);
}

#[test]
fn test_point_gravity_pulls_toward_the_source() {
    let source = Vector3::new(0.0, 10.0, 0.0);
    let gravity = GravityType::Point { position: source, strength: 100.0 };
    let pull = gravity.acceleration_at(Vector3::ZERO);
    assert_relative_eq!(pull, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    assert_eq!(gravity.acceleration_at(source), Vector3::ZERO);
}

#[test]
fn test_soft_structure_bones_follow_their_particles() {
    let structure = SoftStructure::new(vec![
        ParticleDesc::pinned(Vector3::ZERO),
        ParticleDesc::new(Vector3::unit_x(), 1.0),
    ])
    .link(DistanceDesc::new(0, 1))
    .anchor(PointDesc::new(1, Vector3::unit_x(), 0.5, 0.0))
    .bone(BoneDesc::new("arm", 0, 1));
    let desc = structure.build().unwrap();
    assert_eq!(desc.kind, BodyKind::SoftStructure);
    assert_eq!(desc.particle_collider_radius, Some(0.3));

    let mut body = ParticleBody::from_desc(&desc, None).unwrap();
    assert_eq!(body.bones().len(), 1);
    assert_eq!(body.bones()[0].name(), "arm");

    body.set_particle_position(1, Vector3::unit_y()).unwrap();
    body.update_transform();
    let rotation = body.bones()[0].rotation();
    assert_relative_eq!(rotation.rotate_vector(Vector3::unit_x()), Vector3::unit_y(), epsilon = 1e-5);

    assert!(matches!(
        body.set_particle_position(5, Vector3::ZERO),
        Err(PhysicsError::ResourceNotFound(_))
    ));
}

#[test]
fn test_mesh_space_override() {
    let desc = ClothGrid::square(1, 1.0).build().unwrap();
    let mut body = ParticleBody::from_desc(&desc, None).unwrap();
    body.set_mesh_space(MeshSpace::None);
    assert!(body.mesh_vertices().is_none());
}

#[test]
fn test_rigid_body_integration() {
    assert!(RigidBody::new_dynamic(Vector3::ZERO, 0.0).is_err());

    let euler = SymplecticEulerIntegrator::new();
    let gravity = GravityType::default();
    let mut body = RigidBody::new_dynamic(Vector3::new(0.0, 10.0, 0.0), 2.0).unwrap();
    body.apply_force(Vector3::new(4.0, 0.0, 0.0));
    body.integrate(&euler, &gravity, 0.5);

    // v = (F / m + g) * dt, x += v * dt
    assert_relative_eq!(body.linear_velocity(), Vector3::new(1.0, -4.905, 0.0), epsilon = 1e-5);
    assert_relative_eq!(body.position(), Vector3::new(0.5, 7.5475, 0.0), epsilon = 1e-4);

    // Forces do not carry over
    body.integrate(&euler, &GravityType::None, 0.5);
    assert_relative_eq!(body.linear_velocity(), Vector3::new(1.0, -4.905, 0.0), epsilon = 1e-5);

    let mut kinematic = RigidBody::new_kinematic(Vector3::ZERO);
    kinematic.integrate(&euler, &gravity, 0.5);
    assert_eq!(kinematic.position(), Vector3::ZERO);
    assert_eq!(kinematic.inverse_mass(), 0.0);
}
