//! Drops a cloth and a tetrahedron onto a static box and prints their state.
//!
//! Run with `RUST_LOG=verlet_physics=debug cargo run --example cloth_drop` to
//! see the simulation's debug records.

use verlet_physics::bodies::{BodyDesc, ClothGrid};
use verlet_physics::collision::ColliderDesc;
use verlet_physics::core::{BodyHandle, SimulationHost, Telemetry};
use verlet_physics::math::{Quaternion, Transform, Vector3};
use verlet_physics::{PhysicsWorld, SimulationConfig};

/// Prints what the simulation hands back to the host
struct ConsoleHost {
    frame: u32,
}

impl SimulationHost for ConsoleHost {
    fn write_transform(&mut self, body: BodyHandle, transform: &Transform) {
        if self.frame % 30 == 0 {
            let p = transform.position;
            println!("  body {}: center=({:.2}, {:.2}, {:.2})", body.id(), p.x, p.y, p.z);
        }
    }

    fn write_vertices(&mut self, body: BodyHandle, vertices: &[Vector3]) {
        if self.frame % 30 == 0 {
            let lowest = vertices.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
            println!("  body {}: {} vertices, lowest y={:.2}", body.id(), vertices.len(), lowest);
        }
    }
}

fn main() {
    env_logger::init();

    let mut world = match PhysicsWorld::with_telemetry(SimulationConfig::default(), Telemetry::log()) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("could not create world: {}", err);
            return;
        }
    };

    // A table top at y = 0
    world
        .add_static_collider(
            ColliderDesc::cuboid(Vector3::new(4.0, 1.0, 4.0)),
            &Transform::from_position(Vector3::new(0.0, -0.5, 0.0)),
        )
        .expect("valid table");

    // Cloth hanging from its top corners, tilted toward the table
    let cloth = ClothGrid::square(8, 0.25)
        .build()
        .expect("valid cloth")
        .with_transform(Transform::from_position_rotation(
            Vector3::new(0.0, 3.0, 0.0),
            Quaternion::from_axis_angle(Vector3::unit_x(), 0.4),
        ));
    world.add_body(&cloth).expect("cloth added");

    let tetrahedron = BodyDesc::tetrahedron(0.8)
        .with_transform(Transform::from_position(Vector3::new(1.0, 2.0, 0.5)))
        .with_collider(ColliderDesc::sphere(0.4));
    let falling = world.add_body(&tetrahedron).expect("tetrahedron added");

    let mut host = ConsoleHost { frame: 0 };
    let frame_time = 1.0 / 60.0;
    while world.get_time() < 4.0 {
        if world.advance(frame_time, &mut host) > 0 && host.frame % 30 == 0 {
            println!("t={:.2}s", world.get_time());
        }
        host.frame += 1;
    }

    let stats = world.collisions().stats();
    println!(
        "done: {} ticks, {} contacts, {} cache hits, {} full sweeps",
        world.tick_count(),
        stats.contacts,
        stats.cache_hits,
        stats.full_sweeps
    );
    if let Ok(body) = world.particle_body(falling) {
        println!("tetrahedron rests at y={:.2}", body.transform().position.y);
    }
    for event in world.drain_collision_events().iter().take(3) {
        println!("{:?} contact, depth {:.3}", event.kind, event.depth);
    }
}
