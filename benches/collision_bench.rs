//! Benchmarks for the box collision path and a full cloth tick
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use verlet_physics::bodies::ClothGrid;
use verlet_physics::collision::sat::find_separating_axis;
use verlet_physics::collision::{find_collision_features, ColliderDesc, CollisionManager};
use verlet_physics::core::{NullHost, Telemetry};
use verlet_physics::math::{Quaternion, Transform, Vector3};
use verlet_physics::shapes::OrientedBox;
use verlet_physics::PhysicsWorld;

fn tilted_box(center: Vector3) -> OrientedBox {
    OrientedBox::new(center, Vector3::new(0.5, 0.75, 0.5), Quaternion::from_euler(0.3, 0.7, 0.1))
}

// ============================================================================
// Separating axis test and manifold
// ============================================================================

fn bench_sat(c: &mut Criterion) {
    let mut group = c.benchmark_group("sat");
    let a = tilted_box(Vector3::ZERO);
    let overlapping = tilted_box(Vector3::new(0.6, 0.4, 0.0));
    let separated = tilted_box(Vector3::new(3.0, 0.0, 0.0));

    group.bench_function("full_sweep_overlapping", |b| {
        b.iter(|| find_separating_axis(black_box(&a), black_box(&overlapping)));
    });

    group.bench_function("full_sweep_separated", |b| {
        b.iter(|| find_separating_axis(black_box(&a), black_box(&separated)));
    });

    group.bench_function("collision_features", |b| {
        b.iter(|| find_collision_features(black_box(&a), black_box(&overlapping)));
    });

    group.finish();
}

// ============================================================================
// Cached versus uncached box pairs
// ============================================================================

fn separated_pair(manager: &mut CollisionManager) -> (verlet_physics::ColliderHandle, verlet_physics::ColliderHandle) {
    let desc = ColliderDesc::cuboid(Vector3::new(1.0, 1.5, 1.0));
    let rotation = Quaternion::from_euler(0.3, 0.7, 0.1);
    let first = manager
        .add_static_collider(desc, &Transform::from_position_rotation(Vector3::ZERO, rotation))
        .unwrap();
    let second = manager
        .add_static_collider(desc, &Transform::from_position_rotation(Vector3::new(3.0, 0.0, 0.0), rotation))
        .unwrap();
    (first, second)
}

fn bench_axis_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("axis_cache");

    group.bench_function("cached_rejection", |b| {
        let mut manager = CollisionManager::new(None, Telemetry::disabled()).unwrap();
        let (first, second) = separated_pair(&mut manager);
        manager.are_obbs_colliding(first, second).unwrap();
        b.iter(|| manager.are_obbs_colliding(black_box(first), black_box(second)).unwrap());
    });

    group.bench_function("uncached_rejection", |b| {
        let a = tilted_box(Vector3::ZERO);
        let far = tilted_box(Vector3::new(3.0, 0.0, 0.0));
        b.iter(|| find_separating_axis(black_box(&a), black_box(&far)).is_overlapping());
    });

    group.finish();
}

// ============================================================================
// World ticks
// ============================================================================

fn bench_cloth_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");

    group.bench_function("cloth_16x16_60_ticks", |b| {
        b.iter(|| {
            let mut world = PhysicsWorld::new().unwrap();
            let cloth = ClothGrid::square(16, 0.25).build().unwrap();
            world.add_body(&cloth).unwrap();
            for _ in 0..60 {
                world.tick(&mut NullHost);
            }
            world.tick_count()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_sat, bench_axis_cache, bench_cloth_tick);
criterion_main!(benches);
