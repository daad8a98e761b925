use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use verlet_physics::collision::sat::boxes_overlap;
use verlet_physics::math::{Quaternion, Vector3};
use verlet_physics::shapes::OrientedBox;
use verlet_physics::spatial::{Octree, OctreeConfig};

fn random_box(rng: &mut StdRng) -> OrientedBox {
    let center = Vector3::new(
        rng.gen_range(-14.0..14.0),
        rng.gen_range(-14.0..14.0),
        rng.gen_range(-14.0..14.0),
    );
    let half = Vector3::new(
        rng.gen_range(0.2..2.5),
        rng.gen_range(0.2..2.5),
        rng.gen_range(0.2..2.5),
    );
    let rotation = Quaternion::from_euler(
        rng.gen_range(0.0..3.0),
        rng.gen_range(0.0..3.0),
        rng.gen_range(0.0..3.0),
    );
    OrientedBox::new(center, half, rotation)
}

/// Every leaf holds exactly the items overlapping its region, and every item
/// lists exactly the leaves holding it.
fn assert_containment(tree: &Octree<u32>, keys: &[u32]) {
    let leaves = tree.leaves();
    for &key in keys {
        let bounds = *tree.bounds(key).expect("tracked item");
        let owners: BTreeSet<usize> = tree
            .owners(key)
            .expect("tracked item")
            .iter()
            .map(|id| id.index())
            .collect();

        let mut holding = BTreeSet::new();
        for leaf in &leaves {
            let listed = leaf.items.contains(&key);
            let overlaps = boxes_overlap(&leaf.region, &bounds);
            assert_eq!(
                listed, overlaps,
                "item {} listed={} overlaps={} in leaf {:?}",
                key, listed, overlaps, leaf.id
            );
            if listed {
                holding.insert(leaf.id.index());
            }
        }
        assert_eq!(owners, holding, "owner list of item {} is stale", key);
    }
}

fn assert_item_limit(tree: &Octree<u32>) {
    let config = *tree.config();
    for leaf in tree.leaves() {
        if leaf.depth < config.max_depth {
            assert!(
                leaf.items.len() <= config.max_object_limit,
                "leaf {:?} at depth {} holds {} items",
                leaf.id,
                leaf.depth,
                leaf.items.len()
            );
        }
    }
}

#[test]
fn test_containment_survives_random_moves() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = Octree::new(OctreeConfig::default()).unwrap();
    let keys: Vec<u32> = (0..12).collect();

    for &key in &keys {
        tree.insert(key, random_box(&mut rng));
    }
    assert_containment(&tree, &keys);

    for _ in 0..200 {
        let key = keys[rng.gen_range(0..keys.len())];
        assert!(tree.update(key, random_box(&mut rng)));
        assert_containment(&tree, &keys);
    }
}

#[test]
fn test_containment_survives_removals() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut tree = Octree::new(OctreeConfig {
        max_object_limit: 2,
        ..OctreeConfig::default()
    })
    .unwrap();
    let mut keys: Vec<u32> = (0..16).collect();
    for &key in &keys {
        tree.insert(key, random_box(&mut rng));
    }

    while let Some(key) = keys.pop() {
        assert!(tree.remove(key));
        assert!(!tree.contains(key));
        assert_containment(&tree, &keys);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn test_small_moves_keep_the_item_limit() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut tree = Octree::new(OctreeConfig::default()).unwrap();
    let mut centers: Vec<Vector3> = Vec::new();
    for key in 0..8u32 {
        let center = Vector3::new(
            rng.gen_range(-12.0..12.0),
            rng.gen_range(-12.0..12.0),
            rng.gen_range(-12.0..12.0),
        );
        centers.push(center);
        tree.insert(key, OrientedBox::axis_aligned(center, Vector3::splat(0.25)));
    }

    for step in 0..100 {
        let key = step % 8;
        let nudge = Vector3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        centers[key] += nudge;
        tree.update(key as u32, OrientedBox::axis_aligned(centers[key], Vector3::splat(0.25)));
        assert_item_limit(&tree);
    }
}

#[test]
fn test_overlapping_items_become_candidates() {
    let mut tree = Octree::new(OctreeConfig::default()).unwrap();
    tree.insert(1u32, OrientedBox::axis_aligned(Vector3::new(3.0, 3.0, 3.0), Vector3::splat(1.0)));
    tree.insert(2u32, OrientedBox::axis_aligned(Vector3::new(3.5, 3.0, 3.0), Vector3::splat(1.0)));
    tree.insert(3u32, OrientedBox::axis_aligned(Vector3::new(-8.0, -8.0, -8.0), Vector3::splat(1.0)));

    let pairs = tree.candidate_pairs();
    assert!(pairs.contains(&(1, 2)));
    assert!(!pairs.contains(&(1, 3)));
    assert!(!pairs.contains(&(2, 3)));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let mut tree: Octree<u32> = Octree::new(OctreeConfig::default()).unwrap();
    assert!(!tree.update(9, OrientedBox::axis_aligned(Vector3::ZERO, Vector3::splat(1.0))));
    assert!(!tree.remove(9));
    assert!(tree.owners(9).is_none());
}

#[test]
fn test_invalid_root_is_rejected() {
    let config = OctreeConfig {
        half_extent: 0.0,
        ..OctreeConfig::default()
    };
    assert!(Octree::<u32>::new(config).is_err());
}
