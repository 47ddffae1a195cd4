use super::*;

fn small_walk(seed: u64) -> RandomWalk {
    RandomWalk {
        walkers: 4,
        points_per_walker: 50,
        step: 5.0,
        seed,
    }
}

#[test]
fn random_walk_is_seeded_and_sized() {
    let a = random_walk_points(120, 80, &small_walk(7));
    let b = random_walk_points(120, 80, &small_walk(7));
    let c = random_walk_points(120, 80, &small_walk(8));
    assert_eq!(a.len(), 200);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn random_walk_stays_on_surface() {
    let pts = random_walk_points(
        30,
        20,
        &RandomWalk {
            step: 25.0,
            ..small_walk(1)
        },
    );
    for p in pts {
        assert!((0.0..=29.0).contains(&p.x), "x={}", p.x);
        assert!((0.0..=19.0).contains(&p.y), "y={}", p.y);
    }
}

#[test]
fn zero_walkers_yield_no_points() {
    let walk = RandomWalk {
        walkers: 0,
        ..small_walk(0)
    };
    assert!(random_walk_points(10, 10, &walk).is_empty());
}

#[test]
fn comparison_reports_small_drift() {
    let pts = random_walk_points(120, 80, &small_walk(3));
    let cmp = compare_algorithms(&pts, 120, 80, 8.0, 4.0).unwrap();
    assert_eq!(cmp.brute_force.algorithm, Algorithm::BruteForce);
    assert_eq!(cmp.bounded_radius.algorithm, Algorithm::BoundedRadius);
    assert_eq!(cmp.brute_force.grid.geometry, cmp.bounded_radius.grid.geometry);
    assert!(cmp.max_relative_diff >= 0.0);
    assert!(cmp.max_relative_diff < 0.05, "drift {}", cmp.max_relative_diff);
}

#[test]
fn comparison_propagates_bad_parameters() {
    assert!(compare_algorithms(&[], 10, 10, 0.0, 1.0).is_err());
}
