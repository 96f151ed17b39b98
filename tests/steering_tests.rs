#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use flotilla::simulation::genome::{Category, CategoryWeights, Genome};
use flotilla::simulation::rng::create_rng;
use flotilla::simulation::steering::{steer, CheckpointGate, RayHit, SensorQuery};
use ndarray::Array1;

/// Arena stub where every ray comes back empty.
struct NoSightings;

impl SensorQuery for NoSightings {
    fn raycast(
        &self,
        _origin: &Array1<f32>,
        _direction: &Array1<f32>,
        _max_distance: f32,
    ) -> Option<RayHit> {
        None
    }
}

/// Arena stub where every ray hits the same thing at the same distance.
struct ConstantSighting {
    distance: f32,
    category: Category,
}

impl SensorQuery for ConstantSighting {
    fn raycast(
        &self,
        _origin: &Array1<f32>,
        _direction: &Array1<f32>,
        _max_distance: f32,
    ) -> Option<RayHit> {
        Some(RayHit {
            distance: self.distance,
            category: self.category,
        })
    }
}

fn create_test_genome() -> Genome {
    Genome {
        ray_count: 8,
        sight: 10.0,
        move_speed: 10.0,
        random_utility: (0.25, 0.75),
        box_weights: CategoryWeights {
            weight: 1.0,
            distance_factor: 4.0,
        },
        boat_weights: CategoryWeights {
            weight: 0.0,
            distance_factor: 0.0,
        },
        enemy_weights: CategoryWeights {
            weight: 0.0,
            distance_factor: 0.0,
        },
        navy_weights: CategoryWeights {
            weight: 0.0,
            distance_factor: 0.0,
        },
        checkpoint: Array1::from_vec(vec![50.0, 0.0, 0.0]),
        checkpoint_weight: 100.0,
        checkpoint_distance_factor: 0.0,
        points_weight: 1.0,
        search_for_checkpoint: true,
    }
}

/// Two rays spanning a 180 degree step each: every fan direction lies on the
/// z axis, so a candidate leaving the axis can only be the checkpoint.
fn create_axis_fan_genome() -> Genome {
    let mut genome = create_test_genome();
    genome.ray_count = 2;
    genome.random_utility = (0.0, 0.0);
    genome.box_weights = CategoryWeights {
        weight: 0.0,
        distance_factor: 0.0,
    };
    genome
}

fn forward_z() -> Array1<f32> {
    Array1::from_vec(vec![0.0, 0.0, 1.0])
}

fn origin() -> Array1<f32> {
    Array1::zeros(3)
}

#[test]
fn test_all_miss_utility_stays_within_random_bounds() {
    let genome = create_test_genome();

    for seed in 0..50 {
        let mut rng = create_rng(seed);
        let choice = steer(
            &forward_z(),
            &origin(),
            &genome,
            &NoSightings,
            0.0,
            CheckpointGate::default(),
            &mut rng,
        );
        assert!(choice.utility >= 0.25, "utility {} under the lower bound", choice.utility);
        assert!(choice.utility <= 0.75, "utility {} over the upper bound", choice.utility);
    }
}

#[test]
fn test_inverted_random_bounds_are_normalized() {
    let mut genome = create_test_genome();
    genome.random_utility = (0.75, 0.25);

    for seed in 0..20 {
        let mut rng = create_rng(seed);
        let choice = steer(
            &forward_z(),
            &origin(),
            &genome,
            &NoSightings,
            0.0,
            CheckpointGate::default(),
            &mut rng,
        );
        assert!(choice.utility >= 0.25 && choice.utility <= 0.75);
    }
}

#[test]
fn test_hit_utility_follows_proximity_and_weights() {
    let genome = create_test_genome();

    // Halfway into sight range: 0.5 * 4.0 + 1.0
    let sensors = ConstantSighting {
        distance: 5.0,
        category: Category::CargoBox,
    };
    let mut rng = create_rng(1);
    let choice = steer(
        &forward_z(),
        &origin(),
        &genome,
        &sensors,
        0.0,
        CheckpointGate::default(),
        &mut rng,
    );
    assert!((choice.utility - 3.0).abs() < 1e-5);

    // A closer sighting is worth more
    let near = ConstantSighting {
        distance: 1.0,
        category: Category::CargoBox,
    };
    let mut rng = create_rng(1);
    let near_choice = steer(
        &forward_z(),
        &origin(),
        &genome,
        &near,
        0.0,
        CheckpointGate::default(),
        &mut rng,
    );
    assert!((near_choice.utility - 4.6).abs() < 1e-5);
}

#[test]
fn test_chosen_direction_is_flat_and_unit_length() {
    let genome = create_test_genome();
    let forward = Array1::from_vec(vec![0.3, 0.8, 0.5]);
    let mut rng = create_rng(5);

    let choice = steer(
        &forward,
        &origin(),
        &genome,
        &NoSightings,
        0.0,
        CheckpointGate::default(),
        &mut rng,
    );

    let d = &choice.direction;
    assert_eq!(d[1], 0.0);
    let len = (d[0] * d[0] + d[2] * d[2]).sqrt();
    assert!((len - 1.0).abs() < 1e-4);
}

#[test]
fn test_empty_handed_agents_ignore_the_checkpoint() {
    let genome = create_axis_fan_genome();
    let mut rng = create_rng(2);

    // No cargo: the checkpoint candidate scores zero and stays out
    let choice = steer(
        &forward_z(),
        &origin(),
        &genome,
        &NoSightings,
        0.0,
        CheckpointGate::default(),
        &mut rng,
    );
    assert!(choice.direction[0].abs() < 1e-3);

    // Carrying cargo: the checkpoint at +x dominates the zero-scored fan
    let choice = steer(
        &forward_z(),
        &origin(),
        &genome,
        &NoSightings,
        4.0,
        CheckpointGate::default(),
        &mut rng,
    );
    assert!(choice.direction[0] > 0.99);
}

#[test]
fn test_checkpoint_gate_holds_until_enough_points() {
    let genome = create_axis_fan_genome();
    let gate = CheckpointGate {
        cap_access: true,
        min_points: 10.0,
    };
    let mut rng = create_rng(2);

    let blocked = steer(
        &forward_z(),
        &origin(),
        &genome,
        &NoSightings,
        4.0,
        gate,
        &mut rng,
    );
    assert!(blocked.direction[0].abs() < 1e-3);

    let allowed = steer(
        &forward_z(),
        &origin(),
        &genome,
        &NoSightings,
        12.0,
        gate,
        &mut rng,
    );
    assert!(allowed.direction[0] > 0.99);
}

#[test]
fn test_search_flag_disables_checkpoint_seeking() {
    let mut genome = create_axis_fan_genome();
    genome.search_for_checkpoint = false;
    let mut rng = create_rng(2);

    let choice = steer(
        &forward_z(),
        &origin(),
        &genome,
        &NoSightings,
        12.0,
        CheckpointGate::default(),
        &mut rng,
    );
    assert!(choice.direction[0].abs() < 1e-3);
}

#[test]
fn test_checkpoint_candidate_needs_positive_utility() {
    // Zero weighting scores exactly zero, which does not make the list
    let mut genome = create_axis_fan_genome();
    genome.checkpoint_weight = 0.0;
    let mut rng = create_rng(2);
    let choice = steer(
        &forward_z(),
        &origin(),
        &genome,
        &NoSightings,
        12.0,
        CheckpointGate::default(),
        &mut rng,
    );
    assert!(choice.direction[0].abs() < 1e-3);

    // Negative weighting stays out as well
    genome.checkpoint_weight = -5.0;
    let choice = steer(
        &forward_z(),
        &origin(),
        &genome,
        &NoSightings,
        12.0,
        CheckpointGate::default(),
        &mut rng,
    );
    assert!(choice.direction[0].abs() < 1e-3);
}

#[test]
fn test_minimal_fan_survives_exploration() {
    let mut genome = create_test_genome();
    genome.ray_count = 1;

    for seed in 0..100 {
        let mut rng = create_rng(seed);
        let choice = steer(
            &forward_z(),
            &origin(),
            &genome,
            &NoSightings,
            0.0,
            CheckpointGate::default(),
            &mut rng,
        );
        assert!(choice.utility >= 0.25 && choice.utility <= 0.75);
    }
}

#[test]
fn test_steering_is_deterministic_per_seed() {
    let genome = create_test_genome();

    let mut first_rng = create_rng(77);
    let mut second_rng = create_rng(77);

    for _ in 0..10 {
        let first = steer(
            &forward_z(),
            &origin(),
            &genome,
            &NoSightings,
            0.0,
            CheckpointGate::default(),
            &mut first_rng,
        );
        let second = steer(
            &forward_z(),
            &origin(),
            &genome,
            &NoSightings,
            0.0,
            CheckpointGate::default(),
            &mut second_rng,
        );
        assert_eq!(first.direction, second.direction);
        assert_eq!(first.utility, second.utility);
    }
}

#[test]
fn test_gate_opens_at_the_threshold() {
    let open = CheckpointGate::default();
    assert!(open.open_for(0.0));
    assert!(open.open_for(-5.0));

    let gated = CheckpointGate {
        cap_access: true,
        min_points: 6.0,
    };
    assert!(!gated.open_for(5.9));
    assert!(gated.open_for(6.0));
}
