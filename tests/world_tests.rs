#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use flotilla::simulation::agent::{Agent, Liveness, Species};
use flotilla::simulation::arena::CargoBox;
use flotilla::simulation::genome::{Category, CategoryWeights, Genome};
use flotilla::simulation::rng::create_rng;
use flotilla::simulation::steering::CheckpointGate;
use flotilla::simulation::world::{ContactRadii, World};
use ndarray::Array1;

fn create_test_radii() -> ContactRadii {
    ContactRadii {
        body_radius: 1.0,
        pickup_radius: 2.0,
        contact_radius: 2.0,
        checkpoint_radius: 5.0,
    }
}

/// Slow genome with neutral weights, so sightings never yank an agent out of
/// the contact range a test placed it in.
fn create_test_genome(checkpoint: [f32; 3]) -> Genome {
    let neutral = CategoryWeights {
        weight: 0.0,
        distance_factor: 0.0,
    };
    Genome {
        ray_count: 4,
        sight: 8.0,
        move_speed: 1.0,
        random_utility: (0.0, 1.0),
        box_weights: neutral,
        boat_weights: neutral,
        enemy_weights: neutral,
        navy_weights: neutral,
        checkpoint: Array1::from_vec(checkpoint.to_vec()),
        checkpoint_weight: 1.0,
        checkpoint_distance_factor: 1.0,
        points_weight: 0.1,
        search_for_checkpoint: false,
    }
}

fn create_awake_agent(species: Species, name: &str, pos: [f32; 3], checkpoint: [f32; 3]) -> Agent {
    let mut agent = Agent::new(
        species,
        name.to_string(),
        create_test_genome(checkpoint),
        CheckpointGate::default(),
        Array1::from_vec(pos.to_vec()),
        0.0,
    );
    agent.awaken();
    agent
}

const FAR_AWAY: [f32; 3] = [500.0, 0.0, 0.0];

#[test]
fn test_boat_collects_a_nearby_box() {
    let mut world = World::new(create_test_radii());
    world.boxes.push(CargoBox::new(Array1::from_vec(vec![1.0, 0.0, 0.0])));
    world
        .agents
        .push(create_awake_agent(Species::Boat, "trader", [0.0, 0.0, 0.0], FAR_AWAY));

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    assert_eq!(world.agents[0].points_gathered, 2.0);
    assert!(world.boxes.is_empty(), "Collected boxes should be swept out");
}

#[test]
fn test_contested_box_goes_to_the_first_claimant() {
    let mut world = World::new(create_test_radii());
    world.boxes.push(CargoBox::new(Array1::zeros(3)));
    world
        .agents
        .push(create_awake_agent(Species::Boat, "first", [0.0, 0.0, 0.5], FAR_AWAY));
    world
        .agents
        .push(create_awake_agent(Species::Boat, "second", [0.0, 0.0, -0.5], FAR_AWAY));

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    // Exactly one winner, and it is the earlier claimant
    assert_eq!(world.agents[0].points_gathered, 2.0);
    assert_eq!(world.agents[1].points_gathered, 0.0);
    assert!(world.boxes.is_empty());
}

#[test]
fn test_pirate_plunders_and_removes_the_boat() {
    let mut world = World::new(create_test_radii());
    world
        .agents
        .push(create_awake_agent(Species::Pirate, "raider", [0.0, 0.0, 0.0], FAR_AWAY));
    world
        .agents
        .push(create_awake_agent(Species::Boat, "victim", [1.0, 0.0, 0.0], FAR_AWAY));

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    assert_eq!(world.agents.len(), 1);
    assert_eq!(world.agents[0].species, Species::Pirate);
    assert_eq!(world.agents[0].points_gathered, 5.0);
    assert_eq!(world.agents[0].points_saved, 0.0);
}

#[test]
fn test_navy_banks_bounty_directly_as_saved_points() {
    let mut world = World::new(create_test_radii());
    world
        .agents
        .push(create_awake_agent(Species::Navy, "patrol", [0.0, 0.0, 0.0], FAR_AWAY));
    world
        .agents
        .push(create_awake_agent(Species::Pirate, "near", [1.0, 0.0, 0.0], FAR_AWAY));
    world
        .agents
        .push(create_awake_agent(Species::Pirate, "far", [50.0, 0.0, 50.0], FAR_AWAY));

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    // The caught pirate is gone for good, its species still has a member
    assert_eq!(world.agents.len(), 2);
    let navy = &world.agents[0];
    assert_eq!(navy.points_saved, 5.0);
    assert_eq!(navy.points_gathered, 0.0);
    assert!(world.agents.iter().any(|a| a.name == "far"));
}

#[test]
fn test_navy_spares_the_last_pirate() {
    let mut world = World::new(create_test_radii());
    world
        .agents
        .push(create_awake_agent(Species::Navy, "patrol", [0.0, 0.0, 0.0], FAR_AWAY));
    world
        .agents
        .push(create_awake_agent(Species::Pirate, "last", [1.0, 0.0, 0.0], FAR_AWAY));

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    assert_eq!(world.agents.len(), 2, "The last pirate stays in the world");
    let pirate = world
        .agents
        .iter()
        .find(|a| a.species == Species::Pirate)
        .expect("Pirate should survive");
    assert_eq!(pirate.liveness, Liveness::Dormant);
    assert!(!pirate.is_awake());
    assert_eq!(world.agents[0].points_saved, 5.0);
}

#[test]
fn test_boat_banks_at_checkpoint_and_retires() {
    let mut world = World::new(create_test_radii());
    let mut boat = create_awake_agent(Species::Boat, "trader", [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
    boat.points_gathered = 4.0;
    world.agents.push(boat);

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    let boat = &world.agents[0];
    assert_eq!(boat.points_saved, 4.0);
    assert_eq!(boat.liveness, Liveness::Dormant);
    assert!(!boat.is_awake());
    assert!(boat.velocity.iter().all(|&v| v == 0.0));
}

#[test]
fn test_closed_gate_blocks_banking() {
    let mut world = World::new(create_test_radii());
    let mut boat = Agent::new(
        Species::Boat,
        "trader".to_string(),
        create_test_genome([0.0, 0.0, 1.0]),
        CheckpointGate {
            cap_access: true,
            min_points: 10.0,
        },
        Array1::zeros(3),
        0.0,
    );
    boat.points_gathered = 4.0;
    boat.awaken();
    world.agents.push(boat);

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    let boat = &world.agents[0];
    assert_eq!(boat.points_saved, 0.0);
    assert_eq!(boat.liveness, Liveness::Active);
    assert!(boat.is_awake());
}

#[test]
fn test_navy_recycles_at_its_checkpoint() {
    let mut world = World::new(create_test_radii());
    let mut navy = create_awake_agent(Species::Navy, "patrol", [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
    navy.points_gathered = 3.0;
    world.agents.push(navy);

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    let navy = &world.agents[0];
    assert_eq!(navy.points_saved, 3.0);
    assert_eq!(navy.points_gathered, 0.0);
    assert_eq!(navy.liveness, Liveness::Active);
    assert!(navy.is_awake(), "Recycling keeps the patrol sailing");
}

#[test]
fn test_asleep_agents_hold_position() {
    let mut world = World::new(create_test_radii());
    let agent = Agent::new(
        Species::Boat,
        "idle".to_string(),
        create_test_genome(FAR_AWAY),
        CheckpointGate::default(),
        Array1::from_vec(vec![5.0, 0.0, 5.0]),
        0.0,
    );
    world.agents.push(agent);

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    assert_eq!(world.agents[0].pos, Array1::from_vec(vec![5.0, 0.0, 5.0]));
    assert!(world.agents[0].velocity.iter().all(|&v| v == 0.0));
}

#[test]
fn test_sleep_zeroes_velocity() {
    let mut world = World::new(create_test_radii());
    world
        .agents
        .push(create_awake_agent(Species::Boat, "trader", [0.0, 0.0, 0.0], FAR_AWAY));

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    let speed: f32 = world.agents[0].velocity.iter().map(|v| v * v).sum::<f32>().sqrt();
    assert!(speed > 0.5, "An awake agent should be under way");

    world.agents[0].sleep();
    assert!(world.agents[0].velocity.iter().all(|&v| v == 0.0));
    assert!(!world.agents[0].is_awake());
}

#[test]
fn test_dormant_boats_cannot_be_plundered() {
    let mut world = World::new(create_test_radii());
    world
        .agents
        .push(create_awake_agent(Species::Pirate, "raider", [0.0, 0.0, 0.0], FAR_AWAY));
    let mut boat = create_awake_agent(Species::Boat, "retired", [1.0, 0.0, 0.0], FAR_AWAY);
    boat.deactivate();
    world.agents.push(boat);

    let mut rng = create_rng(7);
    world.step(0.01, &mut rng).expect("Failed to step world");

    assert_eq!(world.agents.len(), 2);
    assert_eq!(world.agents[0].points_gathered, 0.0);
}

#[test]
fn test_birth_copies_the_genome_and_nothing_else() {
    let mut agent = create_awake_agent(Species::Boat, "child", [0.0, 0.0, 0.0], FAR_AWAY);
    agent.points_gathered = 7.0;
    agent.points_saved = 2.0;

    let mut parent = create_test_genome(FAR_AWAY);
    parent.sight = 99.0;
    parent.ray_count = 5;

    agent.birth(&parent);

    assert_eq!(agent.genome, parent);
    assert_eq!(agent.points_gathered, 7.0);
    assert_eq!(agent.points_saved, 2.0);

    // A fresh spawn starts its ledger from zero
    let mut newborn = Agent::new(
        Species::Boat,
        "newborn".to_string(),
        create_test_genome(FAR_AWAY),
        CheckpointGate::default(),
        Array1::zeros(3),
        0.0,
    );
    newborn.birth(&parent);
    assert_eq!(newborn.points_gathered, 0.0);
    assert_eq!(newborn.points_saved, 0.0);
    assert_eq!(newborn.genome, parent);
}

#[test]
fn test_fitness_switches_under_pitty_points() {
    let mut agent = create_awake_agent(Species::Boat, "trader", [0.0, 0.0, 0.0], FAR_AWAY);
    agent.points_saved = 10.0;
    agent.points_gathered = 3.0;

    assert_eq!(agent.fitness(), 10.0);

    agent.pitty_points = true;
    assert_eq!(agent.fitness(), 3.0);
    assert!(agent.info_string().starts_with("Pitty Points"));
}

#[test]
fn test_species_policies_match_their_roles() {
    let boat = Species::Boat.policy();
    assert_eq!(boat.box_points, 2.0);
    assert_eq!(boat.rival_penalty, -100.0);
    assert!(boat.prey.is_none());
    assert!(!boat.recycles_at_checkpoint);

    let pirate = Species::Pirate.policy();
    assert_eq!(pirate.prey, Some(Species::Boat));
    assert_eq!(pirate.prey_points, 5.0);
    assert!(!pirate.prey_points_to_saved);
    assert!(!pirate.spares_last_prey);

    let navy = Species::Navy.policy();
    assert_eq!(navy.prey, Some(Species::Pirate));
    assert!(navy.prey_points_to_saved);
    assert!(navy.spares_last_prey);
    assert!(navy.recycles_at_checkpoint);

    // Pirates show up on rays as the enemy category
    assert_eq!(Species::Pirate.category(), Category::Enemy);
}

#[test]
fn test_world_housekeeping_helpers() {
    let mut world = World::new(create_test_radii());
    world
        .agents
        .push(create_awake_agent(Species::Boat, "a", [0.0, 0.0, 0.0], FAR_AWAY));
    world
        .agents
        .push(create_awake_agent(Species::Pirate, "b", [10.0, 0.0, 0.0], FAR_AWAY));
    world
        .agents
        .push(create_awake_agent(Species::Navy, "c", [20.0, 0.0, 0.0], FAR_AWAY));

    world.agents[1].destroy();
    assert_eq!(world.active_count(Species::Pirate), 0);

    world.prune_destroyed();
    assert_eq!(world.agents.len(), 2);

    world.remove_species(Species::Boat);
    assert_eq!(world.agents.len(), 1);
    assert_eq!(world.agents[0].species, Species::Navy);

    world.sleep_all();
    assert!(world.agents.iter().all(|a| !a.is_awake()));
}
