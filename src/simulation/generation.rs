//! The generational loop: timed rounds, evaluation, selection, respawning.

use crate::simulation::agent::{Agent, Species};
use crate::simulation::clock::SimulationClock;
use crate::simulation::genome::Genome;
use crate::simulation::mutation;
use crate::simulation::params::{ParamsError, SimulationParams};
use crate::simulation::report::{EvolutionSnapshot, ReportWriter};
use crate::simulation::rng::{create_rng, SimRng};
use crate::simulation::world::World;
use kdtree::ErrorKind as KdTreeError;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure while advancing the simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The spatial index could not be built.
    #[error("spatial index construction failed: {0}")]
    Spatial(#[from] KdTreeError),
    /// A report or snapshot could not be written.
    #[error("failed to write artifact")]
    Artifact(#[from] std::io::Error),
}

/// Where the manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    /// Constructed, nothing spawned yet.
    Idle,
    /// A round is in progress.
    Running,
    /// A round just expired and cohorts are being ranked and respawned.
    Evaluating,
    /// Explicitly stopped; agents are asleep until resumed.
    Stopped,
}

/// The best agent of one species in the last evaluated round.
#[derive(Debug, Clone)]
pub struct RoundWinner {
    /// Report title, `<name>Gen-<generation>`.
    pub title: String,
    /// Fitness the win was scored with.
    pub points: f32,
    /// The winning genome, as it will seed the next cohort.
    pub genome: Genome,
}

/// Parent genomes each species' next cohort spawns from.
///
/// Every slot holds a clone of the latest round winner; spawning draws
/// uniformly over the slots.
#[derive(Debug, Clone, Default)]
pub struct ParentPools {
    /// Pool seeding the boat cohort.
    pub boat: Vec<Genome>,
    /// Pool seeding the pirate cohort.
    pub pirate: Vec<Genome>,
    /// Pool seeding the navy cohort.
    pub navy: Vec<Genome>,
}

impl ParentPools {
    /// The pool for one species.
    pub fn for_species(&self, species: Species) -> &Vec<Genome> {
        match species {
            Species::Boat => &self.boat,
            Species::Pirate => &self.pirate,
            Species::Navy => &self.navy,
        }
    }

    fn for_species_mut(&mut self, species: Species) -> &mut Vec<Genome> {
        match species {
            Species::Boat => &mut self.boat,
            Species::Pirate => &mut self.pirate,
            Species::Navy => &mut self.navy,
        }
    }
}

#[derive(Debug, Default)]
struct WinnerBoard {
    boat: Option<RoundWinner>,
    pirate: Option<RoundWinner>,
    navy: Option<RoundWinner>,
}

impl WinnerBoard {
    fn get(&self, species: Species) -> Option<&RoundWinner> {
        match species {
            Species::Boat => self.boat.as_ref(),
            Species::Pirate => self.pirate.as_ref(),
            Species::Navy => self.navy.as_ref(),
        }
    }

    fn set(&mut self, species: Species, winner: RoundWinner) {
        match species {
            Species::Boat => self.boat = Some(winner),
            Species::Pirate => self.pirate = Some(winner),
            Species::Navy => self.navy = Some(winner),
        }
    }
}

/// Orchestrates rounds: runs the world against the clock, evaluates cohorts
/// at every expiry, and respawns the next generation from the winners.
///
/// The random stream is re-created from the configured seed at the start of
/// every round. Box scatter, spawn placement, mutation, and in-round utility
/// draws all pull from that one stream, so a run is reproducible end to end
/// from its configuration alone.
pub struct GenerationManager {
    params: SimulationParams,
    world: World,
    clock: SimulationClock,
    rng: SimRng,
    phase: SimulationPhase,
    generation: u32,
    pools: ParentPools,
    winners: WinnerBoard,
    reports: ReportWriter,
}

impl GenerationManager {
    /// Creates an idle manager after validating the parameters.
    pub fn new(params: SimulationParams) -> Result<Self, ParamsError> {
        params.validate()?;
        let clock = SimulationClock::new(params.round_duration, params.time_scale);
        let rng = create_rng(params.round_seed);
        let world = World::new(params.radii);
        let reports = ReportWriter::new(params.artifacts_dir.clone());
        Ok(Self {
            params,
            world,
            clock,
            rng,
            phase: SimulationPhase::Idle,
            generation: 0,
            pools: ParentPools::default(),
            winners: WinnerBoard::default(),
            reports,
        })
    }

    /// Spawns the first generation and starts the first round.
    ///
    /// With empty parent pools every cohort starts from its configured
    /// genome; mutation still applies, so even generation zero is not a field
    /// of clones.
    pub fn start(&mut self) {
        self.rng = create_rng(self.params.round_seed);
        self.generation = 0;
        self.world = World::new(self.params.radii);
        self.world.respawn_boxes(&self.params.box_areas, &mut self.rng);
        for species in Species::all() {
            self.spawn_species(species);
        }
        self.clock.reset();
        self.phase = SimulationPhase::Running;
        info!(
            seed = self.params.round_seed,
            agents = self.world.agents.len(),
            boxes = self.world.boxes.len(),
            "simulation started"
        );
    }

    /// Stops the run and puts every agent to sleep.
    pub fn stop(&mut self) {
        self.phase = SimulationPhase::Stopped;
        self.world.prune_destroyed();
        self.world.sleep_all();
        info!(generation = self.generation, "simulation stopped");
    }

    /// Starts the next round from the current parent pools.
    pub fn resume(&mut self) -> Result<(), SimulationError> {
        self.make_new_generation()
    }

    /// Advances the run by one tick.
    ///
    /// # Returns
    ///
    /// `Ok(true)` when this tick ended a round and the next generation has
    /// been spawned. Outside the running phase the tick is a no-op.
    pub fn tick(&mut self, dt: f32) -> Result<bool, SimulationError> {
        if self.phase != SimulationPhase::Running {
            return Ok(false);
        }
        let scaled = self.clock.scaled(dt);
        self.world.step(scaled, &mut self.rng)?;
        if self.clock.advance(scaled) {
            self.generation += 1;
            self.make_new_generation()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Evaluates every cohort, persists the winners, and respawns the world
    /// for the next round.
    ///
    /// The random stream restarts from the configured seed first, so the new
    /// round's box scatter and spawn placement match every other round's.
    pub fn make_new_generation(&mut self) -> Result<(), SimulationError> {
        self.rng = create_rng(self.params.round_seed);
        self.phase = SimulationPhase::Evaluating;
        self.world.prune_destroyed();
        for species in Species::all() {
            self.evaluate_species(species)?;
        }
        self.world.respawn_boxes(&self.params.box_areas, &mut self.rng);
        for species in Species::all() {
            self.spawn_species(species);
        }
        self.clock.reset();
        self.phase = SimulationPhase::Running;
        Ok(())
    }

    /// Ranks one cohort, records its winner, and refills its parent pool.
    ///
    /// An empty cohort leaves the previous pool in place and writes nothing.
    /// A species with evolution switched off is skipped entirely.
    fn evaluate_species(&mut self, species: Species) -> Result<(), SimulationError> {
        if !self.params.species(species).evolve {
            debug!(%species, "evolution disabled, cohort respawns from its configured genome");
            return Ok(());
        }
        let cohort: Vec<usize> = self
            .world
            .agents
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.species == species)
            .map(|(i, _)| i)
            .collect();
        if cohort.is_empty() {
            warn!(%species, "cohort is empty, keeping previous parents");
            return Ok(());
        }

        let nobody_saved = cohort
            .iter()
            .all(|&i| self.world.agents[i].points_saved <= 0.0);
        if nobody_saved {
            debug!(%species, "nobody banked points, ranking by gathered points");
            for &i in &cohort {
                self.world.agents[i].pitty_points = true;
            }
        }

        let ranked = ranked_indices(&self.world.agents, species);
        let winner = &self.world.agents[ranked[0]];
        let title = format!("{}Gen-{}", winner.name, self.generation);

        let report = self
            .reports
            .append_section(&format!("{species}Info"), &title, &winner.info_string())?;
        self.reports.save_genome(&title, &winner.genome)?;
        info!(
            %species,
            winner = %title,
            points = winner.fitness(),
            report = %report.display(),
            "round evaluated"
        );

        let parent_count = self.params.species(species).parent_count;
        *self.pools.for_species_mut(species) = vec![winner.genome.clone(); parent_count];
        let winner = RoundWinner {
            title,
            points: winner.fitness(),
            genome: winner.genome.clone(),
        };
        self.winners.set(species, winner);
        Ok(())
    }

    /// Replaces one species' cohort with freshly spawned, mutated offspring.
    fn spawn_species(&mut self, species: Species) {
        self.world.remove_species(species);
        let cohort = self.params.species(species);
        let base_genome = cohort.genome.build();
        let pool = self.pools.for_species(species);
        let positions = cohort.area.scatter(&mut self.rng);
        for (i, pos) in positions.into_iter().enumerate() {
            let name = format!("{species}-{i}");
            let yaw = self.rng.random_range(0.0..std::f32::consts::TAU);
            let mut agent = Agent::new(species, name, base_genome.clone(), cohort.gate, pos, yaw);
            if !pool.is_empty() {
                let pick = self.rng.random_range(0..pool.len());
                agent.birth(&pool[pick]);
            }
            if cohort.evolve {
                mutation::mutate(&mut agent.genome, &self.params.mutation, &mut self.rng);
            }
            agent.awaken();
            self.world.agents.push(agent);
        }
    }

    /// Captures the parent pools for a later resume.
    pub fn snapshot(&self) -> EvolutionSnapshot {
        EvolutionSnapshot {
            generation: self.generation,
            boat_parents: self.pools.boat.clone(),
            pirate_parents: self.pools.pirate.clone(),
            navy_parents: self.pools.navy.clone(),
        }
    }

    /// Restores parent pools and the generation counter from a snapshot.
    ///
    /// Follow with [`GenerationManager::resume`] to spawn a round from the
    /// restored pools.
    pub fn restore(&mut self, snapshot: EvolutionSnapshot) {
        self.generation = snapshot.generation;
        self.pools.boat = snapshot.boat_parents;
        self.pools.pirate = snapshot.pirate_parents;
        self.pools.navy = snapshot.navy_parents;
        info!(generation = self.generation, "snapshot restored");
    }

    /// The world as it stands mid-round.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for host-side intervention.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Where the manager is in its lifecycle.
    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// Rounds completed so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// The parameters the run was built from.
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// One species' current parent pool.
    pub fn parent_pool(&self, species: Species) -> &[Genome] {
        self.pools.for_species(species)
    }

    /// The winner of the last evaluated round for one species.
    pub fn last_winner(&self, species: Species) -> Option<&RoundWinner> {
        self.winners.get(species)
    }

    /// Simulated seconds into the current round.
    pub fn round_elapsed(&self) -> f32 {
        self.clock.elapsed()
    }
}

/// Indices of one species' agents, ranked by descending fitness.
///
/// The sort is stable, so agents tied on fitness keep their relative order
/// from the agent list.
pub fn ranked_indices(agents: &[Agent], species: Species) -> Vec<usize> {
    let mut indices: Vec<usize> = agents
        .iter()
        .enumerate()
        .filter(|(_, agent)| agent.species == species)
        .map(|(i, _)| i)
        .collect();
    indices.sort_by(|&a, &b| agents[b].fitness().total_cmp(&agents[a].fitness()));
    indices
}
