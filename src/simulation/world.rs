//! World state for one round and the tick loop that advances it.

use super::agent::{Agent, Liveness, Species};
use super::arena::{ArenaIndex, ArenaView, CargoBox, SpawnArea};
use super::events::{self, ContactEvent, EventQueue};
use super::geometric_utils::norm;
use kdtree::ErrorKind as KdTreeError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Contact distances shared by every overlap test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactRadii {
    /// Radius of a hull or box as seen by vision rays.
    pub body_radius: f32,
    /// Center distance under which a cargo box is collected.
    pub pickup_radius: f32,
    /// Center distance under which two hulls touch.
    pub contact_radius: f32,
    /// Center distance under which an agent is inside its checkpoint zone.
    pub checkpoint_radius: f32,
}

/// Everything on the water during one round.
#[derive(Debug)]
pub struct World {
    /// Cargo boxes still floating.
    pub boxes: Vec<CargoBox>,
    /// All agents, including dormant ones awaiting evaluation.
    pub agents: Vec<Agent>,
    /// Contact distances used by sensing and overlap tests.
    pub radii: ContactRadii,
}

impl World {
    /// Creates an empty world.
    pub fn new(radii: ContactRadii) -> Self {
        Self {
            boxes: Vec::new(),
            agents: Vec::new(),
            radii,
        }
    }

    /// Replaces all cargo boxes with fresh scatters over the given areas.
    pub fn respawn_boxes(&mut self, areas: &[SpawnArea], rng: &mut impl Rng) {
        self.boxes.clear();
        for area in areas {
            self.boxes
                .extend(area.scatter(rng).into_iter().map(CargoBox::new));
        }
    }

    /// Removes every agent of one species, ahead of respawning the cohort.
    pub fn remove_species(&mut self, species: Species) {
        self.agents.retain(|agent| agent.species != species);
    }

    /// Drops agents that were destroyed outside the tick loop.
    pub fn prune_destroyed(&mut self) {
        self.agents
            .retain(|agent| agent.liveness != Liveness::Destroyed);
    }

    /// Puts every agent to sleep.
    pub fn sleep_all(&mut self) {
        for agent in &mut self.agents {
            agent.sleep();
        }
    }

    /// Number of active agents of a species still in play.
    pub fn active_count(&self, species: Species) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.species == species && agent.is_active())
            .count()
    }

    /// Advances the world by one tick.
    ///
    /// Agents sense and move against a snapshot of the tick-start state, so
    /// the order they are updated in cannot leak into what they see. Contacts
    /// found along the way queue up as events and are applied serially once
    /// everyone has moved; destroyed agents and claimed boxes are swept out
    /// at the end.
    pub fn step(&mut self, dt: f32, rng: &mut impl Rng) -> Result<(), KdTreeError> {
        let snapshot = self.agents.clone();
        let index = ArenaIndex::build(&self.boxes, &snapshot)?;
        let mut queue = EventQueue::new();

        for i in 0..self.agents.len() {
            if !self.agents[i].is_awake() {
                continue;
            }
            let view = ArenaView::new(&self.boxes, &snapshot, &index, self.radii.body_radius, i);
            self.agents[i].tick(dt, &view, rng);
            collect_contacts(i, &self.agents[i], &snapshot, &index, &self.radii, &mut queue);
        }

        events::apply_events(self, queue);

        self.agents
            .retain(|agent| agent.liveness != Liveness::Destroyed);
        self.boxes.retain(|cargo| !cargo.claimed);
        Ok(())
    }
}

/// Scans for contacts around one agent's new position.
///
/// The queries run against the tick-start index, so freshly moved neighbors
/// are seen where they started the tick. Box positions never move, which
/// makes pickups exact.
fn collect_contacts(
    i: usize,
    agent: &Agent,
    snapshot: &[Agent],
    index: &ArenaIndex,
    radii: &ContactRadii,
    queue: &mut EventQueue,
) {
    if agent.policy.collects_boxes {
        for (_, cargo) in index.query_boxes(&agent.pos, radii.pickup_radius) {
            queue.push(ContactEvent::BoxPickup { agent: i, cargo });
        }
    }
    if let Some(prey) = agent.policy.prey {
        for (_, other) in index.query_agents(&agent.pos, radii.contact_radius) {
            if other != i && snapshot[other].species == prey {
                queue.push(ContactEvent::RivalContact {
                    attacker: i,
                    victim: other,
                });
            }
        }
    }
    let to_checkpoint = &agent.genome.checkpoint - &agent.pos;
    if norm(&to_checkpoint) < radii.checkpoint_radius {
        queue.push(ContactEvent::CheckpointReached { agent: i });
    }
}
