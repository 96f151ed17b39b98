//! Contact events and their serial application.
//!
//! Contacts are detected while agents move, queued, and applied in one serial
//! pass afterwards. Applying them serially is what makes contested pickups
//! resolve to exactly one winner and keeps a round deterministic.

use super::agent::{Agent, Species};
use super::world::World;
use std::collections::HashMap;
use tracing::debug;

/// State changes produced by agents touching things.
#[derive(Debug, Clone)]
pub enum ContactEvent {
    /// An agent reached a cargo box.
    BoxPickup {
        /// Index of the collecting agent.
        agent: usize,
        /// Index of the box in the world's box vector.
        cargo: usize,
    },
    /// An agent entered its own checkpoint zone.
    CheckpointReached {
        /// Index of the banking agent.
        agent: usize,
    },
    /// A predator caught a member of its prey species.
    RivalContact {
        /// Index of the hunting agent.
        attacker: usize,
        /// Index of the caught agent.
        victim: usize,
    },
}

/// Queue collecting contact events over one tick.
pub struct EventQueue {
    events: Vec<ContactEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: ContactEvent) {
        self.events.push(event);
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, ContactEvent> {
        self.events.drain(..)
    }
}

/// Applies all queued events to the world.
///
/// Checkpoint banks and rival catches take effect in queue order, each
/// guarded by the liveness of the agents involved, so an agent retired or
/// caught earlier in the queue no longer acts later in it. Box pickups are
/// collected first and resolved per box afterwards: the earliest claimant
/// wins, everyone else goes empty-handed.
pub fn apply_events(world: &mut World, mut queue: EventQueue) {
    let mut box_claims: HashMap<usize, Vec<usize>> = HashMap::new();

    for event in queue.drain() {
        match event {
            ContactEvent::BoxPickup { agent, cargo } => {
                box_claims.entry(cargo).or_default().push(agent);
            }
            ContactEvent::CheckpointReached { agent } => {
                if world.agents[agent].is_active() {
                    world.agents[agent].bank_at_checkpoint();
                }
            }
            ContactEvent::RivalContact { attacker, victim } => {
                if !world.agents[attacker].is_active() || !world.agents[victim].is_active() {
                    continue;
                }
                let victim_species = world.agents[victim].species;
                world.agents[victim].apply_rival_penalty();
                world.agents[attacker].claim_prey_reward();
                let spare = world.agents[attacker].policy.spares_last_prey
                    && active_members(&world.agents, victim_species) <= 1;
                debug!(
                    attacker = %world.agents[attacker].name,
                    victim = %world.agents[victim].name,
                    spared = spare,
                    "rival caught"
                );
                if spare {
                    world.agents[victim].deactivate();
                } else {
                    world.agents[victim].destroy();
                }
            }
        }
    }

    // First come, first served.
    for (cargo, claimants) in box_claims {
        if world.boxes[cargo].claimed {
            continue;
        }
        if let Some(&winner) = claimants.first() {
            world.agents[winner].collect_box();
            world.boxes[cargo].claim();
        }
    }
}

fn active_members(agents: &[Agent], species: Species) -> usize {
    agents
        .iter()
        .filter(|a| a.species == species && a.is_active())
        .count()
}
