//! Vessels and the species policies that differentiate them.
//!
//! All three species share one body and one steering brain; what sets a boat
//! apart from a pirate or a navy patrol is a [`CollisionPolicy`] value, not a
//! separate agent type.

use crate::simulation::genome::{Category, Genome};
use crate::simulation::geometric_utils::{direction_from_yaw, rotate_toward, yaw_of};
use crate::simulation::steering::{steer, CheckpointGate, SensorQuery};
use ndarray::Array1;
use rand::Rng;
use std::fmt;
use std::fmt::Write as _;

/// Fraction of the remaining arc the heading turns per tick.
pub const ROTATION_SMOOTHING: f32 = 0.1;

/// The three vessel kinds sailing the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    /// Trader: gathers cargo and runs it home.
    Boat,
    /// Pirate: raids traders for their cargo.
    Pirate,
    /// Navy: hunts pirates and banks bounties directly.
    Navy,
}

impl Species {
    /// Every species, in evaluation order.
    pub fn all() -> [Species; 3] {
        [Species::Boat, Species::Pirate, Species::Navy]
    }

    /// The category this species shows up as on other agents' rays.
    pub fn category(self) -> Category {
        match self {
            Species::Boat => Category::Boat,
            Species::Pirate => Category::Enemy,
            Species::Navy => Category::Navy,
        }
    }

    /// The contact rules this species plays by.
    pub fn policy(self) -> CollisionPolicy {
        match self {
            Species::Boat => CollisionPolicy {
                box_points: 2.0,
                collects_boxes: true,
                recycles_at_checkpoint: false,
                rival_penalty: -100.0,
                prey: None,
                prey_points: 0.0,
                prey_points_to_saved: false,
                spares_last_prey: false,
            },
            Species::Pirate => CollisionPolicy {
                box_points: 0.1,
                collects_boxes: true,
                recycles_at_checkpoint: false,
                rival_penalty: 0.0,
                prey: Some(Species::Boat),
                prey_points: 5.0,
                prey_points_to_saved: false,
                spares_last_prey: false,
            },
            Species::Navy => CollisionPolicy {
                box_points: 0.1,
                collects_boxes: true,
                recycles_at_checkpoint: true,
                rival_penalty: 0.0,
                prey: Some(Species::Pirate),
                prey_points: 5.0,
                prey_points_to_saved: true,
                spares_last_prey: true,
            },
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Boat => write!(f, "Boat"),
            Species::Pirate => write!(f, "Pirate"),
            Species::Navy => write!(f, "Navy"),
        }
    }
}

/// Data-driven contact rules for one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPolicy {
    /// Gathered points gained per cargo box collected.
    pub box_points: f32,
    /// Whether touching a cargo box collects it at all.
    pub collects_boxes: bool,
    /// Banking at the checkpoint resets gathered points and keeps sailing
    /// instead of retiring the agent for the round.
    pub recycles_at_checkpoint: bool,
    /// Gathered points delta applied when a predator catches this agent.
    pub rival_penalty: f32,
    /// The species this one hunts, if any.
    pub prey: Option<Species>,
    /// Points gained per prey caught.
    pub prey_points: f32,
    /// Prey rewards go straight to saved points instead of gathered points.
    pub prey_points_to_saved: bool,
    /// A caught prey is only put to sleep, not removed, when it is the last
    /// active member of its species.
    pub spares_last_prey: bool,
}

/// Whether an agent still takes part in the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Sailing, sensing, and visible to others.
    Active,
    /// Retired for the round but still ranked at the end of it.
    Dormant,
    /// Removed; pruned before evaluation.
    Destroyed,
}

/// One vessel: body state, points ledger, and the genome steering it.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Display name, also used as the winner report title.
    pub name: String,
    /// Which kind of vessel this is.
    pub species: Species,
    /// Contact rules, normally [`Species::policy`] for the species.
    pub policy: CollisionPolicy,
    /// Heritable steering parameters.
    pub genome: Genome,
    /// When carried points unlock checkpoint steering.
    pub gate: CheckpointGate,
    /// Position in the arena.
    pub pos: Array1<f32>,
    /// Heading angle in radians.
    pub yaw: f32,
    /// Current velocity, zeroed while asleep.
    pub velocity: Array1<f32>,
    /// Points carried since the round started.
    pub points_gathered: f32,
    /// Points banked at the checkpoint.
    pub points_saved: f32,
    /// Round evaluation counts gathered instead of saved points.
    pub pitty_points: bool,
    /// Whether the agent is still in play.
    pub liveness: Liveness,
    awake: bool,
}

impl Agent {
    /// Creates an asleep agent with a fresh points ledger.
    pub fn new(
        species: Species,
        name: String,
        genome: Genome,
        gate: CheckpointGate,
        pos: Array1<f32>,
        yaw: f32,
    ) -> Self {
        Self {
            name,
            species,
            policy: species.policy(),
            genome,
            gate,
            pos,
            yaw,
            velocity: Array1::zeros(3),
            points_gathered: 0.0,
            points_saved: 0.0,
            pitty_points: false,
            liveness: Liveness::Active,
            awake: false,
        }
    }

    /// Copies every heritable parameter from a parent genome.
    ///
    /// The points ledger and liveness are left alone; a newborn starts its
    /// round from zero regardless of how its parent did.
    pub fn birth(&mut self, parent: &Genome) {
        self.genome = parent.clone();
    }

    /// Starts the agent thinking and moving.
    pub fn awaken(&mut self) {
        self.awake = true;
    }

    /// Stops the agent and zeroes its velocity.
    pub fn sleep(&mut self) {
        self.awake = false;
        self.velocity = Array1::zeros(3);
    }

    /// Whether the agent is currently thinking and moving.
    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Whether the agent is sailing and visible to others.
    pub fn is_active(&self) -> bool {
        self.liveness == Liveness::Active
    }

    /// Retires the agent for the rest of the round. It keeps its ledger and
    /// is still ranked at evaluation.
    pub fn deactivate(&mut self) {
        self.liveness = Liveness::Dormant;
        self.sleep();
    }

    /// Marks the agent for removal.
    pub fn destroy(&mut self) {
        self.liveness = Liveness::Destroyed;
        self.sleep();
    }

    /// One thinking-and-moving step.
    ///
    /// Picks a direction, eases the heading a fraction of the way toward it,
    /// and moves at full genome speed along the chosen direction. The body
    /// moves where the brain points even while the bow is still swinging
    /// around.
    pub fn tick(&mut self, dt: f32, sensors: &dyn SensorQuery, rng: &mut impl Rng) {
        if !self.awake {
            return;
        }
        let forward = direction_from_yaw(self.yaw);
        let choice = steer(
            &forward,
            &self.pos,
            &self.genome,
            sensors,
            self.points_gathered,
            self.gate,
            rng,
        );
        self.yaw = rotate_toward(self.yaw, yaw_of(&choice.direction), ROTATION_SMOOTHING);
        self.velocity = &choice.direction * self.genome.move_speed;
        self.pos = &self.pos + &(&self.velocity * dt);
    }

    /// The score this agent is ranked by at round evaluation.
    pub fn fitness(&self) -> f32 {
        if self.pitty_points {
            self.points_gathered
        } else {
            self.points_saved
        }
    }

    /// Collects one cargo box.
    pub fn collect_box(&mut self) {
        self.points_gathered += self.policy.box_points;
    }

    /// Banks carried points at the checkpoint, when the gate allows it.
    ///
    /// Recycling species reset their carried points and keep sailing; the
    /// rest retire for the round with the ledger as it stands.
    pub fn bank_at_checkpoint(&mut self) {
        if !self.gate.open_for(self.points_gathered) {
            return;
        }
        self.points_saved += self.points_gathered;
        if self.policy.recycles_at_checkpoint {
            self.points_gathered = 0.0;
        } else {
            self.deactivate();
        }
    }

    /// Applies the penalty for being caught by a predator.
    pub fn apply_rival_penalty(&mut self) {
        self.points_gathered += self.policy.rival_penalty;
    }

    /// Credits the reward for catching one prey.
    pub fn claim_prey_reward(&mut self) {
        if self.policy.prey_points_to_saved {
            self.points_saved += self.policy.prey_points;
        } else {
            self.points_gathered += self.policy.prey_points;
        }
    }

    /// Renders the agent as a winner report section body.
    pub fn info_string(&self) -> String {
        let mut out = String::new();
        if self.pitty_points {
            let _ = writeln!(out, "Pitty Points");
        }
        let _ = writeln!(out, "Final Points: {}", self.fitness());
        let _ = writeln!(out);
        out.push_str(&self.genome.describe());
        out
    }
}
