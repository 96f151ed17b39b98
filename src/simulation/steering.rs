//! Utility-driven direction selection.
//!
//! Every thinking tick an agent fans rays out around its heading, scores one
//! candidate direction per ray, optionally adds a candidate pointing at its
//! checkpoint, and picks from the ranked list. The scoring is entirely
//! genome-driven, which is what evolution ends up optimizing.

use crate::simulation::genome::{Category, Genome};
use crate::simulation::geometric_utils::{
    direction_from_yaw, flattened, inverse_lerp, lerp, norm, yaw_of,
};
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probability of committing to the highest-utility candidate.
pub const MAX_UTILITY_CHOICE_CHANCE: f32 = 0.85;
/// Distance at which checkpoint urgency starts rising above its floor.
pub const CHECKPOINT_URGENCY_RANGE: f32 = 300.0;
/// Utility gap under which the runner-up counts as a near tie.
const NEAR_TIE_GAP: f32 = 2.0;
/// Checkpoint urgency never fades entirely, even far away.
const MIN_CHECKPOINT_PROXIMITY: f32 = 0.1;

/// What a cast ray reports back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the first thing hit.
    pub distance: f32,
    /// What kind of thing it was.
    pub category: Category,
}

/// Read-only view of the arena an agent senses through.
pub trait SensorQuery {
    /// Casts a flat ray and reports the nearest occupant it enters, if any
    /// within `max_distance`.
    fn raycast(
        &self,
        origin: &Array1<f32>,
        direction: &Array1<f32>,
        max_distance: f32,
    ) -> Option<RayHit>;
}

/// Policy deciding when carried points unlock the checkpoint candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointGate {
    /// When set, the checkpoint stays out of consideration until enough
    /// points are gathered.
    pub cap_access: bool,
    /// Gathered points required while `cap_access` is set.
    pub min_points: f32,
}

impl CheckpointGate {
    /// Whether an agent carrying `points_gathered` may steer for its
    /// checkpoint.
    pub fn open_for(&self, points_gathered: f32) -> bool {
        !self.cap_access || points_gathered >= self.min_points
    }
}

impl Default for CheckpointGate {
    fn default() -> Self {
        Self {
            cap_access: false,
            min_points: 0.0,
        }
    }
}

/// A candidate direction together with the utility it scored.
#[derive(Debug, Clone)]
pub struct RankedDirection {
    /// Flat unit direction.
    pub direction: Array1<f32>,
    /// Score the candidate was ranked by.
    pub utility: f32,
}

/// Picks the direction an agent moves in this thinking tick.
///
/// The ray fan sweeps `step_angle` degrees per ray, centered on the forward
/// heading, casting one ray more than `ray_count` so the sweep closes
/// symmetrically. A ray that enters something scores
/// `proximity * distance_factor + weight` for the sensed category, where
/// proximity is 1 at the agent and 0 at the sight limit. A ray that sees
/// nothing scores a uniform draw between the genome's random utility bounds.
///
/// When the gate is open and the genome searches for its checkpoint, one
/// extra candidate points straight at it, scored by checkpoint weighting
/// times carried points; it only joins the list with a strictly positive
/// utility, so an empty-handed agent never beelines home.
///
/// Candidates are ranked by descending utility with a stable sort, so earlier
/// rays win ties. The top candidate is chosen with probability
/// [`MAX_UTILITY_CHOICE_CHANCE`]; otherwise the runner-up is taken instead,
/// but only when it trails by less than a near-tie gap.
pub fn steer(
    forward: &Array1<f32>,
    position: &Array1<f32>,
    genome: &Genome,
    sensors: &dyn SensorQuery,
    points_gathered: f32,
    gate: CheckpointGate,
    rng: &mut impl Rng,
) -> RankedDirection {
    let forward_flat = flattened(forward);
    let step_deg = genome.step_angle() as f32;
    let half_arc = (step_deg * genome.ray_count as f32 / 2.0).to_radians();
    let mut ray_yaw = yaw_of(&forward_flat) - half_arc;

    let mut candidates: Vec<RankedDirection> = Vec::with_capacity(genome.ray_count as usize + 2);
    for _ in 0..=genome.ray_count {
        candidates.push(ranked_ray(position, ray_yaw, genome, sensors, rng));
        ray_yaw += step_deg.to_radians();
    }

    if genome.search_for_checkpoint && gate.open_for(points_gathered) {
        if let Some(candidate) = checkpoint_candidate(position, genome, points_gathered) {
            candidates.push(candidate);
        }
    }
    if candidates.is_empty() {
        candidates.push(RankedDirection {
            direction: forward_flat,
            utility: 0.0,
        });
    }

    candidates.sort_by(|a, b| b.utility.total_cmp(&a.utility));

    let explore = rng.random_range(0.0..1.0) > MAX_UTILITY_CHOICE_CHANCE;
    let pick = if explore
        && candidates.len() > 1
        && candidates[0].utility - candidates[1].utility < NEAR_TIE_GAP
    {
        1
    } else {
        0
    };
    candidates.swap_remove(pick)
}

/// Scores a single ray of the fan.
///
/// The fallback draw happens before the cast so every ray consumes the same
/// amount of randomness whether it hits or not.
fn ranked_ray(
    position: &Array1<f32>,
    yaw: f32,
    genome: &Genome,
    sensors: &dyn SensorQuery,
    rng: &mut impl Rng,
) -> RankedDirection {
    let direction = direction_from_yaw(yaw);
    let (a, b) = genome.random_utility;
    let mut utility = random_between(rng, a.min(b), a.max(b));
    if let Some(hit) = sensors.raycast(position, &direction, genome.sight) {
        let weights = genome.weights_for(hit.category);
        let proximity = 1.0 - hit.distance / genome.sight;
        utility = proximity * weights.distance_factor + weights.weight;
    }
    RankedDirection { direction, utility }
}

/// Scores the candidate pointing at the genome's checkpoint, if it earns a
/// strictly positive utility.
fn checkpoint_candidate(
    position: &Array1<f32>,
    genome: &Genome,
    points_gathered: f32,
) -> Option<RankedDirection> {
    let to_checkpoint = &genome.checkpoint - position;
    let distance = norm(&to_checkpoint);
    let proximity = lerp(
        MIN_CHECKPOINT_PROXIMITY,
        1.0,
        inverse_lerp(CHECKPOINT_URGENCY_RANGE, 0.0, distance),
    );
    let utility = (proximity * genome.checkpoint_distance_factor + genome.checkpoint_weight)
        * (points_gathered * genome.points_weight);
    if utility > 0.0 {
        Some(RankedDirection {
            direction: flattened(&to_checkpoint),
            utility,
        })
    } else {
        None
    }
}

fn random_between(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}
