//! Bounded random perturbation of genomes between rounds.

use crate::simulation::genome::Genome;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Moving speed paid per unit of sight gained through mutation.
pub const SIGHT_GAIN_SPEED_COST: f32 = 0.0625;
/// Sight paid per unit of moving speed gained through mutation.
pub const SPEED_GAIN_SIGHT_COST: f32 = 0.125;

/// Knobs controlling how hard mutation shakes a genome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationSettings {
    /// Half-width of the uniform interval each mutated value is shifted by.
    pub factor: f32,
    /// Percent chance, per field, that the field is mutated at all.
    pub chance: f32,
}

impl Default for MutationSettings {
    fn default() -> Self {
        Self {
            factor: 1.5,
            chance: 40.0,
        }
    }
}

/// Mutates a genome in place.
///
/// Each evolvable field rolls its own chance and, when it passes, shifts by a
/// uniform draw from `[-factor, factor)`. Fields are visited in a fixed order,
/// so one seed always produces the same offspring. Sight and speed trade off
/// against each other: growing one shaves a fraction off the other. Hard
/// floors are restored once at the end; there are no upper caps. The
/// checkpoint position and the search flag are inherited untouched.
pub fn mutate(genome: &mut Genome, settings: &MutationSettings, rng: &mut impl Rng) {
    if rolls(rng, settings.chance) {
        genome.ray_count += shift(rng, settings.factor) as i32;
    }
    if rolls(rng, settings.chance) {
        let delta = shift(rng, settings.factor);
        genome.sight += delta;
        if delta > 0.0 {
            genome.move_speed -= delta * SIGHT_GAIN_SPEED_COST;
        }
    }
    if rolls(rng, settings.chance) {
        let delta = shift(rng, settings.factor);
        genome.move_speed += delta;
        if delta > 0.0 {
            genome.sight -= delta * SPEED_GAIN_SIGHT_COST;
        }
    }
    if rolls(rng, settings.chance) {
        genome.random_utility.0 += shift(rng, settings.factor);
    }
    if rolls(rng, settings.chance) {
        genome.random_utility.1 += shift(rng, settings.factor);
    }
    for weights in [
        &mut genome.box_weights,
        &mut genome.boat_weights,
        &mut genome.enemy_weights,
        &mut genome.navy_weights,
    ] {
        if rolls(rng, settings.chance) {
            weights.weight += shift(rng, settings.factor);
        }
        if rolls(rng, settings.chance) {
            weights.distance_factor += shift(rng, settings.factor);
        }
    }
    if rolls(rng, settings.chance) {
        genome.checkpoint_distance_factor += shift(rng, settings.factor);
    }
    if rolls(rng, settings.chance) {
        genome.checkpoint_weight += shift(rng, settings.factor);
    }
    if rolls(rng, settings.chance) {
        genome.points_weight += shift(rng, settings.factor);
    }
    genome.clamp_floors();
}

fn rolls(rng: &mut impl Rng, chance: f32) -> bool {
    rng.random_range(0.0..100.0) <= chance
}

fn shift(rng: &mut impl Rng, factor: f32) -> f32 {
    if factor > 0.0 {
        rng.random_range(-factor..factor)
    } else {
        0.0
    }
}
