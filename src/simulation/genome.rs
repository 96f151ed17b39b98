//! Heritable steering parameters and their validation.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

/// Smallest useful ray fan.
pub const MIN_RAY_COUNT: i32 = 1;
/// Shortest sight range an agent may shrink to.
pub const MIN_SIGHT: f32 = 0.1;
/// Slowest speed an agent may shrink to.
pub const MIN_MOVE_SPEED: f32 = 1.0;

/// What a vision ray can report hitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// A floating cargo box.
    CargoBox,
    /// A trading boat hull.
    Boat,
    /// A pirate hull.
    Enemy,
    /// A navy hull.
    Navy,
}

/// Utility weighting for one sensed category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    /// Flat utility added whenever the category is sighted.
    pub weight: f32,
    /// Utility scaled by proximity: closer sightings contribute more.
    pub distance_factor: f32,
}

/// Validation failure for a [`Genome`].
#[derive(Debug, Error)]
pub enum GenomeError {
    /// The ray fan would be empty.
    #[error("ray count must be at least {MIN_RAY_COUNT}, got {0}")]
    RayCountTooLow(i32),
    /// Sight below the hard floor.
    #[error("sight must be at least {MIN_SIGHT}, got {0}")]
    SightTooShort(f32),
    /// Moving speed below the hard floor.
    #[error("moving speed must be at least {MIN_MOVE_SPEED}, got {0}")]
    MoveSpeedTooLow(f32),
    /// A parameter is NaN or infinite.
    #[error("genome field `{0}` is not finite")]
    NotFinite(&'static str),
}

/// The full set of heritable parameters steering one agent.
///
/// A genome is copied verbatim from parent to child at spawn time and then
/// perturbed by mutation. Everything an agent decides with lives here; the
/// points counters and liveness flags do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Number of ray steps in the vision fan. The fan casts one ray more than
    /// this, closing the sweep symmetrically around the forward heading.
    pub ray_count: i32,
    /// Maximum distance a ray can see.
    pub sight: f32,
    /// Distance covered per second when moving.
    pub move_speed: f32,
    /// Bounds for the fallback utility of rays that hit nothing. The two
    /// values may be stored in either order.
    pub random_utility: (f32, f32),
    /// Weighting applied to sighted cargo boxes.
    pub box_weights: CategoryWeights,
    /// Weighting applied to sighted boats.
    pub boat_weights: CategoryWeights,
    /// Weighting applied to sighted pirates.
    pub enemy_weights: CategoryWeights,
    /// Weighting applied to sighted navy vessels.
    pub navy_weights: CategoryWeights,
    /// Where this agent's drop-off checkpoint sits.
    pub checkpoint: Array1<f32>,
    /// Flat utility of heading for the checkpoint.
    pub checkpoint_weight: f32,
    /// Proximity-scaled utility of heading for the checkpoint.
    pub checkpoint_distance_factor: f32,
    /// Multiplier turning carried points into checkpoint urgency.
    pub points_weight: f32,
    /// Whether the agent considers its checkpoint at all.
    pub search_for_checkpoint: bool,
}

impl Genome {
    /// Angle in degrees between adjacent rays of the fan: 360 divided by the
    /// ray count, truncating.
    pub fn step_angle(&self) -> i32 {
        360 / self.ray_count
    }

    /// Looks up the weighting for a sensed category.
    pub fn weights_for(&self, category: Category) -> CategoryWeights {
        match category {
            Category::CargoBox => self.box_weights,
            Category::Boat => self.boat_weights,
            Category::Enemy => self.enemy_weights,
            Category::Navy => self.navy_weights,
        }
    }

    /// Pulls mutated values back above their hard floors.
    pub fn clamp_floors(&mut self) {
        self.ray_count = self.ray_count.max(MIN_RAY_COUNT);
        self.sight = self.sight.max(MIN_SIGHT);
        self.move_speed = self.move_speed.max(MIN_MOVE_SPEED);
    }

    /// Checks the genome against its hard floors and for non-finite values.
    ///
    /// # Returns
    ///
    /// `Ok(())` when every parameter is usable, otherwise the first violation
    /// found.
    pub fn validate(&self) -> Result<(), GenomeError> {
        if self.ray_count < MIN_RAY_COUNT {
            return Err(GenomeError::RayCountTooLow(self.ray_count));
        }
        if !self.sight.is_finite() {
            return Err(GenomeError::NotFinite("sight"));
        }
        if self.sight < MIN_SIGHT {
            return Err(GenomeError::SightTooShort(self.sight));
        }
        if !self.move_speed.is_finite() {
            return Err(GenomeError::NotFinite("move_speed"));
        }
        if self.move_speed < MIN_MOVE_SPEED {
            return Err(GenomeError::MoveSpeedTooLow(self.move_speed));
        }
        if !self.random_utility.0.is_finite() || !self.random_utility.1.is_finite() {
            return Err(GenomeError::NotFinite("random_utility"));
        }
        for (name, weights) in [
            ("box_weights", &self.box_weights),
            ("boat_weights", &self.boat_weights),
            ("enemy_weights", &self.enemy_weights),
            ("navy_weights", &self.navy_weights),
        ] {
            if !weights.weight.is_finite() || !weights.distance_factor.is_finite() {
                return Err(GenomeError::NotFinite(name));
            }
        }
        if self.checkpoint.iter().any(|c| !c.is_finite()) {
            return Err(GenomeError::NotFinite("checkpoint"));
        }
        if !self.checkpoint_weight.is_finite() || !self.checkpoint_distance_factor.is_finite() {
            return Err(GenomeError::NotFinite("checkpoint_weight"));
        }
        if !self.points_weight.is_finite() {
            return Err(GenomeError::NotFinite("points_weight"));
        }
        Ok(())
    }

    /// Renders the genome as the parameter block of a winner report.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Ray Count: {}", self.ray_count);
        let _ = writeln!(out, "Step Angle: {}", self.step_angle());
        let _ = writeln!(out, "Sight: {}", self.sight);
        let _ = writeln!(out, "Moving Speed: {}", self.move_speed);
        let _ = writeln!(
            out,
            "Random Utility Range: ({}, {})",
            self.random_utility.0, self.random_utility.1
        );
        let _ = writeln!(out);
        for (name, weights) in [
            ("Box", &self.box_weights),
            ("Boat", &self.boat_weights),
            ("Enemy", &self.enemy_weights),
            ("Navy", &self.navy_weights),
        ] {
            let _ = writeln!(out, "{} Weight: {}", name, weights.weight);
            let _ = writeln!(out, "{} Distance Factor: {}", name, weights.distance_factor);
        }
        let _ = writeln!(out, "Checkpoint Weight: {}", self.checkpoint_weight);
        let _ = writeln!(
            out,
            "Checkpoint Distance Factor: {}",
            self.checkpoint_distance_factor
        );
        let _ = writeln!(out, "Gathered Points Weight: {}", self.points_weight);
        out
    }
}
