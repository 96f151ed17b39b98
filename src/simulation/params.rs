//! Run configuration, loadable from a TOML file.

use crate::simulation::agent::Species;
use crate::simulation::arena::SpawnArea;
use crate::simulation::genome::{CategoryWeights, Genome, GenomeError};
use crate::simulation::mutation::MutationSettings;
use crate::simulation::steering::CheckpointGate;
use crate::simulation::world::ContactRadii;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Configuration failure while loading or validating parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// The config file could not be read.
    #[error("failed to read config file {}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for these parameters.
    #[error("failed to parse config file {}", .path.display())]
    Parse {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// A species' starting genome fails validation.
    #[error("invalid {species} genome")]
    Genome {
        /// Species whose genome is unusable.
        species: Species,
        /// The violated genome constraint.
        #[source]
        source: GenomeError,
    },
    /// A parameter outside the genomes is unusable.
    #[error("configuration error: {0}")]
    Invalid(&'static str),
}

/// Config-facing mirror of [`Genome`], with plain arrays for readable TOML.
/// Scalar fields come first so the serialized form keeps the weight tables at
/// the bottom of each species section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeParams {
    /// Number of ray steps in the vision fan.
    pub ray_count: i32,
    /// Maximum distance a ray can see.
    pub sight: f32,
    /// Distance covered per second when moving.
    pub move_speed: f32,
    /// Bounds of the fallback utility for empty rays, in either order.
    pub random_utility: (f32, f32),
    /// Where the species' checkpoint sits.
    pub checkpoint: [f32; 3],
    /// Flat utility of heading for the checkpoint.
    pub checkpoint_weight: f32,
    /// Proximity-scaled utility of heading for the checkpoint.
    pub checkpoint_distance_factor: f32,
    /// Multiplier turning carried points into checkpoint urgency.
    pub points_weight: f32,
    /// Whether the species considers its checkpoint at all.
    pub search_for_checkpoint: bool,
    /// Weighting for sighted cargo boxes.
    pub box_weights: CategoryWeights,
    /// Weighting for sighted boats.
    pub boat_weights: CategoryWeights,
    /// Weighting for sighted pirates.
    pub enemy_weights: CategoryWeights,
    /// Weighting for sighted navy vessels.
    pub navy_weights: CategoryWeights,
}

impl GenomeParams {
    /// Builds the runtime genome these parameters describe.
    pub fn build(&self) -> Genome {
        Genome {
            ray_count: self.ray_count,
            sight: self.sight,
            move_speed: self.move_speed,
            random_utility: self.random_utility,
            box_weights: self.box_weights,
            boat_weights: self.boat_weights,
            enemy_weights: self.enemy_weights,
            navy_weights: self.navy_weights,
            checkpoint: Array1::from_vec(self.checkpoint.to_vec()),
            checkpoint_weight: self.checkpoint_weight,
            checkpoint_distance_factor: self.checkpoint_distance_factor,
            points_weight: self.points_weight,
            search_for_checkpoint: self.search_for_checkpoint,
        }
    }
}

/// Per-species run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// How many parent slots the species' pool holds.
    pub parent_count: usize,
    /// Whether the species takes part in selection and mutation. A frozen
    /// species respawns from its configured genome every round.
    pub evolve: bool,
    /// Where and how many agents of the species spawn.
    pub area: SpawnArea,
    /// When carried points unlock checkpoint steering.
    pub gate: CheckpointGate,
    /// Starting genome for the first generation.
    pub genome: GenomeParams,
}

impl SpeciesParams {
    /// Built-in configuration for a species.
    pub fn default_for(species: Species) -> Self {
        match species {
            Species::Boat => Self {
                parent_count: 3,
                evolve: true,
                area: SpawnArea {
                    center: [-80.0, 0.0, 0.0],
                    extents: [10.0, 0.0, 40.0],
                    count: 8,
                },
                gate: CheckpointGate {
                    cap_access: true,
                    min_points: 6.0,
                },
                genome: GenomeParams {
                    ray_count: 16,
                    sight: 10.0,
                    move_speed: 10.0,
                    random_utility: (0.0, 2.0),
                    checkpoint: [-100.0, 0.0, 0.0],
                    checkpoint_weight: 2.0,
                    checkpoint_distance_factor: 3.0,
                    points_weight: 0.5,
                    search_for_checkpoint: true,
                    box_weights: CategoryWeights {
                        weight: 5.0,
                        distance_factor: 2.0,
                    },
                    boat_weights: CategoryWeights {
                        weight: -1.0,
                        distance_factor: 0.0,
                    },
                    enemy_weights: CategoryWeights {
                        weight: -8.0,
                        distance_factor: -4.0,
                    },
                    navy_weights: CategoryWeights {
                        weight: 0.0,
                        distance_factor: 0.0,
                    },
                },
            },
            Species::Pirate => Self {
                parent_count: 2,
                evolve: true,
                area: SpawnArea {
                    center: [80.0, 0.0, 0.0],
                    extents: [10.0, 0.0, 40.0],
                    count: 6,
                },
                gate: CheckpointGate {
                    cap_access: false,
                    min_points: 0.0,
                },
                genome: GenomeParams {
                    ray_count: 12,
                    sight: 12.0,
                    move_speed: 11.0,
                    random_utility: (0.0, 2.0),
                    checkpoint: [100.0, 0.0, 0.0],
                    checkpoint_weight: 2.0,
                    checkpoint_distance_factor: 3.0,
                    points_weight: 0.3,
                    search_for_checkpoint: true,
                    box_weights: CategoryWeights {
                        weight: 0.5,
                        distance_factor: 0.5,
                    },
                    boat_weights: CategoryWeights {
                        weight: 8.0,
                        distance_factor: 3.0,
                    },
                    enemy_weights: CategoryWeights {
                        weight: -1.0,
                        distance_factor: 0.0,
                    },
                    navy_weights: CategoryWeights {
                        weight: -10.0,
                        distance_factor: -5.0,
                    },
                },
            },
            Species::Navy => Self {
                parent_count: 2,
                evolve: true,
                area: SpawnArea {
                    center: [0.0, 0.0, 80.0],
                    extents: [40.0, 0.0, 10.0],
                    count: 4,
                },
                gate: CheckpointGate {
                    cap_access: false,
                    min_points: 0.0,
                },
                genome: GenomeParams {
                    ray_count: 12,
                    sight: 14.0,
                    move_speed: 12.0,
                    random_utility: (0.0, 2.0),
                    checkpoint: [0.0, 0.0, 100.0],
                    checkpoint_weight: 1.0,
                    checkpoint_distance_factor: 1.0,
                    points_weight: 0.2,
                    search_for_checkpoint: true,
                    box_weights: CategoryWeights {
                        weight: 0.5,
                        distance_factor: 0.0,
                    },
                    boat_weights: CategoryWeights {
                        weight: 0.0,
                        distance_factor: 0.0,
                    },
                    enemy_weights: CategoryWeights {
                        weight: 10.0,
                        distance_factor: 5.0,
                    },
                    navy_weights: CategoryWeights {
                        weight: -1.0,
                        distance_factor: 0.0,
                    },
                },
            },
        }
    }
}

/// Everything a run needs to know, loadable from TOML.
///
/// Sections absent from a config file keep their built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Simulated seconds per round.
    pub round_duration: f32,
    /// Multiplier applied to every tick.
    pub time_scale: f32,
    /// Seed the per-round random stream restarts from.
    pub round_seed: u64,
    /// Directory winner reports and snapshots are written to.
    pub artifacts_dir: PathBuf,
    /// How hard mutation shakes genomes between rounds.
    pub mutation: MutationSettings,
    /// Contact distances used by sensing and overlap tests.
    pub radii: ContactRadii,
    /// Patches of water cargo boxes scatter over each round.
    pub box_areas: Vec<SpawnArea>,
    /// Trader cohort configuration.
    pub boat: SpeciesParams,
    /// Pirate cohort configuration.
    pub pirate: SpeciesParams,
    /// Navy cohort configuration.
    pub navy: SpeciesParams,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            round_duration: 60.0,
            time_scale: 1.0,
            round_seed: 6,
            artifacts_dir: PathBuf::from("reports"),
            mutation: MutationSettings::default(),
            radii: ContactRadii {
                body_radius: 1.5,
                pickup_radius: 2.0,
                contact_radius: 2.0,
                checkpoint_radius: 5.0,
            },
            box_areas: vec![
                SpawnArea {
                    center: [0.0, 0.0, 0.0],
                    extents: [60.0, 0.0, 60.0],
                    count: 30,
                },
                SpawnArea {
                    center: [0.0, 0.0, -40.0],
                    extents: [30.0, 0.0, 20.0],
                    count: 10,
                },
            ],
            boat: SpeciesParams::default_for(Species::Boat),
            pirate: SpeciesParams::default_for(Species::Pirate),
            navy: SpeciesParams::default_for(Species::Navy),
        }
    }
}

impl SimulationParams {
    /// The configuration of one species' cohort.
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Boat => &self.boat,
            Species::Pirate => &self.pirate,
            Species::Navy => &self.navy,
        }
    }

    /// Checks the parameters for values no run could work with.
    pub fn validate(&self) -> Result<(), ParamsError> {
        fn positive(value: f32) -> bool {
            value.is_finite() && value > 0.0
        }
        if !positive(self.round_duration) {
            return Err(ParamsError::Invalid("round_duration must be positive"));
        }
        if !positive(self.time_scale) {
            return Err(ParamsError::Invalid("time_scale must be positive"));
        }
        if !positive(self.radii.body_radius)
            || !positive(self.radii.pickup_radius)
            || !positive(self.radii.contact_radius)
            || !positive(self.radii.checkpoint_radius)
        {
            return Err(ParamsError::Invalid("contact radii must be positive"));
        }
        for species in Species::all() {
            let cohort = self.species(species);
            if cohort.parent_count == 0 {
                return Err(ParamsError::Invalid("parent_count must be at least 1"));
            }
            cohort
                .genome
                .build()
                .validate()
                .map_err(|source| ParamsError::Genome { species, source })?;
        }
        Ok(())
    }

    /// Loads and validates parameters from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ParamsError> {
        let text = std::fs::read_to_string(path).map_err(|source| ParamsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params: Self = toml::from_str(&text).map_err(|source| ParamsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Loads parameters from a file when it exists, otherwise falls back to
    /// the built-in defaults. A file that exists but does not parse is still
    /// an error rather than a silent fallback.
    pub fn load_or_default(path: &Path) -> Result<Self, ParamsError> {
        if path.exists() {
            Self::from_path(path)
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            let params = Self::default();
            params.validate()?;
            Ok(params)
        }
    }
}
