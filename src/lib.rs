//! # Flotilla - Evolving Boats, Pirates, and Navy Patrols
//!
//! A small artificial-life simulation. Three species of vessels share one
//! arena: boats gather cargo and run it home, pirates raid the boats, and the
//! navy hunts the pirates. Every vessel steers by fanning vision rays out
//! around its heading and scoring candidate directions with weights from its
//! genome. At the end of each timed round the best performer of every species
//! seeds the next generation, with bounded random mutation on top.
//!
//! ## Features
//!
//! - Utility-based steering over a genome-weighted vision ray fan
//! - Three species differentiated purely by data-driven collision policies
//! - Checkpoint banking with optional carried-points gating
//! - Genetic algorithm with single-winner selection and coupled trade-off
//!   mutation
//! - Deterministic rounds from a fixed per-round seed
//! - Append-only winner reports and resumable evolution snapshots
//!
//! ## Core Modules
//!
//! - [`simulation::steering`] - Ranked-utility direction selection
//! - [`simulation::agent`] - Vessels and their species policies
//! - [`simulation::world`] - Arena state and the tick loop
//! - [`simulation::mutation`] - Bounded genome perturbation
//! - [`simulation::generation`] - Rounds, evaluation, and respawning

/// Core simulation logic and data structures.
pub mod simulation {
    /// Vessels, species, and data-driven collision policies.
    pub mod agent;
    /// Cargo boxes, spawn areas, and the spatial index for sensing.
    pub mod arena;
    /// Round timing decoupled from wall-clock time.
    pub mod clock;
    /// Contact events and their serial application.
    pub mod events;
    /// The generational loop over timed rounds.
    pub mod generation;
    /// Heritable steering parameters and their validation.
    pub mod genome;
    /// Geometric utility functions for headings and rays.
    pub mod geometric_utils;
    /// Bounded random perturbation of genomes.
    pub mod mutation;
    /// Run configuration loadable from TOML.
    pub mod params;
    /// Winner reports and evolution snapshots on disk.
    pub mod report;
    /// Seeded random number generation for reproducible rounds.
    pub mod rng;
    /// Utility-driven direction selection.
    pub mod steering;
    /// World state for one round and the tick that advances it.
    pub mod world;
}
