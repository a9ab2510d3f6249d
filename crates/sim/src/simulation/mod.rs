//! Simulation engine and population management.
//!
//! The most commonly used simulation types are re-exported here so consumers
//! can import them from `mendel_sim::simulation`:
//!
//! - `Simulation`: the generation driver.
//! - `Config`: the TOML-backed run configuration.
//! - `Models`: the algorithm choices bound from a `Config`.
//! - `Population`: the individuals of one generation.

pub mod configs;
pub mod engine;
pub mod models;
pub mod population;
pub mod workers;

pub use configs::{
    BasicConfig, ComputationConfig, Config, MutationsConfig, PopulationConfig, SelectionConfig,
};
pub use engine::{GenerationReport, Simulation, StopReason};
pub use models::{InitialAlleles, Models};
pub use population::{FitnessMoments, IndivRef, Population, PopulationPart, PopulationStats};
pub use workers::Workers;
