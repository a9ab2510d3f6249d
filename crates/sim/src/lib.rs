//! # Mendel Simulation Crate
//!
//! The `mendel_sim` crate is a forward-time simulator of mutation
//! accumulation in a sexually reproducing diploid population. It includes
//! modules for the genome data model, the evolutionary models (mutation,
//! recombination, reproduction, selection, growth), the generation driver,
//! allele-frequency analysis and output recording.

pub mod analysis;
pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;
pub mod storage;

pub use errors::{ConfigError, OutputError, SimulationError};
pub use simulation::{Config, Simulation};
