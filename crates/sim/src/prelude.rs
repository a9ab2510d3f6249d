//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use mendel_sim::prelude::*;
//!
//! let config = Config::default();
//! let models = Models::from_config(&config).unwrap();
//! assert_eq!(models.selection, SelectionModel::Spps);
//! ```

pub use crate::analysis::{AlleleCount, AlleleHistogram};
pub use crate::errors::{self, ConfigError, OutputError, SimulationError};
pub use crate::evolution::{
    CrossoverModel, FitnessModel, GrowthModel, MutationModel, OffspringModel, SelectionModel,
};
pub use crate::genome::{Chromosome, Individual, LinkageBlock, Mutation, MutationKind};
pub use crate::simulation::{Config, Models, Population, PopulationStats, Simulation, StopReason};
pub use crate::storage::Recorder;
