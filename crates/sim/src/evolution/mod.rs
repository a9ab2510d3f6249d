//! Evolution module: the interchangeable models of a run.
//!
//! - **Mutation**: how many new mutations an offspring gets and their effects
//! - **Recombination**: which parental linkage blocks end up in a gamete
//! - **Reproduction**: how many offspring a mating pair has
//! - **Selection**: fitness aggregation and the culling rule
//! - **Growth**: the population size targeted each generation

pub mod growth;
pub mod mutation;
pub mod recombination;
pub mod reproduction;
pub mod selection;

pub use growth::{GrowthKind, GrowthModel};
pub use mutation::{
    FitnessEffectLaw, FitnessEffectModel, InitialAlleleLaw, InitialAlleleModel, MutationModel,
    MutationRateModel, INITIAL_ALLELE_EXPRESSION,
};
pub use recombination::{CrossoverKind, CrossoverModel};
pub use reproduction::{OffspringKind, OffspringModel};
pub use selection::{FitnessModel, SelectionKind, SelectionModel};
