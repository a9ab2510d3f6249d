//! Genome structures: mutations, linkage blocks, chromosomes and individuals.
//!
//! Linkage blocks are the unit of inheritance. A child's block starts out
//! sharing its parent's mutation buffer and only copies it on the first
//! appended mutation.

mod chromosome;
mod individual;
mod linkage_block;
mod mutation;

pub use chromosome::Chromosome;
pub use individual::Individual;
pub use linkage_block::LinkageBlock;
pub use mutation::{Mutation, MutationKind, MutationStats};
