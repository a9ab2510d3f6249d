//! Base services used by every other module.
//!
//! This module provides the seedable random number generator, the sampling
//! helpers built on it, and the mutation-ID allocator.

pub mod random;
mod unique_id;

pub use random::{random_round, seeded, SimRng};
pub use unique_id::{IdRange, IdSource, UniqueIdAllocator};
