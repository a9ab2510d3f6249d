//! The mating worker pool.

use crate::base::{seeded, SimRng};
use crate::errors::SimulationError;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// A dedicated rayon pool plus the seed counter for worker generators.
///
/// Worker 0 always runs on a copy of the primary generator and hands its state
/// back when mating ends, so a single-worker run consumes exactly one random
/// stream. Workers 1 and up get fresh generators seeded from a counter that
/// starts at the configured seed.
pub struct Workers {
    pool: ThreadPool,
    next_seed: u64,
}

impl std::fmt::Debug for Workers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workers")
            .field("num_workers", &self.num_workers())
            .field("next_seed", &self.next_seed)
            .finish()
    }
}

impl Workers {
    /// `num_threads == 0` sizes the pool to the available cores.
    pub fn new(num_threads: usize, seed: u64) -> Result<Self, SimulationError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("mendel-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            next_seed: seed,
        })
    }

    pub fn num_workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Generators for `n` workers; the first continues `primary`.
    pub fn rngs(&mut self, primary: &SimRng, n: usize) -> Vec<SimRng> {
        let mut rngs = Vec::with_capacity(n);
        if n == 0 {
            return rngs;
        }
        rngs.push(primary.clone());
        for _ in 1..n {
            self.next_seed = self.next_seed.wrapping_add(1);
            rngs.push(seeded(self.next_seed));
        }
        rngs
    }

    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
