//! Random number helpers used throughout the engine.
//!
//! All randomness flows through [`SimRng`], a Xoshiro256++ generator. It is fast,
//! seedable and cheap to clone, so each mating worker can own one.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use rand_xoshiro::Xoshiro256PlusPlus;

/// The generator used by every stage of the simulation.
pub type SimRng = Xoshiro256PlusPlus;

/// Create a generator from a 64-bit seed.
#[inline]
pub fn seeded(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Round `value` up or down at random, weighted by its fractional part.
///
/// The expectation of the result equals `value`, which is what both the fixed
/// mutation-rate law and the fixed offspring law rely on.
#[inline]
pub fn random_round<R: Rng + ?Sized>(rng: &mut R, value: f64) -> u32 {
    if value <= 0.0 {
        return 0;
    }
    let floor = value.floor();
    let fraction = value - floor;
    let mut result = floor as u32;
    if fraction > 0.0 && rng.random::<f64>() < fraction {
        result += 1;
    }
    result
}

/// Draw from a Poisson distribution with mean `lambda`.
///
/// A non-positive or non-finite mean yields zero rather than an error, which
/// lets callers pass a configured rate of 0 straight through.
#[inline]
pub fn poisson<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u32 {
    if !(lambda > 0.0) || !lambda.is_finite() {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(dist) => dist.sample(rng) as u32,
        Err(_) => 0,
    }
}

/// Fair coin flip.
#[inline]
pub fn coin<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random::<f64>() < 0.5
}
