//! Genotypic fitness and selection noise.
//!
//! Selection ranks individuals by a phenotypic fitness: the genotypic fitness
//! plus an environmental noise term, optionally divided by a random
//! selection-noise factor. The population then keeps the top of the ranking.
//!
//! ## Selection models
//! - **Full truncation**: `g + u1 * noise`. Ranking is almost deterministic.
//! - **UPS** (unrestricted probability selection): `(g + u1 * noise) / u2`.
//! - **SPPS** (strict proportionality probability selection): the UPS value
//!   scaled by the population maximum; anything below 1 dies outright.
//! - **Partial truncation**: `(g + u1 * noise) / (theta + (1 - theta) * u2)`.
//!
//! Dead individuals always rank first with a phenotypic fitness of 0.

use crate::genome::{Chromosome, Individual};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Guards the selection-noise divisor against a zero draw.
const NOISE_EPSILON: f64 = 1e-15;

/// How the chromosome effects combine into genotypic fitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitnessModel {
    /// `1 + sum of chromosome effects` over both chromosome sets.
    #[default]
    Additive,
}

impl FitnessModel {
    #[inline]
    pub fn geno_fitness(&self, dad: &[Chromosome], mom: &[Chromosome]) -> f64 {
        match self {
            Self::Additive => {
                let effects: f64 = dad
                    .iter()
                    .chain(mom)
                    .map(|chr| chr.fitness_effect() as f64)
                    .sum();
                1.0 + effects
            }
        }
    }
}

/// Name of the selection model as written in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionKind {
    #[serde(rename = "fulltrunc")]
    FullTruncation,
    #[serde(rename = "ups")]
    Ups,
    #[serde(rename = "spps")]
    Spps,
    #[serde(rename = "partialtrunc")]
    PartialTruncation,
}

/// A selection model with its parameters resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionModel {
    FullTruncation,
    Ups,
    Spps,
    PartialTruncation { theta: f64 },
}

impl SelectionModel {
    pub fn new(kind: SelectionKind, partial_truncation_value: f64) -> Self {
        match kind {
            SelectionKind::FullTruncation => Self::FullTruncation,
            SelectionKind::Ups => Self::Ups,
            SelectionKind::Spps => Self::Spps,
            SelectionKind::PartialTruncation => Self::PartialTruncation {
                theta: partial_truncation_value,
            },
        }
    }

    /// Environmental noise from the pre-selection fitness variance.
    ///
    /// `heritability` must be in `(0, 1]`.
    pub fn environmental_noise(
        fitness_variance: f64,
        heritability: f64,
        non_scaling_noise: f64,
    ) -> f64 {
        (fitness_variance * (1.0 - heritability) / heritability
            + non_scaling_noise * non_scaling_noise)
            .sqrt()
    }

    /// Set the phenotypic fitness of every individual.
    ///
    /// Draws are taken in slice order.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        individuals: &mut [&mut Individual],
        env_noise: f64,
        rng: &mut R,
    ) {
        match *self {
            Self::FullTruncation => {
                for ind in individuals.iter_mut() {
                    if Self::clear_dead(ind) {
                        continue;
                    }
                    let noisy = Self::noisy(ind, env_noise, rng);
                    ind.set_pheno_fitness(noisy);
                }
            }
            Self::Ups => {
                for ind in individuals.iter_mut() {
                    if Self::clear_dead(ind) {
                        continue;
                    }
                    let noisy = Self::noisy(ind, env_noise, rng);
                    let u2 = rng.random::<f64>();
                    ind.set_pheno_fitness(noisy / (u2 + NOISE_EPSILON));
                }
            }
            Self::PartialTruncation { theta } => {
                for ind in individuals.iter_mut() {
                    if Self::clear_dead(ind) {
                        continue;
                    }
                    let noisy = Self::noisy(ind, env_noise, rng);
                    let u2 = rng.random::<f64>();
                    ind.set_pheno_fitness(noisy / (theta + (1.0 - theta) * u2));
                }
            }
            Self::Spps => {
                let mut max = f64::MIN;
                for ind in individuals.iter_mut() {
                    if Self::clear_dead(ind) {
                        continue;
                    }
                    let noisy = Self::noisy(ind, env_noise, rng);
                    max = max.max(noisy);
                    ind.set_pheno_fitness(noisy);
                }
                if max <= 0.0 {
                    return;
                }
                for ind in individuals.iter_mut() {
                    if ind.is_dead() {
                        continue;
                    }
                    let u2 = rng.random::<f64>();
                    let pheno = ind.pheno_fitness() / max / (u2 + NOISE_EPSILON);
                    if pheno < 1.0 {
                        ind.kill();
                    } else {
                        ind.set_pheno_fitness(pheno);
                    }
                }
            }
        }
    }

    /// Reset a dead individual's phenotype. Returns whether it is dead.
    #[inline]
    fn clear_dead(ind: &mut Individual) -> bool {
        if ind.is_dead() {
            ind.set_pheno_fitness(0.0);
            true
        } else {
            false
        }
    }

    #[inline]
    fn noisy<R: Rng + ?Sized>(ind: &Individual, env_noise: f64, rng: &mut R) -> f64 {
        ind.geno_fitness() + rng.random::<f64>() * env_noise
    }
}
