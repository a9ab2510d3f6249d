//! Mutation laws: how many new mutations an offspring receives, what kind
//! each one is, and how strongly it affects fitness.
//!
//! ## Mutation count
//! - **Fixed**: the configured rate, randomly rounded to an integer.
//! - **Poisson**: a Poisson draw with the configured rate as its mean.
//!
//! ## Fitness effect
//! - **Uniform**: magnitude uniform in `[0, high_impact_mutn_fraction)`.
//! - **Weibull**: the Mendel parameterization, where most mutations are nearly
//!   neutral and a `high_impact_mutn_fraction` of them exceed
//!   `high_impact_mutn_threshold`.
//! - **Fixed**: a configured constant.
//!
//! Deleterious effects are negative, favorable ones positive. The expressed
//! effect is the drawn effect scaled by the dominant or recessive
//! heterozygous expression.

use crate::base::random::{poisson, random_round};
use crate::errors::ConfigError;
use crate::genome::MutationKind;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Law for the number of new mutations per offspring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationRateModel {
    Fixed,
    Poisson,
}

/// Name of the fitness-effect law as written in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessEffectModel {
    Uniform,
    Weibull,
    Fixed,
}

/// A fitness-effect law with its parameters resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitnessEffectLaw {
    Uniform {
        max_magnitude: f64,
    },
    Weibull {
        alpha_del: f64,
        gamma_del: f64,
        alpha_fav: f64,
        gamma_fav: f64,
        max_fav_fitness_gain: f64,
    },
    Fixed {
        deleterious: f64,
        favorable: f64,
    },
}

impl FitnessEffectLaw {
    /// Resolve the Weibull shape from the genome size and the high-impact
    /// fraction/threshold pair.
    pub fn weibull(
        genome_size: f64,
        high_impact_mutn_fraction: f64,
        high_impact_mutn_threshold: f64,
        max_fav_fitness_gain: f64,
    ) -> Result<Self, ConfigError> {
        if genome_size <= 1.0 {
            return Err(ConfigError::invalid("genome_size", "must be greater than 1"));
        }
        if !(high_impact_mutn_fraction > 0.0 && high_impact_mutn_fraction < 1.0) {
            return Err(ConfigError::invalid(
                "high_impact_mutn_fraction",
                "must be in (0, 1) for the weibull model",
            ));
        }
        if !(high_impact_mutn_threshold > 0.0 && high_impact_mutn_threshold < 1.0) {
            return Err(ConfigError::invalid(
                "high_impact_mutn_threshold",
                "must be in (0, 1) for the weibull model",
            ));
        }

        let alpha_del = genome_size.ln();
        let gamma_del = Self::gamma(alpha_del, high_impact_mutn_fraction, high_impact_mutn_threshold);

        let alpha_fav = if max_fav_fitness_gain > 0.0 {
            (genome_size * max_fav_fitness_gain).ln()
        } else {
            alpha_del
        };
        let gamma_fav = Self::gamma(alpha_fav, high_impact_mutn_fraction, high_impact_mutn_threshold);

        if !(gamma_del.is_finite() && gamma_del > 0.0) {
            return Err(ConfigError::invalid(
                "high_impact_mutn_threshold",
                format!("yields a non-positive weibull shape ({gamma_del})"),
            ));
        }
        if max_fav_fitness_gain > 0.0 && !(gamma_fav.is_finite() && gamma_fav > 0.0) {
            return Err(ConfigError::invalid(
                "max_fav_fitness_gain",
                format!("yields a non-positive weibull shape ({gamma_fav})"),
            ));
        }

        Ok(Self::Weibull {
            alpha_del,
            gamma_del,
            alpha_fav,
            gamma_fav,
            max_fav_fitness_gain,
        })
    }

    fn gamma(alpha: f64, fraction: f64, threshold: f64) -> f64 {
        (-threshold.ln() / alpha).ln() / fraction.ln()
    }

    /// Unscaled effect of a deleterious mutation (always `<= 0`).
    #[inline]
    pub fn deleterious<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Uniform { max_magnitude } => -rng.random::<f64>() * max_magnitude,
            Self::Weibull {
                alpha_del,
                gamma_del,
                ..
            } => -(-alpha_del * rng.random::<f64>().powf(gamma_del)).exp(),
            Self::Fixed { deleterious, .. } => -deleterious.abs(),
        }
    }

    /// Unscaled effect of a favorable mutation (always `>= 0`).
    #[inline]
    pub fn favorable<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Uniform { max_magnitude } => rng.random::<f64>() * max_magnitude,
            Self::Weibull {
                alpha_fav,
                gamma_fav,
                max_fav_fitness_gain,
                ..
            } => max_fav_fitness_gain * (-alpha_fav * rng.random::<f64>().powf(gamma_fav)).exp(),
            Self::Fixed { favorable, .. } => favorable.abs(),
        }
    }
}

/// Everything needed to create one new mutation.
#[derive(Debug, Clone)]
pub struct MutationModel {
    /// Mean number of new mutations per offspring.
    pub rate: f64,
    pub rate_model: MutationRateModel,
    /// Probability that a new mutation is neutral.
    pub fraction_neutral: f64,
    /// Probability that a non-neutral mutation is favorable.
    pub frac_fav_mutn: f64,
    pub fraction_recessive: f64,
    pub recessive_hetero_expression: f64,
    pub dominant_hetero_expression: f64,
    pub effect_law: FitnessEffectLaw,
    /// Non-neutral mutations with a smaller expressed magnitude are counted
    /// but not stored.
    pub tracking_threshold: f32,
    pub track_neutrals: bool,
}

impl MutationModel {
    /// Number of new mutations for one offspring.
    #[inline]
    pub fn num_mutations<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match self.rate_model {
            MutationRateModel::Fixed => random_round(rng, self.rate),
            MutationRateModel::Poisson => poisson(rng, self.rate),
        }
    }

    /// Classify a new mutation and draw its expressed fitness effect.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> (MutationKind, f32) {
        if self.fraction_neutral > 0.0 && rng.random::<f64>() < self.fraction_neutral {
            return (MutationKind::Neutral, 0.0);
        }

        let favorable = self.frac_fav_mutn > 0.0 && rng.random::<f64>() < self.frac_fav_mutn;
        let recessive =
            self.fraction_recessive > 0.0 && rng.random::<f64>() < self.fraction_recessive;
        let expression = if recessive {
            self.recessive_hetero_expression
        } else {
            self.dominant_hetero_expression
        };

        match (favorable, recessive) {
            (false, false) => (
                MutationKind::DeleteriousDominant,
                (self.effect_law.deleterious(rng) * expression) as f32,
            ),
            (false, true) => (
                MutationKind::DeleteriousRecessive,
                (self.effect_law.deleterious(rng) * expression) as f32,
            ),
            (true, false) => (
                MutationKind::FavorableDominant,
                (self.effect_law.favorable(rng) * expression) as f32,
            ),
            (true, true) => (
                MutationKind::FavorableRecessive,
                (self.effect_law.favorable(rng) * expression) as f32,
            ),
        }
    }

    /// Whether a mutation of this kind and effect keeps a full record.
    #[inline]
    pub fn tracks(&self, kind: MutationKind, fitness_effect: f32) -> bool {
        if kind == MutationKind::Neutral {
            self.track_neutrals
        } else {
            fitness_effect.abs() >= self.tracking_threshold
        }
    }
}

/// Name of the initial-allele effect law as written in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialAlleleModel {
    Uniform,
    Fixed,
}

/// Expression factor applied to each seeded contrasting allele.
pub const INITIAL_ALLELE_EXPRESSION: f64 = 0.5;

/// Magnitude law for the contrasting allele pairs seeded at genesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialAlleleLaw {
    pub model: InitialAlleleModel,
    /// Mean unexpressed magnitude of one allele.
    pub mean_effect: f64,
}

impl InitialAlleleLaw {
    /// Spread `max_total_fitness_increase` over `num_contrasting_alleles` pairs.
    pub fn new(
        model: InitialAlleleModel,
        max_total_fitness_increase: f64,
        num_contrasting_alleles: u32,
    ) -> Self {
        let mean_effect = if num_contrasting_alleles == 0 {
            0.0
        } else {
            max_total_fitness_increase / num_contrasting_alleles as f64
        };
        Self { model, mean_effect }
    }

    /// Expressed magnitude `e` of one allele; the pair is `(+e, -e)`.
    #[inline]
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let raw = match self.model {
            InitialAlleleModel::Uniform => rng.random::<f64>() * 2.0 * self.mean_effect,
            InitialAlleleModel::Fixed => self.mean_effect,
        };
        (raw * INITIAL_ALLELE_EXPRESSION) as f32
    }
}
