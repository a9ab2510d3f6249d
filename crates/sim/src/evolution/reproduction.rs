//! Number of offspring produced by one mating pair.

use crate::base::random::random_round;
use crate::genome::Individual;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Name of the offspring model as written in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffspringKind {
    Uniform,
    Fixed,
    /// Offspring count proportional to parental fitness. Not implemented.
    Fitness,
}

/// Offspring-count law with the per-pair mean resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffspringModel {
    /// Uniform on `[1, 2 * mean - 1]`.
    Uniform { mean: f64 },
    /// `mean` randomly rounded to a neighbouring integer.
    Fixed { mean: f64 },
}

impl OffspringModel {
    /// Mean number of offspring per mating pair.
    pub fn mean_per_pair(reproductive_rate: f64, fraction_random_death: f64) -> f64 {
        2.0 * reproductive_rate * (1.0 - fraction_random_death)
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        match *self {
            Self::Uniform { mean } | Self::Fixed { mean } => mean,
        }
    }

    /// Offspring count for the pair led by `_parent`.
    #[inline]
    pub fn num_offspring<R: Rng + ?Sized>(&self, _parent: &Individual, rng: &mut R) -> u32 {
        match *self {
            Self::Uniform { mean } => {
                if mean > 1.0 {
                    let draw = 1.0 + rng.random::<f64>() * (2.0 * mean - 2.0);
                    random_round(rng, draw)
                } else {
                    random_round(rng, mean)
                }
            }
            Self::Fixed { mean } => random_round(rng, mean),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::seeded;

    fn empirical_mean(model: OffspringModel, n: u32) -> f64 {
        let parent = Individual::new(1, 1);
        let mut rng = seeded(11);
        let total: u64 = (0..n)
            .map(|_| model.num_offspring(&parent, &mut rng) as u64)
            .sum();
        total as f64 / n as f64
    }

    #[test]
    fn test_mean_per_pair() {
        assert_eq!(OffspringModel::mean_per_pair(2.0, 0.0), 4.0);
        assert_eq!(OffspringModel::mean_per_pair(1.2, 0.5), 1.2);
    }

    #[test]
    fn test_uniform_mean_within_five_percent() {
        for mu in [1.5, 2.4, 4.0, 6.0] {
            let mean = empirical_mean(OffspringModel::Uniform { mean: mu }, 20_000);
            assert!((mean - mu).abs() / mu < 0.05, "mu {mu} mean {mean}");
        }
    }

    #[test]
    fn test_uniform_range() {
        let parent = Individual::new(1, 1);
        let model = OffspringModel::Uniform { mean: 4.0 };
        let mut rng = seeded(12);
        for _ in 0..5000 {
            let n = model.num_offspring(&parent, &mut rng);
            assert!((1..=7).contains(&n), "{n}");
        }
    }

    #[test]
    fn test_fixed_rounds_to_neighbours() {
        let parent = Individual::new(1, 1);
        let model = OffspringModel::Fixed { mean: 2.4 };
        let mut rng = seeded(13);
        for _ in 0..1000 {
            let n = model.num_offspring(&parent, &mut rng);
            assert!(n == 2 || n == 3);
        }
        let mean = empirical_mean(model, 20_000);
        assert!((mean - 2.4).abs() < 0.05);
    }
}
