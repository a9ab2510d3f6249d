//! Crossover: how one gamete chromosome is assembled from a parent's two
//! homologous chromosomes.
//!
//! Linkage blocks are never split. A crossover only decides, position by
//! position, which homolog a block is inherited from, and the chosen block is
//! shared into the offspring with [`Chromosome::transfer_lb`].

use crate::base::random::coin;
use crate::genome::{Chromosome, MutationStats};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Name of the crossover model as written in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossoverKind {
    None,
    Full,
    Partial,
}

/// A crossover model with its parameters resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverModel {
    /// The whole chromosome comes from one homolog chosen by a fair coin.
    None,
    /// Every block independently comes from either homolog.
    Full,
    /// Up to `mean_num_crossovers` crossovers, producing alternating sections.
    Partial { mean_num_crossovers: u32 },
}

impl CrossoverModel {
    pub fn new(kind: CrossoverKind, mean_num_crossovers: u32) -> Self {
        match kind {
            CrossoverKind::None => Self::None,
            CrossoverKind::Full => Self::Full,
            CrossoverKind::Partial => Self::Partial {
                mean_num_crossovers,
            },
        }
    }

    /// Build one offspring chromosome from the homologs `a` and `b`.
    ///
    /// Returns the new chromosome and the counters of everything it inherited.
    pub fn cross<R: Rng + ?Sized>(
        &self,
        a: &Chromosome,
        b: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, MutationStats) {
        debug_assert_eq!(a.len(), b.len());
        let mut child = Chromosome::with_capacity(a.len());
        let stats = match *self {
            Self::None => {
                let parent = if coin(rng) { a } else { b };
                parent.copy_whole(&mut child)
            }
            Self::Full => {
                let mut stats = MutationStats::default();
                for index in 0..a.len() {
                    let parent = if coin(rng) { a } else { b };
                    stats += parent.transfer_lb(&mut child, index);
                }
                stats
            }
            Self::Partial {
                mean_num_crossovers,
            } => partial_crossover(a, b, mean_num_crossovers, &mut child, rng),
        };
        (child, stats)
    }
}

/// Alternating sections that start and end on a randomly chosen primary
/// homolog.
///
/// With `k` crossovers drawn uniformly from `[0, mean_num_crossovers]`, the
/// chromosome is split into `2k + 1` sections whose lengths are uniform in
/// `[1, 2 * mean_section_size]`. The final section runs to the end and holds
/// at least the last block.
fn partial_crossover<R: Rng + ?Sized>(
    a: &Chromosome,
    b: &Chromosome,
    mean_num_crossovers: u32,
    child: &mut Chromosome,
    rng: &mut R,
) -> MutationStats {
    let num_lbs = a.len();
    let num_crossovers = rng.random_range(0..=mean_num_crossovers) as usize;
    let (primary, secondary) = if coin(rng) { (a, b) } else { (b, a) };

    if num_crossovers == 0 || num_lbs < 2 {
        return primary.copy_whole(child);
    }

    let num_sections = 2 * num_crossovers + 1;
    let mean_section_size =
        ((num_lbs as f64 / num_sections as f64).round() as usize).max(1);
    let last_lb = num_lbs - 1;

    let mut stats = MutationStats::default();
    let mut position = 0;
    for section in 0..num_sections - 1 {
        if position >= last_lb {
            break;
        }
        let parent = if section % 2 == 0 { primary } else { secondary };
        let length = rng.random_range(1..=2 * mean_section_size);
        let end = (position + length).min(last_lb);
        for index in position..end {
            stats += parent.transfer_lb(child, index);
        }
        position = end;
    }
    for index in position..num_lbs {
        stats += primary.transfer_lb(child, index);
    }
    stats
}
