//! Allele-frequency tally and histograms.
//!
//! The tally keeps one map per mutation kind, keyed by mutation ID. Each
//! individual is first counted into its own [`AlleleCount`], where an ID that
//! appears on both chromosome sets is recorded once (unless duplicates are
//! counted), and then merged into the population total. The histograms bin
//! every allele by its population frequency.

use crate::genome::{Mutation, MutationKind};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::warn;

/// Bins in the absolute histogram, one per percent of frequency.
pub const BUCKET_COUNT: usize = 100;

/// Bins in the normalized histogram, two percent each.
pub const NORMALIZED_BUCKET_COUNT: usize = BUCKET_COUNT / 2;

/// How often an allele was seen and its expressed effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allele {
    pub count: u32,
    pub fitness_effect: f32,
}

/// Per-kind allele counts keyed by mutation ID.
#[derive(Debug, Clone, Default)]
pub struct AlleleCount {
    by_kind: [FxHashMap<u64, Allele>; 7],
}

impl AlleleCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one copy of `mutation` for the current individual.
    ///
    /// A repeated ID only increases the count when `count_duplicates` is set.
    #[inline]
    pub fn insert(&mut self, mutation: &Mutation, count_duplicates: bool) {
        self.by_kind[mutation.kind.index()]
            .entry(mutation.id)
            .and_modify(|allele| {
                if count_duplicates {
                    allele.count += 1;
                }
            })
            .or_insert(Allele {
                count: 1,
                fitness_effect: mutation.fitness_effect,
            });
    }

    /// Add the counts of `other` into this tally.
    pub fn merge(&mut self, other: &AlleleCount) {
        for (dst, src) in self.by_kind.iter_mut().zip(&other.by_kind) {
            for (&id, allele) in src {
                dst.entry(id)
                    .or_insert(Allele {
                        count: 0,
                        fitness_effect: allele.fitness_effect,
                    })
                    .count += allele.count;
            }
        }
    }

    /// Alleles of one kind.
    pub fn kind(&self, kind: MutationKind) -> &FxHashMap<u64, Allele> {
        &self.by_kind[kind.index()]
    }

    /// Distinct alleles across all kinds.
    pub fn total_alleles(&self) -> usize {
        self.by_kind.iter().map(|map| map.len()).sum()
    }

    /// Empty every map, keeping the allocations.
    pub fn clear(&mut self) {
        for map in &mut self.by_kind {
            map.clear();
        }
    }

    /// Bin every allele by population frequency.
    ///
    /// Frequencies above 100 % can only arise when duplicates are counted;
    /// they are clamped into the last bin, with a warning otherwise.
    pub fn histogram(&self, pop_size: usize, count_duplicates: bool) -> AlleleHistogram {
        let mut hist = AlleleHistogram::default();
        let mut clamped = 0usize;
        for kind in MutationKind::ALL {
            let bins = hist.bins_mut(kind);
            for allele in self.kind(kind).values() {
                let (index, was_clamped) = bucket_index(allele.count, pop_size);
                if was_clamped {
                    clamped += 1;
                }
                bins[index] += 1;
            }
        }
        if clamped > 0 && !count_duplicates {
            warn!(clamped, pop_size, "allele frequencies outside histogram range were clamped");
        }
        hist
    }
}

/// Histogram bucket for an allele seen `count` times in `pop_size` individuals.
///
/// Bucket `i` covers frequencies in `(i %, (i + 1) %]`. Returns the bucket and
/// whether it had to be clamped into `[0, 99]`.
pub fn bucket_index(count: u32, pop_size: usize) -> (usize, bool) {
    if pop_size == 0 {
        return (0, true);
    }
    let x = count as f64 / pop_size as f64 * BUCKET_COUNT as f64;
    let rounded = x.round();
    let raw = if (x - rounded).abs() < 1e-9 {
        rounded as i64 - 1
    } else {
        x.floor() as i64
    };
    let clamped = raw.clamp(0, BUCKET_COUNT as i64 - 1);
    (clamped as usize, clamped != raw)
}

/// Absolute counts per frequency bucket for each reported kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlleleHistogram {
    pub deleterious: [u32; BUCKET_COUNT],
    pub neutral: [u32; BUCKET_COUNT],
    pub favorable: [u32; BUCKET_COUNT],
    pub del_initial_alleles: [u32; BUCKET_COUNT],
    pub fav_initial_alleles: [u32; BUCKET_COUNT],
}

impl Default for AlleleHistogram {
    fn default() -> Self {
        Self {
            deleterious: [0; BUCKET_COUNT],
            neutral: [0; BUCKET_COUNT],
            favorable: [0; BUCKET_COUNT],
            del_initial_alleles: [0; BUCKET_COUNT],
            fav_initial_alleles: [0; BUCKET_COUNT],
        }
    }
}

impl AlleleHistogram {
    fn bins_mut(&mut self, kind: MutationKind) -> &mut [u32; BUCKET_COUNT] {
        match kind {
            MutationKind::DeleteriousDominant | MutationKind::DeleteriousRecessive => {
                &mut self.deleterious
            }
            MutationKind::Neutral => &mut self.neutral,
            MutationKind::FavorableDominant | MutationKind::FavorableRecessive => {
                &mut self.favorable
            }
            MutationKind::DeleteriousInitialAllele => &mut self.del_initial_alleles,
            MutationKind::FavorableInitialAllele => &mut self.fav_initial_alleles,
        }
    }

    fn rows(&self) -> [&[u32; BUCKET_COUNT]; 5] {
        [
            &self.deleterious,
            &self.neutral,
            &self.favorable,
            &self.del_initial_alleles,
            &self.fav_initial_alleles,
        ]
    }

    /// Alleles across every bin of every kind.
    pub fn total(&self) -> u64 {
        self.rows()
            .iter()
            .flat_map(|row| row.iter())
            .map(|&n| n as u64)
            .sum()
    }

    /// The absolute-count JSON document.
    pub fn to_bins(&self, generation: u32, omit_first_bin: bool) -> AlleleBins {
        let skip = usize::from(omit_first_bin);
        let row = |r: &[u32; BUCKET_COUNT]| r[skip..].to_vec();
        AlleleBins {
            generation,
            bins: (1 + skip as u32..=BUCKET_COUNT as u32).collect(),
            deleterious: row(&self.deleterious),
            neutral: row(&self.neutral),
            favorable: row(&self.favorable),
            del_initial_alleles: row(&self.del_initial_alleles),
            fav_initial_alleles: row(&self.fav_initial_alleles),
        }
    }

    /// The normalized JSON document: bins two percent wide, each value the
    /// fraction of all alleles that falls into it.
    pub fn to_normalized(&self, generation: u32, omit_first_bin: bool) -> NormalizedAlleleBins {
        let total = self.total();
        let skip = usize::from(omit_first_bin);
        let row = |r: &[u32; BUCKET_COUNT]| -> Vec<f64> {
            let mut merged = [0u64; NORMALIZED_BUCKET_COUNT];
            for (i, &n) in r.iter().enumerate() {
                merged[i / 2] += n as u64;
            }
            merged[skip..]
                .iter()
                .map(|&n| if total == 0 { 0.0 } else { n as f64 / total as f64 })
                .collect()
        };
        NormalizedAlleleBins {
            generation,
            bins: (1 + skip as u32..=NORMALIZED_BUCKET_COUNT as u32)
                .map(|i| i * 2)
                .collect(),
            deleterious: row(&self.deleterious),
            neutral: row(&self.neutral),
            favorable: row(&self.favorable),
            del_initial_alleles: row(&self.del_initial_alleles),
            fav_initial_alleles: row(&self.fav_initial_alleles),
        }
    }
}

/// `allele-bins/NNNNNNNN.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlleleBins {
    pub generation: u32,
    pub bins: Vec<u32>,
    pub deleterious: Vec<u32>,
    pub neutral: Vec<u32>,
    pub favorable: Vec<u32>,
    pub del_initial_alleles: Vec<u32>,
    pub fav_initial_alleles: Vec<u32>,
}

/// `normalized-allele-bins/NNNNNNNN.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAlleleBins {
    pub generation: u32,
    pub bins: Vec<u32>,
    pub deleterious: Vec<f64>,
    pub neutral: Vec<f64>,
    pub favorable: Vec<f64>,
    pub del_initial_alleles: Vec<f64>,
    pub fav_initial_alleles: Vec<f64>,
}
