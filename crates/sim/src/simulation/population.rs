//! Population management: genesis, parallel mating, selection and
//! per-generation statistics.
//!
//! Individuals live in [`PopulationPart`]s, one per mating worker. The
//! population addresses them through a flat vector of [`IndivRef`] handles,
//! which is what gets shuffled for mating and sorted for selection.

use crate::analysis::AlleleCount;
use crate::base::{IdRange, SimRng, UniqueIdAllocator};
use crate::evolution::{FitnessModel, SelectionModel};
use crate::genome::Individual;
use crate::simulation::models::InitialAlleles;
use crate::simulation::{Models, Workers};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

/// Smallest ID block handed to a mating worker.
const MIN_ID_RANGE: u64 = 1024;

/// Handle to one individual: its part and its position in that part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndivRef {
    pub part: u32,
    pub index: u32,
}

#[inline]
fn lookup(parts: &[PopulationPart], r: IndivRef) -> &Individual {
    &parts[r.part as usize].individuals[r.index as usize]
}

/// One worker's private slab of individuals.
#[derive(Debug, Clone, Default)]
pub struct PopulationPart {
    individuals: Vec<Individual>,
}

impl PopulationPart {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
        }
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Mate consecutive pairs of `parents`; a trailing odd parent is skipped.
    fn mate<R: Rng + ?Sized>(
        &mut self,
        population: &Population,
        parents: &[IndivRef],
        models: &Models,
        ids: &mut IdRange,
        rng: &mut R,
    ) {
        for pair in parents.chunks_exact(2) {
            let dad = population.get(pair[0]);
            let mom = population.get(pair[1]);
            dad.mate(mom, models, &mut self.individuals, ids, rng);
        }
    }
}

/// Pre-selection fitness moments of a freshly mated generation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessMoments {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl FitnessMoments {
    fn of<'a>(individuals: impl Iterator<Item = &'a Individual> + Clone) -> Self {
        let (n, sum) = individuals
            .clone()
            .fold((0usize, 0.0f64), |(n, s), ind| (n + 1, s + ind.geno_fitness()));
        if n == 0 {
            return Self::default();
        }
        let mean = sum / n as f64;
        let variance = individuals
            .map(|ind| {
                let d = ind.geno_fitness() - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }
}

/// Statistics reported once per generation, after selection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationStats {
    pub generation: u32,
    pub size: usize,
    pub actual_avg_offspring: f64,
    pub mean_fitness: f64,
    pub min_fitness: f64,
    pub max_fitness: f64,
    pub mean_deleterious: f64,
    pub mean_neutral: f64,
    pub mean_favorable: f64,
    pub mean_del_allele: f64,
    pub mean_fav_allele: f64,
    /// New mutations carried by the survivors (initial alleles excluded).
    pub total_mutations: u64,
    pub mean_mutations: f64,
    pub pre_selection: FitnessMoments,
    pub env_noise: f64,
}

/// A generation of individuals.
#[derive(Debug, Clone)]
pub struct Population {
    parts: Vec<PopulationPart>,
    refs: Vec<IndivRef>,
    target_size: usize,
    actual_avg_offspring: f64,
    pre_selection: FitnessMoments,
    env_noise: f64,
    /// Set once [`select`](Self::select) has culled this generation.
    selected: bool,
}

impl Population {
    /// Generation 0: `size` identical mutation-free founders in a single part.
    pub fn genesis(size: usize, haploid_chromosome_number: usize, lbs_per_chromosome: usize) -> Self {
        let individuals: Vec<Individual> = (0..size)
            .map(|_| Individual::new(haploid_chromosome_number, lbs_per_chromosome))
            .collect();
        Self::from_parts(vec![PopulationPart { individuals }], size)
    }

    /// Wrap worker parts; handles follow worker order, then birth order.
    pub fn from_parts(parts: Vec<PopulationPart>, target_size: usize) -> Self {
        let refs = parts
            .iter()
            .enumerate()
            .flat_map(|(p, part)| {
                (0..part.individuals.len()).map(move |i| IndivRef {
                    part: p as u32,
                    index: i as u32,
                })
            })
            .collect();
        Self {
            parts,
            refs,
            target_size,
            actual_avg_offspring: 0.0,
            pre_selection: FitnessMoments::default(),
            env_noise: 0.0,
            selected: false,
        }
    }

    /// Live individuals (all individuals before the first selection).
    #[inline]
    pub fn size(&self) -> usize {
        self.refs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    #[inline]
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    #[inline]
    pub fn refs(&self) -> &[IndivRef] {
        &self.refs
    }

    pub fn parts(&self) -> &[PopulationPart] {
        &self.parts
    }

    #[inline]
    pub fn get(&self, r: IndivRef) -> &Individual {
        lookup(&self.parts, r)
    }

    #[inline]
    fn get_mut(&mut self, r: IndivRef) -> &mut Individual {
        &mut self.parts[r.part as usize].individuals[r.index as usize]
    }

    /// Individuals in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> + Clone + '_ {
        self.refs.iter().map(move |&r| self.get(r))
    }

    pub fn actual_avg_offspring(&self) -> f64 {
        self.actual_avg_offspring
    }

    pub fn pre_selection(&self) -> FitnessMoments {
        self.pre_selection
    }

    pub fn env_noise(&self) -> f64 {
        self.env_noise
    }

    /// Seed contrasting alleles into a share of the founders.
    ///
    /// Founders are visited in order and chosen while the running share of
    /// chosen founders stays within `pop_frac`.
    pub fn generate_initial_alleles<R: Rng + ?Sized>(
        &mut self,
        alleles: &InitialAlleles,
        fitness: &FitnessModel,
        ids: &mut UniqueIdAllocator,
        rng: &mut R,
    ) -> usize {
        let refs = self.refs.clone();
        let mut with_alleles = 0usize;
        for (i, r) in refs.into_iter().enumerate() {
            if (with_alleles + 1) as f64 / (i + 1) as f64 <= alleles.pop_frac {
                self.get_mut(r).add_initial_contrasting_alleles(
                    alleles.num_contrasting_alleles,
                    &alleles.law,
                    fitness,
                    ids,
                    rng,
                );
                with_alleles += 1;
            }
        }
        debug!(with_alleles, "seeded initial contrasting alleles");
        with_alleles
    }

    /// Produce the next generation.
    ///
    /// Parents are shuffled and split into contiguous, even-sized segments,
    /// one per worker. Each worker mates its segment into its own part using
    /// its own generator and a private block of mutation IDs.
    pub fn mate(
        &self,
        target_size: usize,
        models: &Models,
        workers: &mut Workers,
        rng: &mut SimRng,
        ids: &mut UniqueIdAllocator,
    ) -> Population {
        let mut order = self.refs.clone();
        order.shuffle(rng);

        let num_workers = workers.num_workers().max(1);
        let mut segment = order.len().div_ceil(num_workers);
        segment += segment % 2;
        let segment = segment.max(2);
        let segments: Vec<&[IndivRef]> = order.chunks(segment).collect();

        let per_pair = models.offspring.mean();
        let ranges: Vec<IdRange> = segments
            .iter()
            .map(|s| {
                let expected_children = (s.len() / 2) as f64 * per_pair;
                let len = (expected_children * models.mutation.rate * 1.5).ceil() as u64;
                ids.carve(len.max(MIN_ID_RANGE))
            })
            .collect();
        let rngs = workers.rngs(rng, segments.len());

        let parent = self;
        let results: Vec<(PopulationPart, SimRng)> = workers.install(|| {
            segments
                .par_iter()
                .zip(rngs.into_par_iter())
                .zip(ranges.into_par_iter())
                .map(|((parents, mut rng), mut ids)| {
                    let capacity = (parents.len() as f64 / 2.0 * per_pair).ceil() as usize;
                    let mut part = PopulationPart::with_capacity(capacity);
                    part.mate(parent, parents, models, &mut ids, &mut rng);
                    (part, rng)
                })
                .collect()
        });

        let mut parts = Vec::with_capacity(results.len());
        for (i, (part, worker_rng)) in results.into_iter().enumerate() {
            if i == 0 {
                *rng = worker_rng;
            }
            parts.push(part);
        }

        let mut next = Population::from_parts(parts, target_size);
        next.actual_avg_offspring = if self.size() == 0 {
            0.0
        } else {
            next.size() as f64 / self.size() as f64
        };
        next.pre_selection = FitnessMoments::of(next.iter());
        debug!(
            parents = self.size(),
            children = next.size(),
            workers = segments.len(),
            "mated generation"
        );
        next
    }

    /// Rank by phenotypic fitness and cull down to the target size.
    ///
    /// Afterwards the handles hold only live individuals, at most
    /// `target_size` of them, in ascending phenotypic order. Returns the number
    /// of individuals removed. A generation is selected once; later calls
    /// draw nothing and remove nobody.
    pub fn select<R: Rng + ?Sized>(
        &mut self,
        selection: &SelectionModel,
        heritability: f64,
        non_scaling_noise: f64,
        rng: &mut R,
    ) -> usize {
        if self.selected {
            return 0;
        }
        self.selected = true;
        self.env_noise = SelectionModel::environmental_noise(
            self.pre_selection.variance,
            heritability,
            non_scaling_noise,
        );

        {
            let mut individuals: Vec<&mut Individual> = self
                .parts
                .iter_mut()
                .flat_map(|part| part.individuals.iter_mut())
                .collect();
            selection.apply(&mut individuals, self.env_noise, rng);
        }

        let target_size = self.target_size;
        let parts: &[PopulationPart] = &self.parts;
        let refs = &mut self.refs;
        refs.sort_by(|a, b| {
            let (a, b) = (lookup(parts, *a), lookup(parts, *b));
            (!a.is_dead())
                .cmp(&!b.is_dead())
                .then(a.pheno_fitness().total_cmp(&b.pheno_fitness()))
        });

        let current_size = refs.len();
        let num_dead = refs
            .iter()
            .take_while(|&&r| lookup(parts, r).is_dead())
            .count();
        let num_eliminate = current_size.saturating_sub(target_size);
        let cut = num_dead.max(num_eliminate);

        for &r in &self.refs[num_dead..cut] {
            self.parts[r.part as usize].individuals[r.index as usize].kill();
        }
        self.refs.drain(..cut);

        debug!(
            current_size,
            num_dead,
            num_eliminate,
            survivors = self.refs.len(),
            env_noise = self.env_noise,
            "selection done"
        );
        cut
    }

    /// Population-wide allele tally over the live individuals.
    ///
    /// Each individual is first counted on its own so that an allele carried
    /// on both chromosome sets is seen once, unless `count_duplicates` is set.
    pub fn count_alleles(&self, count_duplicates: bool) -> AlleleCount {
        let mut total = AlleleCount::new();
        let mut per_individual = AlleleCount::new();
        for ind in self.iter() {
            per_individual.clear();
            ind.count_alleles(&mut per_individual, count_duplicates);
            total.merge(&per_individual);
        }
        total
    }

    /// Drop every individual, keeping only the cached statistics.
    pub fn release(&mut self) {
        self.refs = Vec::new();
        self.parts = Vec::new();
    }

    /// Statistics over the live individuals.
    pub fn stats(&self, generation: u32) -> PopulationStats {
        let size = self.size();
        let mut stats = PopulationStats {
            generation,
            size,
            actual_avg_offspring: self.actual_avg_offspring,
            pre_selection: self.pre_selection,
            env_noise: self.env_noise,
            ..PopulationStats::default()
        };
        if size == 0 {
            return stats;
        }

        let mut sum_fitness = 0.0;
        let mut min_fitness = f64::INFINITY;
        let mut max_fitness = f64::NEG_INFINITY;
        let mut counts = [0u64; 5];
        for ind in self.iter() {
            let g = ind.geno_fitness();
            sum_fitness += g;
            min_fitness = min_fitness.min(g);
            max_fitness = max_fitness.max(g);
            let s = ind.mutation_stats();
            counts[0] += s.deleterious as u64;
            counts[1] += s.neutral as u64;
            counts[2] += s.favorable as u64;
            counts[3] += s.del_allele as u64;
            counts[4] += s.fav_allele as u64;
        }
        let n = size as f64;
        stats.mean_fitness = sum_fitness / n;
        stats.min_fitness = min_fitness;
        stats.max_fitness = max_fitness;
        stats.mean_deleterious = counts[0] as f64 / n;
        stats.mean_neutral = counts[1] as f64 / n;
        stats.mean_favorable = counts[2] as f64 / n;
        stats.mean_del_allele = counts[3] as f64 / n;
        stats.mean_fav_allele = counts[4] as f64 / n;
        stats.total_mutations = counts[0] + counts[1] + counts[2];
        stats.mean_mutations = stats.total_mutations as f64 / n;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::seeded;
    use crate::evolution::{InitialAlleleLaw, InitialAlleleModel};
    use crate::simulation::models::tests::test_models;
    use std::collections::BTreeSet;

    fn next_generation(
        pop: &Population,
        models: &Models,
        workers: &mut Workers,
        rng: &mut SimRng,
        ids: &mut UniqueIdAllocator,
    ) -> Population {
        let mut next = pop.mate(pop.target_size(), models, workers, rng, ids);
        next.select(&models.selection, 0.2, 0.05, rng);
        next
    }

    #[test]
    fn test_genesis() {
        let pop = Population::genesis(10, 2, 5);
        assert_eq!(pop.size(), 10);
        assert_eq!(pop.parts().len(), 1);
        let stats = pop.stats(0);
        assert_eq!(stats.mean_fitness, 1.0);
        assert_eq!(stats.total_mutations, 0);
    }

    #[test]
    fn test_mate_and_select_respect_target() {
        let models = test_models(5.0);
        let mut workers = Workers::new(2, 1).unwrap();
        let mut rng = seeded(1);
        let mut ids = UniqueIdAllocator::new();

        let mut pop = Population::genesis(20, 2, 10);
        for _ in 0..3 {
            let next = pop.mate(20, &models, &mut workers, &mut rng, &mut ids);
            assert!(next.size() > 20, "over-production expected");
            assert!((next.actual_avg_offspring() - next.size() as f64 / 20.0).abs() < 1e-12);
            assert!(next.parts().len() <= 2);
            pop = next;
            pop.select(&models.selection, 0.2, 0.05, &mut rng);
            assert_eq!(pop.size(), 20);
            assert!(pop.iter().all(|ind| !ind.is_dead()));
        }
    }

    #[test]
    fn test_select_orders_by_pheno() {
        let models = test_models(5.0);
        let mut workers = Workers::new(1, 2).unwrap();
        let mut rng = seeded(2);
        let mut ids = UniqueIdAllocator::new();
        let pop = Population::genesis(10, 1, 10);
        let next = next_generation(&pop, &models, &mut workers, &mut rng, &mut ids);
        let pheno: Vec<f64> = next.iter().map(|i| i.pheno_fitness()).collect();
        assert!(pheno.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_select_twice_keeps_the_same_individuals() {
        for (seed, selection) in [
            SelectionModel::FullTruncation,
            SelectionModel::Ups,
            SelectionModel::Spps,
            SelectionModel::PartialTruncation { theta: 0.5 },
        ]
        .into_iter()
        .enumerate()
        {
            let mut models = test_models(5.0);
            models.selection = selection;
            let mut workers = Workers::new(1, seed as u64).unwrap();
            let mut rng = seeded(seed as u64);
            let mut ids = UniqueIdAllocator::new();
            let pop = Population::genesis(100, 1, 8);
            let mut next = next_generation(&pop, &models, &mut workers, &mut rng, &mut ids);

            let before: BTreeSet<IndivRef> = next.refs().iter().copied().collect();
            let pheno: Vec<f64> = next.iter().map(|i| i.pheno_fitness()).collect();
            let removed = next.select(&models.selection, 0.2, 0.5, &mut rng);
            let after: BTreeSet<IndivRef> = next.refs().iter().copied().collect();
            assert_eq!(removed, 0, "{selection:?}");
            assert_eq!(before, after, "{selection:?}");
            assert_eq!(pheno, next.iter().map(|i| i.pheno_fitness()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_dead_children_are_removed_first() {
        let mut models = test_models(0.0);
        models.selection = SelectionModel::FullTruncation;
        let mut workers = Workers::new(1, 4).unwrap();
        let mut rng = seeded(4);
        let mut ids = UniqueIdAllocator::new();
        let pop = Population::genesis(10, 1, 4);
        let mut next = pop.mate(100, &models, &mut workers, &mut rng, &mut ids);
        let first = next.refs()[0];
        next.get_mut(first).kill();
        let size = next.size();

        let removed = next.select(&models.selection, 1.0, 0.0, &mut rng);
        assert_eq!(removed, 1);
        assert_eq!(next.size(), size - 1);
        assert!(!next.refs().contains(&first));
    }

    #[test]
    fn test_single_worker_is_reproducible() {
        let models = test_models(3.0);
        let run = || {
            let mut workers = Workers::new(1, 9).unwrap();
            let mut rng = seeded(9);
            let mut ids = UniqueIdAllocator::new();
            let mut pop = Population::genesis(12, 2, 6);
            for _ in 0..3 {
                pop = next_generation(&pop, &models, &mut workers, &mut rng, &mut ids);
            }
            pop.stats(3)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_multi_worker_is_reproducible() {
        let models = test_models(3.0);
        let run = || {
            let mut workers = Workers::new(4, 5).unwrap();
            let mut rng = seeded(5);
            let mut ids = UniqueIdAllocator::new();
            let mut pop = Population::genesis(40, 2, 6);
            for _ in 0..3 {
                pop = next_generation(&pop, &models, &mut workers, &mut rng, &mut ids);
            }
            pop.stats(3)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_initial_alleles_fraction() {
        let models = test_models(0.0);
        let alleles = InitialAlleles {
            num_contrasting_alleles: 4,
            pop_frac: 0.5,
            law: InitialAlleleLaw::new(InitialAlleleModel::Fixed, 0.1, 4),
        };
        let mut ids = UniqueIdAllocator::new();
        let mut rng = seeded(6);
        let mut pop = Population::genesis(10, 1, 4);
        let seeded_count = pop.generate_initial_alleles(&alleles, &models.fitness, &mut ids, &mut rng);
        assert_eq!(seeded_count, 5);
        let with: Vec<bool> = pop
            .iter()
            .map(|i| i.mutation_stats().fav_allele > 0)
            .collect();
        assert_eq!(with.iter().filter(|&&w| w).count(), 5);
        assert!(!with[0]);
        assert!(with[1]);
    }

    #[test]
    fn test_count_alleles_suppresses_diploid_duplicates() {
        let models = test_models(0.0);
        let alleles = InitialAlleles {
            num_contrasting_alleles: 4,
            pop_frac: 1.0,
            law: InitialAlleleLaw::new(InitialAlleleModel::Fixed, 0.1, 4),
        };
        let mut ids = UniqueIdAllocator::new();
        let mut rng = seeded(7);
        let mut pop = Population::genesis(3, 1, 4);
        pop.generate_initial_alleles(&alleles, &models.fitness, &mut ids, &mut rng);

        let tally = pop.count_alleles(false);
        assert_eq!(tally.total_alleles(), 24);
        assert!(tally
            .kind(crate::genome::MutationKind::FavorableInitialAllele)
            .values()
            .all(|a| a.count == 1));
    }

    #[test]
    fn test_stats_after_release() {
        let mut pop = Population::genesis(5, 1, 2);
        pop.release();
        assert!(pop.is_empty());
        assert_eq!(pop.stats(1).size, 0);
    }
}
