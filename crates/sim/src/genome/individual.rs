use crate::analysis::AlleleCount;
use crate::base::random::coin;
use crate::base::IdSource;
use crate::evolution::{FitnessModel, InitialAlleleLaw};
use crate::genome::{Chromosome, MutationStats};
use crate::simulation::Models;
use rand::Rng;

/// A diploid individual.
///
/// `dad` and `mom` hold the chromosome sets inherited from each parent; both
/// have the haploid chromosome number of entries and every chromosome has the
/// same number of linkage blocks. Mutation counters are kept in sync with the
/// blocks as offspring are assembled and mutated, so population statistics
/// never walk the genome.
#[derive(Debug, Clone)]
pub struct Individual {
    dad: Vec<Chromosome>,
    mom: Vec<Chromosome>,
    geno_fitness: f64,
    pheno_fitness: f64,
    dead: bool,
    stats: MutationStats,
}

impl Individual {
    /// A mutation-free founder with fitness 1.
    pub fn new(haploid_chromosome_number: usize, lbs_per_chromosome: usize) -> Self {
        Self {
            dad: (0..haploid_chromosome_number)
                .map(|_| Chromosome::new(lbs_per_chromosome))
                .collect(),
            mom: (0..haploid_chromosome_number)
                .map(|_| Chromosome::new(lbs_per_chromosome))
                .collect(),
            geno_fitness: 1.0,
            pheno_fitness: 1.0,
            dead: false,
            stats: MutationStats::default(),
        }
    }

    #[inline]
    pub fn dad(&self) -> &[Chromosome] {
        &self.dad
    }

    #[inline]
    pub fn mom(&self) -> &[Chromosome] {
        &self.mom
    }

    #[inline]
    pub fn geno_fitness(&self) -> f64 {
        self.geno_fitness
    }

    #[inline]
    pub fn set_geno_fitness(&mut self, fitness: f64) {
        self.geno_fitness = fitness;
    }

    #[inline]
    pub fn pheno_fitness(&self) -> f64 {
        self.pheno_fitness
    }

    #[inline]
    pub fn set_pheno_fitness(&mut self, fitness: f64) {
        self.pheno_fitness = fitness;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Mark as dead. A dead individual always ranks with phenotype 0.
    #[inline]
    pub fn kill(&mut self) {
        self.dead = true;
        self.pheno_fitness = 0.0;
    }

    /// Mutation counters across both chromosome sets.
    #[inline]
    pub fn mutation_stats(&self) -> MutationStats {
        self.stats
    }

    /// Linkage blocks in one chromosome set.
    #[inline]
    pub fn num_linkage_subunits(&self) -> usize {
        self.dad.len() * self.lbs_per_chromosome()
    }

    #[inline]
    pub fn lbs_per_chromosome(&self) -> usize {
        self.dad.first().map_or(0, Chromosome::len)
    }

    /// Mate with `other` and append the offspring to `children`.
    ///
    /// All offspring are assembled before any of them is mutated. Returns the
    /// number of offspring produced.
    pub fn mate<I, R>(
        &self,
        other: &Individual,
        models: &Models,
        children: &mut Vec<Individual>,
        ids: &mut I,
        rng: &mut R,
    ) -> u32
    where
        I: IdSource + ?Sized,
        R: Rng + ?Sized,
    {
        let num_offspring = models.offspring.num_offspring(self, rng);
        let first = children.len();
        children.reserve(num_offspring as usize);
        for _ in 0..num_offspring {
            children.push(self.one_offspring(other, models, rng));
        }
        for child in &mut children[first..] {
            child.add_mutations(models, ids, rng);
        }
        num_offspring
    }

    /// Assemble one offspring: a gamete from `self` on the dad side and one
    /// from `other` on the mom side, chromosome by chromosome.
    pub fn one_offspring<R: Rng + ?Sized>(
        &self,
        other: &Individual,
        models: &Models,
        rng: &mut R,
    ) -> Individual {
        let n = self.dad.len();
        let mut child = Individual {
            dad: Vec::with_capacity(n),
            mom: Vec::with_capacity(n),
            geno_fitness: 1.0,
            pheno_fitness: 1.0,
            dead: false,
            stats: MutationStats::default(),
        };
        for c in 0..n {
            let (chr, stats) = models.crossover.cross(&self.dad[c], &self.mom[c], rng);
            child.dad.push(chr);
            child.stats += stats;

            let (chr, stats) = models.crossover.cross(&other.dad[c], &other.mom[c], rng);
            child.mom.push(chr);
            child.stats += stats;
        }
        child.update_fitness(&models.fitness);
        child
    }

    /// Add this generation's new mutations, then recompute fitness.
    ///
    /// Each mutation lands on a uniformly chosen block position and a fair coin
    /// picks the chromosome set.
    pub fn add_mutations<I, R>(&mut self, models: &Models, ids: &mut I, rng: &mut R)
    where
        I: IdSource + ?Sized,
        R: Rng + ?Sized,
    {
        let lbs_per_chromosome = self.lbs_per_chromosome();
        let total = self.num_linkage_subunits();
        if total == 0 {
            return;
        }
        let num_mutations = models.mutation.num_mutations(rng);
        for _ in 0..num_mutations {
            let lb_index = rng.random_range(0..total);
            let c = lb_index / lbs_per_chromosome;
            let lb = lb_index % lbs_per_chromosome;
            let chr = if coin(rng) {
                &mut self.dad[c]
            } else {
                &mut self.mom[c]
            };
            let kind = chr.append_mutation(lb, ids.next_id(), &models.mutation, rng);
            self.stats.record(kind);
        }
        self.update_fitness(&models.fitness);
    }

    /// Seed `num_pairs` contrasting allele pairs spread evenly over the
    /// block positions.
    ///
    /// Each position gets `num_pairs / positions` pairs; the remainder is
    /// sprinkled so that the share of positions given an extra pair never
    /// runs ahead of `remainder / positions`. A fair coin decides which
    /// chromosome set carries the favorable allele of each pair.
    pub fn add_initial_contrasting_alleles<I, R>(
        &mut self,
        num_pairs: u32,
        law: &InitialAlleleLaw,
        fitness: &FitnessModel,
        ids: &mut I,
        rng: &mut R,
    ) where
        I: IdSource + ?Sized,
        R: Rng + ?Sized,
    {
        let lbs_per_chromosome = self.lbs_per_chromosome();
        let total = self.num_linkage_subunits() as u64;
        if total == 0 || num_pairs == 0 {
            return;
        }
        let per_lb = num_pairs as u64 / total;
        let remainder = num_pairs as u64 % total;

        let mut extras_given = 0u64;
        for position in 0..total {
            let mut pairs = per_lb;
            if remainder > 0 && (extras_given + 1) * total <= remainder * (position + 1) {
                extras_given += 1;
                pairs += 1;
            }
            let c = position as usize / lbs_per_chromosome;
            let lb = position as usize % lbs_per_chromosome;
            for _ in 0..pairs {
                if coin(rng) {
                    self.dad[c].append_initial_contrasting_pair(lb, &mut self.mom[c], ids, law, rng);
                } else {
                    self.mom[c].append_initial_contrasting_pair(lb, &mut self.dad[c], ids, law, rng);
                }
                self.stats.fav_allele += 1;
                self.stats.del_allele += 1;
            }
        }
        self.update_fitness(fitness);
    }

    /// Add every tracked mutation to `sink`.
    pub fn count_alleles(&self, sink: &mut AlleleCount, count_duplicates: bool) {
        for chr in self.dad.iter().chain(&self.mom) {
            chr.count_alleles(sink, count_duplicates);
        }
    }

    fn update_fitness(&mut self, fitness: &FitnessModel) {
        self.geno_fitness = fitness.geno_fitness(&self.dad, &self.mom);
        if self.geno_fitness <= 0.0 {
            self.dead = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{seeded, UniqueIdAllocator};
    use crate::evolution::InitialAlleleModel;
    use crate::simulation::models::tests::test_models;

    fn recount(ind: &Individual) -> MutationStats {
        let mut stats = MutationStats::default();
        for chr in ind.dad().iter().chain(ind.mom()) {
            stats += chr.mutation_stats();
        }
        stats
    }

    fn additive(ind: &Individual) -> f64 {
        1.0 + ind
            .dad()
            .iter()
            .chain(ind.mom())
            .map(|c| c.fitness_effect() as f64)
            .sum::<f64>()
    }

    #[test]
    fn test_founder() {
        let ind = Individual::new(3, 4);
        assert_eq!(ind.dad().len(), 3);
        assert_eq!(ind.mom().len(), 3);
        assert_eq!(ind.num_linkage_subunits(), 12);
        assert_eq!(ind.geno_fitness(), 1.0);
        assert!(!ind.is_dead());
    }

    #[test]
    fn test_mate_produces_consistent_children() {
        let models = test_models(5.0);
        let mut ids = UniqueIdAllocator::new();
        let mut rng = seeded(1);
        let dad = Individual::new(2, 10);
        let mom = Individual::new(2, 10);

        let mut children = Vec::new();
        let n = dad.mate(&mom, &models, &mut children, &mut ids, &mut rng);
        assert_eq!(children.len(), n as usize);
        assert!(n >= 1);

        for child in &children {
            assert_eq!(child.mutation_stats(), recount(child));
            assert!((child.geno_fitness() - additive(child)).abs() < 1e-9);
            assert_eq!(child.dad().len(), 2);
            assert!(child.dad().iter().all(|c| c.len() == 10));
        }
    }

    #[test]
    fn test_children_inherit_parent_mutations() {
        let models = test_models(3.0);
        let mut ids = UniqueIdAllocator::new();
        let mut rng = seeded(2);
        let mut dad = Individual::new(1, 20);
        let mut mom = Individual::new(1, 20);
        for _ in 0..5 {
            dad.add_mutations(&models, &mut ids, &mut rng);
            mom.add_mutations(&models, &mut ids, &mut rng);
        }
        let dad_stats = dad.mutation_stats();
        let dad_before: Vec<usize> = dad.dad()[0].lbs().iter().map(|lb| lb.mutations().len()).collect();

        let mut children = Vec::new();
        dad.mate(&mom, &models, &mut children, &mut ids, &mut rng);

        assert_eq!(dad.mutation_stats(), dad_stats);
        let dad_after: Vec<usize> = dad.dad()[0].lbs().iter().map(|lb| lb.mutations().len()).collect();
        assert_eq!(dad_before, dad_after);
        for child in &children {
            assert_eq!(child.mutation_stats(), recount(child));
        }
    }

    #[test]
    fn test_add_mutations_lowers_fitness() {
        let models = test_models(10.0);
        let mut ids = UniqueIdAllocator::new();
        let mut rng = seeded(3);
        let mut ind = Individual::new(2, 5);
        ind.add_mutations(&models, &mut ids, &mut rng);
        let n = ind.mutation_stats().deleterious;
        assert!(n > 0);
        assert!((ind.geno_fitness() - (1.0 - 0.005 * n as f64)).abs() < 1e-5);
    }

    #[test]
    fn test_lethal_load_kills() {
        let mut models = test_models(50.0);
        models.mutation.effect_law = crate::evolution::FitnessEffectLaw::Fixed {
            deleterious: 1.0,
            favorable: 0.0,
        };
        let mut ids = UniqueIdAllocator::new();
        let mut rng = seeded(4);
        let mut ind = Individual::new(1, 5);
        ind.add_mutations(&models, &mut ids, &mut rng);
        assert!(ind.geno_fitness() <= 0.0);
        assert!(ind.is_dead());
    }

    #[test]
    fn test_one_pair_per_position() {
        let models = test_models(0.0);
        let law = InitialAlleleLaw::new(InitialAlleleModel::Fixed, 0.1, 12);
        let mut ids = UniqueIdAllocator::new();
        let mut rng = seeded(5);
        let mut ind = Individual::new(3, 4);
        ind.add_initial_contrasting_alleles(12, &law, &models.fitness, &mut ids, &mut rng);

        assert_eq!(ind.mutation_stats().fav_allele, 12);
        assert_eq!(ind.mutation_stats().del_allele, 12);
        for c in 0..3 {
            for lb in 0..4 {
                let d = ind.dad()[c].lb(lb).mutation_stats();
                let m = ind.mom()[c].lb(lb).mutation_stats();
                assert_eq!(d.fav_allele + m.fav_allele, 1);
                assert_eq!(d.del_allele + m.del_allele, 1);
            }
        }
        assert!((ind.geno_fitness() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_remainder_is_spread() {
        let models = test_models(0.0);
        let law = InitialAlleleLaw::new(InitialAlleleModel::Fixed, 0.1, 25);
        let mut ids = UniqueIdAllocator::new();
        let mut rng = seeded(6);
        let mut ind = Individual::new(1, 10);
        ind.add_initial_contrasting_alleles(25, &law, &models.fitness, &mut ids, &mut rng);

        assert_eq!(ind.mutation_stats().fav_allele, 25);
        let per_position: Vec<u32> = (0..10)
            .map(|lb| {
                ind.dad()[0].lb(lb).mutation_stats().fav_allele
                    + ind.mom()[0].lb(lb).mutation_stats().fav_allele
            })
            .collect();
        assert!(per_position.iter().all(|&n| n == 2 || n == 3), "{per_position:?}");
        assert_eq!(per_position.iter().filter(|&&n| n == 3).count(), 5);
        assert_eq!(per_position[..2], [2, 3]);
    }
}
