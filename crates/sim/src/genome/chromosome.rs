use crate::analysis::AlleleCount;
use crate::base::IdSource;
use crate::evolution::{InitialAlleleLaw, MutationModel};
use crate::genome::{LinkageBlock, MutationKind, MutationStats};
use rand::Rng;

/// A chromosome: a fixed-length run of linkage blocks.
///
/// `fitness_effect` caches the sum of the blocks' effects so that individual
/// fitness can be computed without walking every block.
///
/// Offspring chromosomes are assembled position by position with
/// [`transfer_lb`](Self::transfer_lb), which shares the parent's mutation
/// buffers instead of copying them.
///
/// ```rust
/// # use mendel_sim::genome::Chromosome;
/// let parent = Chromosome::new(4);
/// let mut child = Chromosome::with_capacity(4);
/// parent.copy_whole(&mut child);
/// assert_eq!(child.len(), 4);
/// assert!(child.lb(0).is_shared_with_parent());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Chromosome {
    lbs: Vec<LinkageBlock>,
    fitness_effect: f32,
}

impl Chromosome {
    /// A mutation-free chromosome of `num_lbs` blocks.
    pub fn new(num_lbs: usize) -> Self {
        Self {
            lbs: (0..num_lbs).map(|_| LinkageBlock::new()).collect(),
            fitness_effect: 0.0,
        }
    }

    /// An empty chromosome to be filled by [`transfer_lb`](Self::transfer_lb).
    pub fn with_capacity(num_lbs: usize) -> Self {
        Self {
            lbs: Vec::with_capacity(num_lbs),
            fitness_effect: 0.0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lbs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lbs.is_empty()
    }

    #[inline]
    pub fn lbs(&self) -> &[LinkageBlock] {
        &self.lbs
    }

    #[inline]
    pub fn lb(&self, index: usize) -> &LinkageBlock {
        &self.lbs[index]
    }

    #[inline]
    pub fn fitness_effect(&self) -> f32 {
        self.fitness_effect
    }

    /// Share block `index` of this chromosome into the same position of `dst`.
    ///
    /// `dst` is filled in position order, so `index` must equal `dst.len()`.
    /// Returns the transferred block's counters.
    #[inline]
    pub fn transfer_lb(&self, dst: &mut Chromosome, index: usize) -> MutationStats {
        debug_assert_eq!(dst.lbs.len(), index, "linkage blocks must be transferred in order");
        let lb = self.lbs[index].share();
        dst.fitness_effect += lb.fitness_effect();
        let stats = lb.mutation_stats();
        dst.lbs.push(lb);
        stats
    }

    /// Transfer every block, in order.
    pub fn copy_whole(&self, dst: &mut Chromosome) -> MutationStats {
        let mut stats = MutationStats::default();
        for index in 0..self.lbs.len() {
            stats += self.transfer_lb(dst, index);
        }
        stats
    }

    /// Add a new mutation to block `lb_index`.
    pub fn append_mutation<R: Rng + ?Sized>(
        &mut self,
        lb_index: usize,
        id: u64,
        model: &MutationModel,
        rng: &mut R,
    ) -> MutationKind {
        let (kind, effect) = self.lbs[lb_index].append_mutation(id, model, rng);
        self.fitness_effect += effect;
        kind
    }

    /// Seed a contrasting pair at `lb_index`: favorable here, deleterious on
    /// the same position of `other`.
    pub fn append_initial_contrasting_pair<I, R>(
        &mut self,
        lb_index: usize,
        other: &mut Chromosome,
        ids: &mut I,
        law: &InitialAlleleLaw,
        rng: &mut R,
    ) -> f32
    where
        I: IdSource + ?Sized,
        R: Rng + ?Sized,
    {
        let effect = self.lbs[lb_index].append_initial_contrasting_pair(
            &mut other.lbs[lb_index],
            ids,
            law,
            rng,
        );
        self.fitness_effect += effect;
        other.fitness_effect -= effect;
        effect
    }

    /// Sum of the block counters.
    pub fn mutation_stats(&self) -> MutationStats {
        let mut stats = MutationStats::default();
        for lb in &self.lbs {
            stats += lb.mutation_stats();
        }
        stats
    }

    pub fn count_alleles(&self, sink: &mut AlleleCount, count_duplicates: bool) {
        for lb in &self.lbs {
            lb.count_alleles(sink, count_duplicates);
        }
    }
}
