use crate::analysis::AlleleCount;
use crate::base::IdSource;
use crate::evolution::{InitialAlleleLaw, MutationModel};
use crate::genome::{Mutation, MutationKind, MutationStats};
use rand::Rng;
use std::sync::Arc;

/// A linkage block: the unit of inheritance during recombination.
///
/// The mutation buffer is reference counted. An offspring block produced by
/// [`share`](Self::share) aliases its parent's buffer and sets
/// `shared_with_parent`; the first append materializes a private copy. Blocks
/// that never mutate therefore cost one pointer copy per generation.
///
/// Counters include mutations that were too small to keep a record for, so
/// they can exceed the number of stored records.
#[derive(Debug)]
pub struct LinkageBlock {
    mutations: Arc<Vec<Mutation>>,
    shared_with_parent: bool,
    fitness_effect: f32,
    n_deleterious: u16,
    n_neutral: u16,
    n_favorable: u16,
    n_del_allele: u16,
    n_fav_allele: u16,
}

impl Default for LinkageBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LinkageBlock {
    /// Cloning is sharing: the copy aliases the same mutation buffer.
    fn clone(&self) -> Self {
        self.share()
    }
}

impl LinkageBlock {
    /// An empty block with its own (empty) buffer.
    pub fn new() -> Self {
        Self {
            mutations: Arc::new(Vec::new()),
            shared_with_parent: false,
            fitness_effect: 0.0,
            n_deleterious: 0,
            n_neutral: 0,
            n_favorable: 0,
            n_del_allele: 0,
            n_fav_allele: 0,
        }
    }

    /// Shallow copy for an offspring: aliases the mutation buffer and marks
    /// the copy as shared so its first write does not touch the parent.
    #[inline]
    pub fn share(&self) -> Self {
        Self {
            mutations: Arc::clone(&self.mutations),
            shared_with_parent: true,
            fitness_effect: self.fitness_effect,
            n_deleterious: self.n_deleterious,
            n_neutral: self.n_neutral,
            n_favorable: self.n_favorable,
            n_del_allele: self.n_del_allele,
            n_fav_allele: self.n_fav_allele,
        }
    }

    /// Stored mutation records, in insertion order.
    #[inline]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    #[inline]
    pub fn is_shared_with_parent(&self) -> bool {
        self.shared_with_parent
    }

    /// Whether two blocks alias the same mutation buffer.
    #[inline]
    pub fn shares_buffer_with(&self, other: &LinkageBlock) -> bool {
        Arc::ptr_eq(&self.mutations, &other.mutations)
    }

    /// Allocated record capacity of the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mutations.capacity()
    }

    /// Running sum of the expressed effects of everything in this block.
    #[inline]
    pub fn fitness_effect(&self) -> f32 {
        self.fitness_effect
    }

    /// Per-kind counters, read in O(1).
    #[inline]
    pub fn mutation_stats(&self) -> MutationStats {
        MutationStats {
            deleterious: self.n_deleterious as u32,
            neutral: self.n_neutral as u32,
            favorable: self.n_favorable as u32,
            del_allele: self.n_del_allele as u32,
            fav_allele: self.n_fav_allele as u32,
        }
    }

    /// Create one new mutation in this block.
    ///
    /// The kind and expressed effect come from `model`. Mutations below the
    /// tracking threshold only bump the counters; the effect is added to the
    /// block's fitness either way.
    pub fn append_mutation<R: Rng + ?Sized>(
        &mut self,
        id: u64,
        model: &MutationModel,
        rng: &mut R,
    ) -> (MutationKind, f32) {
        let (kind, effect) = model.draw(rng);
        self.count(kind);
        if model.tracks(kind, effect) {
            self.push(Mutation::new(id, kind, effect));
        }
        self.fitness_effect += effect;
        (kind, effect)
    }

    /// Seed one contrasting allele pair: `+e` here, `-e` in `other`.
    ///
    /// `self` and `other` are the blocks at the same position on the two
    /// chromosome sets of one individual.
    pub fn append_initial_contrasting_pair<I, R>(
        &mut self,
        other: &mut LinkageBlock,
        ids: &mut I,
        law: &InitialAlleleLaw,
        rng: &mut R,
    ) -> f32
    where
        I: IdSource + ?Sized,
        R: Rng + ?Sized,
    {
        let effect = law.draw(rng);

        self.count(MutationKind::FavorableInitialAllele);
        self.push(Mutation::new(
            ids.next_id(),
            MutationKind::FavorableInitialAllele,
            effect,
        ));
        self.fitness_effect += effect;

        other.count(MutationKind::DeleteriousInitialAllele);
        other.push(Mutation::new(
            ids.next_id(),
            MutationKind::DeleteriousInitialAllele,
            -effect,
        ));
        other.fitness_effect -= effect;

        effect
    }

    /// Add every stored record to `sink`.
    pub fn count_alleles(&self, sink: &mut AlleleCount, count_duplicates: bool) {
        for mutation in self.mutations.iter() {
            sink.insert(mutation, count_duplicates);
        }
    }

    #[inline]
    fn count(&mut self, kind: MutationKind) {
        let counter = match kind {
            MutationKind::DeleteriousDominant | MutationKind::DeleteriousRecessive => {
                &mut self.n_deleterious
            }
            MutationKind::Neutral => &mut self.n_neutral,
            MutationKind::FavorableDominant | MutationKind::FavorableRecessive => {
                &mut self.n_favorable
            }
            MutationKind::DeleteriousInitialAllele => &mut self.n_del_allele,
            MutationKind::FavorableInitialAllele => &mut self.n_fav_allele,
        };
        *counter = counter.saturating_add(1);
    }

    /// Append a record, materializing a private buffer if needed.
    ///
    /// Growth is by exactly two slots: almost every block gets zero or one new
    /// mutation per generation.
    fn push(&mut self, mutation: Mutation) {
        if !self.shared_with_parent {
            if let Some(buffer) = Arc::get_mut(&mut self.mutations) {
                if buffer.len() == buffer.capacity() {
                    buffer.reserve_exact(2);
                }
                buffer.push(mutation);
                return;
            }
        }

        let mut owned = Vec::with_capacity(self.mutations.len() + 2);
        owned.extend_from_slice(&self.mutations);
        owned.push(mutation);
        self.mutations = Arc::new(owned);
        self.shared_with_parent = false;
    }
}
