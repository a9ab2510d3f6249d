use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// The closed set of mutation kinds tracked by the engine.
///
/// Dominance is a property of the kind, never a separate flag. Initial alleles
/// are the contrasting pairs seeded into the founding population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    DeleteriousDominant,
    DeleteriousRecessive,
    Neutral,
    FavorableDominant,
    FavorableRecessive,
    DeleteriousInitialAllele,
    FavorableInitialAllele,
}

impl MutationKind {
    /// Every kind, in a fixed order usable as an array index.
    pub const ALL: [MutationKind; 7] = [
        MutationKind::DeleteriousDominant,
        MutationKind::DeleteriousRecessive,
        MutationKind::Neutral,
        MutationKind::FavorableDominant,
        MutationKind::FavorableRecessive,
        MutationKind::DeleteriousInitialAllele,
        MutationKind::FavorableInitialAllele,
    ];

    /// Position of this kind in [`MutationKind::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_deleterious(self) -> bool {
        matches!(
            self,
            MutationKind::DeleteriousDominant | MutationKind::DeleteriousRecessive
        )
    }

    #[inline]
    pub fn is_favorable(self) -> bool {
        matches!(
            self,
            MutationKind::FavorableDominant | MutationKind::FavorableRecessive
        )
    }

    #[inline]
    pub fn is_recessive(self) -> bool {
        matches!(
            self,
            MutationKind::DeleteriousRecessive | MutationKind::FavorableRecessive
        )
    }

    #[inline]
    pub fn is_initial_allele(self) -> bool {
        matches!(
            self,
            MutationKind::DeleteriousInitialAllele | MutationKind::FavorableInitialAllele
        )
    }
}

/// One mutation record. Immutable once created.
///
/// `fitness_effect` is the expressed effect (already scaled by dominance), so
/// summing it over a linkage block yields the block's contribution directly.
/// Neutral records carry an effect of zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub id: u64,
    pub kind: MutationKind,
    pub fitness_effect: f32,
}

impl Mutation {
    pub fn new(id: u64, kind: MutationKind, fitness_effect: f32) -> Self {
        Self {
            id,
            kind,
            fitness_effect,
        }
    }

    pub fn neutral(id: u64) -> Self {
        Self::new(id, MutationKind::Neutral, 0.0)
    }
}

/// Per-kind mutation counters.
///
/// Dominant and recessive mutations share the `deleterious`/`favorable`
/// counters; the allele counters track seeded contrasting alleles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    pub deleterious: u32,
    pub neutral: u32,
    pub favorable: u32,
    pub del_allele: u32,
    pub fav_allele: u32,
}

impl MutationStats {
    /// Count one mutation of `kind`.
    #[inline]
    pub fn record(&mut self, kind: MutationKind) {
        match kind {
            MutationKind::DeleteriousDominant | MutationKind::DeleteriousRecessive => {
                self.deleterious += 1
            }
            MutationKind::Neutral => self.neutral += 1,
            MutationKind::FavorableDominant | MutationKind::FavorableRecessive => {
                self.favorable += 1
            }
            MutationKind::DeleteriousInitialAllele => self.del_allele += 1,
            MutationKind::FavorableInitialAllele => self.fav_allele += 1,
        }
    }

    /// Mutations that arose during the run (initial alleles excluded).
    #[inline]
    pub fn new_mutations(&self) -> u32 {
        self.deleterious + self.neutral + self.favorable
    }

    /// Everything counted, initial alleles included.
    #[inline]
    pub fn total(&self) -> u32 {
        self.new_mutations() + self.del_allele + self.fav_allele
    }
}

impl AddAssign for MutationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.deleterious += rhs.deleterious;
        self.neutral += rhs.neutral;
        self.favorable += rhs.favorable;
        self.del_allele += rhs.del_allele;
        self.fav_allele += rhs.fav_allele;
    }
}
