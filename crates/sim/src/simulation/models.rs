//! The model registry: every algorithm choice of a run, bound once from the
//! configuration and read by the hot loop.

use crate::errors::ConfigError;
use crate::evolution::{
    CrossoverModel, FitnessEffectLaw, FitnessEffectModel, FitnessModel, GrowthModel,
    InitialAlleleLaw, MutationModel, OffspringKind, OffspringModel, SelectionModel,
};
use crate::simulation::Config;

/// Initial contrasting alleles seeded into the founders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialAlleles {
    /// Allele pairs given to each chosen founder.
    pub num_contrasting_alleles: u32,
    /// Share of founders that receive them.
    pub pop_frac: f64,
    pub law: InitialAlleleLaw,
}

/// Resolved algorithm choices.
#[derive(Debug, Clone)]
pub struct Models {
    pub offspring: OffspringModel,
    pub mutation: MutationModel,
    pub crossover: CrossoverModel,
    pub fitness: FitnessModel,
    pub selection: SelectionModel,
    pub growth: GrowthModel,
    pub initial_alleles: Option<InitialAlleles>,
}

impl Models {
    /// Bind every model named in `config`.
    ///
    /// Models that exist in the configuration surface without an
    /// implementation are rejected here, before any state is built.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let m = &config.mutations;
        let p = &config.population;
        let s = &config.selection;
        let c = &config.computation;

        let mean = OffspringModel::mean_per_pair(p.reproductive_rate, s.fraction_random_death);
        let offspring = match p.num_offspring_model {
            OffspringKind::Uniform => OffspringModel::Uniform { mean },
            OffspringKind::Fixed => OffspringModel::Fixed { mean },
            OffspringKind::Fitness => {
                return Err(ConfigError::NotImplemented("fitness-proportional offspring model"))
            }
        };

        if m.multiplicative_weighting != 0.0 {
            return Err(ConfigError::NotImplemented(
                "multiplicative fitness aggregation (multiplicative_weighting > 0)",
            ));
        }

        let effect_law = match m.fitness_effect_model {
            FitnessEffectModel::Uniform => FitnessEffectLaw::Uniform {
                max_magnitude: m.high_impact_mutn_fraction,
            },
            FitnessEffectModel::Weibull => FitnessEffectLaw::weibull(
                m.genome_size,
                m.high_impact_mutn_fraction,
                m.high_impact_mutn_threshold,
                m.max_fav_fitness_gain,
            )?,
            FitnessEffectModel::Fixed => FitnessEffectLaw::Fixed {
                deleterious: m.fixed_fitness_effect_del,
                favorable: m.fixed_fitness_effect_fav,
            },
        };

        let mutation = MutationModel {
            rate: m.mutn_rate,
            rate_model: m.mutn_rate_model,
            fraction_neutral: m.fraction_neutral,
            frac_fav_mutn: m.frac_fav_mutn,
            fraction_recessive: m.fraction_recessive,
            recessive_hetero_expression: m.recessive_hetero_expression,
            dominant_hetero_expression: m.dominant_hetero_expression,
            effect_law,
            tracking_threshold: m.tracking_threshold,
            track_neutrals: c.track_neutrals,
        };

        let initial_alleles = (p.num_contrasting_alleles > 0 && p.initial_alleles_pop_frac > 0.0)
            .then(|| InitialAlleles {
                num_contrasting_alleles: p.num_contrasting_alleles,
                pop_frac: p.initial_alleles_pop_frac,
                law: InitialAlleleLaw::new(
                    p.initial_allele_fitness_model,
                    p.max_total_fitness_increase,
                    p.num_contrasting_alleles,
                ),
            });

        Ok(Self {
            offspring,
            mutation,
            crossover: CrossoverModel::new(p.crossover_model, p.mean_num_crossovers),
            fitness: FitnessModel::Additive,
            selection: SelectionModel::new(s.selection_model, s.partial_truncation_value),
            growth: config.growth_model(),
            initial_alleles,
        })
    }
}
