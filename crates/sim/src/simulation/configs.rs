//! Simulation configuration.
//!
//! A run is fully described by one [`Config`], read from TOML. Every key is
//! optional: a missing key falls back to the defaults file (if one was given)
//! and then to the built-in default.
//!
//! ```toml
//! [basic]
//! case_id = "test01"
//! pop_size = 100
//! num_generations = 200
//!
//! [mutations]
//! mutn_rate = 10.0
//! fitness_effect_model = "weibull"
//!
//! [selection]
//! selection_model = "spps"
//! ```

use crate::errors::ConfigError;
use crate::evolution::{
    CrossoverKind, FitnessEffectModel, GrowthKind, GrowthModel, InitialAlleleModel, MutationRateModel,
    OffspringKind, SelectionKind,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The master configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub mutations: MutationsConfig,
    pub population: PopulationConfig,
    pub selection: SelectionConfig,
    pub computation: ComputationConfig,
}

/// Identity and size of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub case_id: String,
    pub description: String,
    pub pop_size: usize,
    pub num_generations: u32,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            case_id: "999999".to_string(),
            description: "Mendel defaults".to_string(),
            pop_size: 100,
            num_generations: 200,
        }
    }
}

/// New-mutation laws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationsConfig {
    /// Mean new mutations per offspring.
    pub mutn_rate: f64,
    pub mutn_rate_model: MutationRateModel,
    pub frac_fav_mutn: f64,
    pub fraction_neutral: f64,
    pub fitness_effect_model: FitnessEffectModel,
    pub fixed_fitness_effect_del: f64,
    pub fixed_fitness_effect_fav: f64,
    /// Haploid genome size in base pairs; sets the Weibull scale.
    pub genome_size: f64,
    pub high_impact_mutn_fraction: f64,
    pub high_impact_mutn_threshold: f64,
    pub max_fav_fitness_gain: f64,
    pub fraction_recessive: f64,
    pub recessive_hetero_expression: f64,
    pub dominant_hetero_expression: f64,
    /// 0 selects additive aggregation of mutation effects.
    pub multiplicative_weighting: f64,
    /// Mutations with a smaller magnitude are counted but not stored.
    pub tracking_threshold: f32,
}

impl Default for MutationsConfig {
    fn default() -> Self {
        Self {
            mutn_rate: 10.0,
            mutn_rate_model: MutationRateModel::Poisson,
            frac_fav_mutn: 0.0,
            fraction_neutral: 0.0,
            fitness_effect_model: FitnessEffectModel::Weibull,
            fixed_fitness_effect_del: 0.001,
            fixed_fitness_effect_fav: 0.0001,
            genome_size: 3.0e8,
            high_impact_mutn_fraction: 0.001,
            high_impact_mutn_threshold: 0.1,
            max_fav_fitness_gain: 0.01,
            fraction_recessive: 0.0,
            recessive_hetero_expression: 0.5,
            dominant_hetero_expression: 0.5,
            multiplicative_weighting: 0.0,
            tracking_threshold: 0.0,
        }
    }
}

/// Genome layout, reproduction, growth and initial alleles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub reproductive_rate: f64,
    pub num_offspring_model: OffspringKind,
    pub crossover_model: CrossoverKind,
    pub mean_num_crossovers: u32,
    pub haploid_chromosome_number: usize,
    /// Linkage blocks in one haploid set; a multiple of the chromosome number.
    pub num_linkage_subunits: usize,
    pub pop_growth_model: GrowthKind,
    pub pop_growth_rate: f64,
    pub pop_growth_rate2: f64,
    pub carrying_capacity: usize,
    /// Stop once the population exceeds this size. 0 disables the cap.
    pub max_pop_size: usize,
    pub bottleneck_generation: u32,
    pub bottleneck_pop_size: usize,
    pub num_bottleneck_generations: u32,
    pub num_contrasting_alleles: u32,
    pub initial_alleles_pop_frac: f64,
    pub max_total_fitness_increase: f64,
    pub initial_allele_fitness_model: InitialAlleleModel,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            reproductive_rate: 2.0,
            num_offspring_model: OffspringKind::Uniform,
            crossover_model: CrossoverKind::Partial,
            mean_num_crossovers: 2,
            haploid_chromosome_number: 23,
            num_linkage_subunits: 989,
            pop_growth_model: GrowthKind::None,
            pop_growth_rate: 1.0,
            pop_growth_rate2: 1.0,
            carrying_capacity: 1000,
            max_pop_size: 0,
            bottleneck_generation: 0,
            bottleneck_pop_size: 0,
            num_bottleneck_generations: 0,
            num_contrasting_alleles: 0,
            initial_alleles_pop_frac: 0.0,
            max_total_fitness_increase: 0.0,
            initial_allele_fitness_model: InitialAlleleModel::Uniform,
        }
    }
}

impl PopulationConfig {
    pub fn lbs_per_chromosome(&self) -> usize {
        if self.haploid_chromosome_number == 0 {
            0
        } else {
            self.num_linkage_subunits / self.haploid_chromosome_number
        }
    }
}

/// Selection noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub selection_model: SelectionKind,
    pub heritability: f64,
    pub non_scaling_noise: f64,
    pub partial_truncation_value: f64,
    pub fraction_random_death: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            selection_model: SelectionKind::Spps,
            heritability: 0.2,
            non_scaling_noise: 0.05,
            partial_truncation_value: 0.5,
            fraction_random_death: 0.0,
        }
    }
}

/// Execution, tracking and output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputationConfig {
    pub random_number_seed: u64,
    /// Mating workers. 0 uses one per available core.
    pub num_threads: usize,
    /// 0 = warnings only, 1 = progress, 2+ = debug.
    pub verbosity: u8,
    pub track_neutrals: bool,
    pub count_duplicate_alleles: bool,
    /// Allele histograms every this many generations. 0 disables them.
    pub plot_allele_gens: u32,
    pub omit_first_allele_bin: bool,
    /// Release memory eagerly after the final allele count.
    pub force_gc: bool,
    pub data_file_path: PathBuf,
}

impl Default for ComputationConfig {
    fn default() -> Self {
        Self {
            random_number_seed: 42,
            num_threads: 0,
            verbosity: 1,
            track_neutrals: false,
            count_duplicate_alleles: false,
            plot_allele_gens: 0,
            omit_first_allele_bin: false,
            force_gc: false,
            data_file_path: PathBuf::from("./output"),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load `path`, with every key it leaves unset taken from `defaults`.
    pub fn load(path: &Path, defaults: Option<&Path>) -> Result<Self, ConfigError> {
        let mut table = match defaults {
            Some(defaults) => read_table(defaults)?,
            None => toml::Table::new(),
        };
        merge_tables(&mut table, read_table(path)?);
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Load only a defaults file.
    pub fn load_defaults(path: &Path) -> Result<Self, ConfigError> {
        Ok(toml::Value::Table(read_table(path)?).try_into()?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The growth law named by `pop_growth_model`.
    pub fn growth_model(&self) -> GrowthModel {
        let p = &self.population;
        match p.pop_growth_model {
            GrowthKind::None => GrowthModel::None {
                pop_size: self.basic.pop_size,
            },
            GrowthKind::Exponential => GrowthModel::Exponential {
                rate: p.pop_growth_rate,
            },
            GrowthKind::Capacity => GrowthModel::Capacity {
                rate: p.pop_growth_rate,
                carrying_capacity: p.carrying_capacity,
            },
            GrowthKind::Founders => GrowthModel::Founders {
                rate: p.pop_growth_rate,
                rate2: p.pop_growth_rate2,
                carrying_capacity: p.carrying_capacity,
                bottleneck_generation: p.bottleneck_generation,
                bottleneck_pop_size: p.bottleneck_pop_size,
                num_bottleneck_generations: p.num_bottleneck_generations,
            },
        }
    }

    /// Reject parameter combinations the engine cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.basic;
        let m = &self.mutations;
        let p = &self.population;
        let s = &self.selection;

        if b.pop_size < 2 {
            return Err(ConfigError::invalid("pop_size", "must be at least 2"));
        }
        if b.num_generations == 0 && p.max_pop_size == 0 {
            return Err(ConfigError::invalid(
                "num_generations",
                "must be positive unless max_pop_size caps the run",
            ));
        }

        if !(m.mutn_rate >= 0.0 && m.mutn_rate.is_finite()) {
            return Err(ConfigError::invalid("mutn_rate", "must be a non-negative number"));
        }
        for (name, value) in [
            ("frac_fav_mutn", m.frac_fav_mutn),
            ("fraction_neutral", m.fraction_neutral),
            ("fraction_recessive", m.fraction_recessive),
            ("recessive_hetero_expression", m.recessive_hetero_expression),
            ("dominant_hetero_expression", m.dominant_hetero_expression),
            ("initial_alleles_pop_frac", p.initial_alleles_pop_frac),
            ("fraction_random_death", s.fraction_random_death),
            ("high_impact_mutn_fraction", m.high_impact_mutn_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(name, format!("{value} is outside [0, 1]")));
            }
        }
        if s.fraction_random_death >= 1.0 {
            return Err(ConfigError::invalid("fraction_random_death", "must be below 1"));
        }
        if m.tracking_threshold < 0.0 {
            return Err(ConfigError::invalid("tracking_threshold", "must not be negative"));
        }
        if m.fitness_effect_model == FitnessEffectModel::Weibull
            && !(m.genome_size > 1.0
                && m.high_impact_mutn_fraction > 0.0
                && m.high_impact_mutn_threshold > 0.0
                && m.max_fav_fitness_gain >= 0.0)
        {
            return Err(ConfigError::invalid(
                "fitness_effect_model",
                "weibull needs positive genome_size, high_impact_mutn_fraction and high_impact_mutn_threshold",
            ));
        }

        if p.haploid_chromosome_number == 0 {
            return Err(ConfigError::invalid("haploid_chromosome_number", "must be positive"));
        }
        if p.num_linkage_subunits == 0 || p.num_linkage_subunits % p.haploid_chromosome_number != 0
        {
            return Err(ConfigError::invalid(
                "num_linkage_subunits",
                format!(
                    "must be a positive multiple of haploid_chromosome_number ({})",
                    p.haploid_chromosome_number
                ),
            ));
        }
        if !(p.reproductive_rate > 0.0) {
            return Err(ConfigError::invalid("reproductive_rate", "must be positive"));
        }
        match p.pop_growth_model {
            GrowthKind::None => {}
            GrowthKind::Exponential => {
                if !(p.pop_growth_rate > 0.0) {
                    return Err(ConfigError::invalid("pop_growth_rate", "must be positive"));
                }
            }
            GrowthKind::Capacity | GrowthKind::Founders => {
                if p.carrying_capacity == 0 {
                    return Err(ConfigError::invalid(
                        "carrying_capacity",
                        "must be positive for this growth model",
                    ));
                }
            }
        }
        if b.num_generations == 0 && !self.growth_model().can_exceed(p.max_pop_size) {
            return Err(ConfigError::invalid(
                "max_pop_size",
                format!(
                    "the {:?} growth model never exceeds {} and num_generations is 0",
                    p.pop_growth_model, p.max_pop_size
                ),
            ));
        }
        if p.num_contrasting_alleles > 0 && p.max_total_fitness_increase < 0.0 {
            return Err(ConfigError::invalid(
                "max_total_fitness_increase",
                "must not be negative",
            ));
        }

        if !(s.heritability > 0.0 && s.heritability <= 1.0) {
            return Err(ConfigError::invalid("heritability", "must be in (0, 1]"));
        }
        if s.non_scaling_noise < 0.0 {
            return Err(ConfigError::invalid("non_scaling_noise", "must not be negative"));
        }
        if s.selection_model == SelectionKind::PartialTruncation
            && !(s.partial_truncation_value > 0.0)
        {
            return Err(ConfigError::invalid(
                "partial_truncation_value",
                "must be positive for partial truncation",
            ));
        }
        Ok(())
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.parse::<toml::Table>()?)
}

/// Overlay `overlay` onto `base`, recursing into tables.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let value = match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(dst)), toml::Value::Table(src)) => {
                merge_tables(dst, src);
                continue;
            }
            (_, value) => value,
        };
        base.insert(key, value);
    }
}
