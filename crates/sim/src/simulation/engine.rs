//! The generation driver.
//!
//! One generation is: compute the growth target, mate the parents into a
//! fresh population (in parallel), drop the parents, select, report. The
//! driver owns every piece of mutable run state, so workers only ever see
//! read-only views of it plus their private generator and ID range.

use crate::analysis::AlleleHistogram;
use crate::base::{seeded, SimRng, UniqueIdAllocator};
use crate::errors::SimulationError;
use crate::simulation::{Config, Models, Population, PopulationStats, Workers};
use crate::storage::Recorder;
use tracing::{debug, info, info_span};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `num_generations` generations ran.
    Completed,
    /// Fewer than two individuals survived selection.
    Extinct,
    /// The population outgrew `max_pop_size`.
    PopulationCap,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Extinct => write!(f, "population extinct"),
            Self::PopulationCap => write!(f, "population exceeded max_pop_size"),
        }
    }
}

/// What one call to [`Simulation::step`] produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub stats: PopulationStats,
    /// Present on allele-output generations.
    pub alleles: Option<AlleleHistogram>,
    /// Set on the last generation of the run.
    pub stop: Option<StopReason>,
}

/// A running simulation.
///
/// # Examples
///
/// ```
/// # use mendel_sim::simulation::{Config, Simulation, StopReason};
/// let mut config = Config::default();
/// config.basic.pop_size = 10;
/// config.basic.num_generations = 3;
/// config.mutations.mutn_rate = 1.0;
/// config.population.haploid_chromosome_number = 2;
/// config.population.num_linkage_subunits = 20;
/// config.computation.num_threads = 1;
///
/// let mut sim = Simulation::new(config)?;
/// let stop = sim.run(|_| {})?;
/// assert_eq!(stop, StopReason::Completed);
/// assert_eq!(sim.generation(), 3);
/// # Ok::<(), mendel_sim::errors::SimulationError>(())
/// ```
#[derive(Debug)]
pub struct Simulation {
    config: Config,
    models: Models,
    population: Population,
    generation: u32,
    rng: SimRng,
    ids: UniqueIdAllocator,
    workers: Workers,
    recorder: Option<Recorder>,
    stop: Option<StopReason>,
}

impl Simulation {
    /// Validate `config`, bind the models and build the founders.
    pub fn new(config: Config) -> Result<Self, SimulationError> {
        config.validate()?;
        let models = Models::from_config(&config)?;
        let seed = config.computation.random_number_seed;
        let workers = Workers::new(config.computation.num_threads, seed)?;
        let mut rng = seeded(seed);
        let mut ids = UniqueIdAllocator::new();

        let p = &config.population;
        let mut population = Population::genesis(
            config.basic.pop_size,
            p.haploid_chromosome_number,
            p.lbs_per_chromosome(),
        );
        if let Some(alleles) = &models.initial_alleles {
            population.generate_initial_alleles(alleles, &models.fitness, &mut ids, &mut rng);
        }

        info!(
            case_id = %config.basic.case_id,
            pop_size = config.basic.pop_size,
            num_generations = config.basic.num_generations,
            workers = workers.num_workers(),
            seed,
            "simulation initialized"
        );

        Ok(Self {
            config,
            models,
            population,
            generation: 0,
            rng,
            ids,
            workers,
            recorder: None,
            stop: None,
        })
    }

    /// Write output through `recorder` from now on.
    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn models(&self) -> &Models {
        &self.models
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Generations completed so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.stop.is_some()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// Run one generation. Returns `None` once the run has ended.
    pub fn step(&mut self) -> Result<Option<GenerationReport>, SimulationError> {
        if self.stop.is_some() {
            return Ok(None);
        }
        let generation = self.generation + 1;
        let target = self
            .models
            .growth
            .target_size(self.population.size(), generation);

        let offspring = {
            let _span = info_span!("mate", generation, target).entered();
            self.population.mate(
                target,
                &self.models,
                &mut self.workers,
                &mut self.rng,
                &mut self.ids,
            )
        };
        // Parents are dropped here, at the barrier.
        self.population = offspring;

        let removed = {
            let _span = info_span!("select", generation).entered();
            let s = &self.config.selection;
            self.population.select(
                &self.models.selection,
                s.heritability,
                s.non_scaling_noise,
                &mut self.rng,
            )
        };
        self.generation = generation;

        let stats = self.population.stats(generation);
        if !stats.mean_fitness.is_finite() && stats.size > 0 {
            return Err(SimulationError::Invariant(format!(
                "mean fitness is {} in generation {generation}",
                stats.mean_fitness
            )));
        }
        debug!(
            generation,
            size = stats.size,
            removed,
            mean_fitness = stats.mean_fitness,
            "generation done"
        );
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record_generation(&stats)?;
        }

        let stop = self.stop_condition(&stats);
        let alleles = if self.allele_output_due(generation, stop.is_some()) {
            let _span = info_span!("alleles", generation).entered();
            let c = &self.config.computation;
            let histogram = self
                .population
                .count_alleles(c.count_duplicate_alleles)
                .histogram(stats.size, c.count_duplicate_alleles);
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.record_alleles(generation, &histogram, c.omit_first_allele_bin)?;
            }
            Some(histogram)
        } else {
            None
        };

        if let Some(reason) = stop {
            self.finish(reason)?;
        }
        Ok(Some(GenerationReport {
            stats,
            alleles,
            stop,
        }))
    }

    /// Step until the run ends, handing every report to `observer`.
    pub fn run<F>(&mut self, mut observer: F) -> Result<StopReason, SimulationError>
    where
        F: FnMut(&GenerationReport),
    {
        while let Some(report) = self.step()? {
            observer(&report);
        }
        self.stop
            .ok_or_else(|| SimulationError::Invariant("run loop ended without a stop reason".into()))
    }

    fn stop_condition(&self, stats: &PopulationStats) -> Option<StopReason> {
        let num_generations = self.config.basic.num_generations;
        let max_pop_size = self.config.population.max_pop_size;
        if stats.size < 2 {
            Some(StopReason::Extinct)
        } else if self.models.growth.is_growing() && max_pop_size > 0 && stats.size > max_pop_size
        {
            Some(StopReason::PopulationCap)
        } else if num_generations > 0 && stats.generation >= num_generations {
            Some(StopReason::Completed)
        } else {
            None
        }
    }

    fn allele_output_due(&self, generation: u32, last: bool) -> bool {
        let every = self.config.computation.plot_allele_gens;
        every > 0 && (last || generation % every == 0)
    }

    fn finish(&mut self, reason: StopReason) -> Result<(), SimulationError> {
        self.stop = Some(reason);
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.flush()?;
        }
        if self.config.computation.force_gc {
            self.population.release();
        }
        info!(generation = self.generation, %reason, "simulation finished");
        Ok(())
    }
}
