//! End-to-end runs of the generation driver.

use mendel_sim::analysis::AlleleCount;
use mendel_sim::base::seeded;
use mendel_sim::evolution::{
    CrossoverKind, FitnessEffectModel, OffspringKind, SelectionKind, SelectionModel,
};
use mendel_sim::genome::{Individual, Mutation, MutationKind};
use mendel_sim::simulation::{Config, Models, Simulation, StopReason};
use mendel_sim::storage::{Recorder, FITNESS_FILE, HISTORY_FILE};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn base_config(pop_size: usize, num_generations: u32) -> Config {
    let mut config = Config::default();
    config.basic.case_id = "test".into();
    config.basic.pop_size = pop_size;
    config.basic.num_generations = num_generations;
    config.population.haploid_chromosome_number = 4;
    config.population.num_linkage_subunits = 40;
    config.computation.num_threads = 1;
    config
}

fn run_to(dir: &Path, config: Config) -> Simulation {
    let recorder = Recorder::create(dir, &config).unwrap();
    let mut sim = Simulation::new(config).unwrap().with_recorder(recorder);
    sim.run(|_| {}).unwrap();
    sim
}

/// Data rows of a `#`-headed table, split on tabs.
fn rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

#[test]
fn test_genesis_without_mutations() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.basic.pop_size = 100;
    config.basic.num_generations = 1;
    config.mutations.mutn_rate = 0.0;
    config.computation.num_threads = 1;

    let sim = run_to(dir.path(), config);
    assert_eq!(sim.stop_reason(), Some(StopReason::Completed));

    let fit = rows(&dir.path().join(FITNESS_FILE));
    let hst = rows(&dir.path().join(HISTORY_FILE));
    assert_eq!(fit.len(), 1);
    assert_eq!(hst.len(), 1);

    let stats = sim.population().stats(1);
    assert_eq!(stats.mean_fitness, 1.0);
    assert_eq!(stats.total_mutations, 0);
    assert_eq!(fit[0][3], "1.000000");
    assert_eq!(fit[0][6], "0");
    for value in &hst[0][1..] {
        assert_eq!(value, "0.000000");
    }
}

fn truncation_config() -> Config {
    let mut config = base_config(10, 5);
    config.mutations.mutn_rate = 10.0;
    config.mutations.fitness_effect_model = FitnessEffectModel::Fixed;
    config.mutations.fixed_fitness_effect_del = 0.001;
    config.population.num_offspring_model = OffspringKind::Fixed;
    config.selection.selection_model = SelectionKind::FullTruncation;
    config.computation.random_number_seed = 1;
    config
}

#[test]
fn test_truncation_run_is_deterministic() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    run_to(first.path(), truncation_config());
    run_to(second.path(), truncation_config());

    for name in [FITNESS_FILE, HISTORY_FILE] {
        let a = fs::read_to_string(first.path().join(name)).unwrap();
        let b = fs::read_to_string(second.path().join(name)).unwrap();
        assert_eq!(a, b, "{name} differs between identical runs");
    }

    let fit = rows(&first.path().join(FITNESS_FILE));
    assert_eq!(fit.len(), 5);
    let mut previous = 1.0;
    for row in &fit {
        assert_eq!(row[1], "10");
        let mean: f64 = row[3].parse().unwrap();
        assert!(mean < 1.0);
        // Only deleterious effects: the mean may wobble by a mutation at most.
        assert!(mean <= previous + 0.002, "{mean} after {previous}");
        previous = mean;
    }
}

#[test]
fn test_multi_worker_run_is_deterministic() {
    let mut config = truncation_config();
    config.basic.pop_size = 40;
    config.computation.num_threads = 4;

    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    run_to(first.path(), config.clone());
    run_to(second.path(), config);
    assert_eq!(
        fs::read_to_string(first.path().join(FITNESS_FILE)).unwrap(),
        fs::read_to_string(second.path().join(FITNESS_FILE)).unwrap()
    );
}

#[test]
fn test_partial_crossover_keeps_chromosome_length() {
    let mut config = base_config(20, 3);
    config.mutations.mutn_rate = 4.0;
    config.population.crossover_model = CrossoverKind::Partial;
    config.population.mean_num_crossovers = 2;
    let lbs_per_chromosome = config.population.lbs_per_chromosome();

    let mut sim = Simulation::new(config).unwrap();
    sim.run(|_| {}).unwrap();
    assert_eq!(sim.generation(), 3);
    for ind in sim.population().iter() {
        for chr in ind.dad().iter().chain(ind.mom()) {
            assert_eq!(chr.len(), lbs_per_chromosome);
            let sum: f32 = chr.lbs().iter().map(|lb| lb.fitness_effect()).sum();
            assert!((chr.fitness_effect() - sum).abs() < 1e-5);
        }
    }
}

#[test]
fn test_initial_alleles_one_pair_per_linkage_block() {
    let mut config = base_config(12, 1);
    let num_lbs = config.population.num_linkage_subunits;
    config.population.num_contrasting_alleles = num_lbs as u32;
    config.population.initial_alleles_pop_frac = 1.0;
    config.population.max_total_fitness_increase = 0.1;

    let sim = Simulation::new(config).unwrap();
    for ind in sim.population().iter() {
        let stats = ind.mutation_stats();
        assert_eq!(stats.del_allele as usize, num_lbs);
        assert_eq!(stats.fav_allele as usize, num_lbs);

        let pairs_per_lb = ind
            .dad()
            .iter()
            .zip(ind.mom())
            .flat_map(|(d, m)| d.lbs().iter().zip(m.lbs()))
            .map(|(d, m)| {
                let mut s = d.mutation_stats();
                s += m.mutation_stats();
                (s.del_allele, s.fav_allele)
            });
        for pair in pairs_per_lb {
            assert_eq!(pair, (1, 1));
        }
    }
}

#[test]
fn test_spps_kills_before_ranking() {
    let mut config = base_config(100, 1);
    config.population.reproductive_rate = 1.2;
    config.selection.selection_model = SelectionKind::Spps;
    config.selection.non_scaling_noise = 0.5;
    let models = Models::from_config(&config).unwrap();
    assert_eq!(models.selection, SelectionModel::Spps);

    let pairs = config.basic.pop_size as f64 / 2.0;
    let num_offspring = (models.offspring.mean() * pairs).round() as usize;
    assert_eq!(num_offspring, 120);
    let mut individuals: Vec<Individual> = (0..num_offspring)
        .map(|_| Individual::new(4, 10))
        .collect();
    let mut views: Vec<&mut Individual> = individuals.iter_mut().collect();
    let noise = SelectionModel::environmental_noise(
        0.0,
        config.selection.heritability,
        config.selection.non_scaling_noise,
    );
    let mut rng = seeded(5);
    models.selection.apply(&mut views, noise, &mut rng);

    let dead = individuals.iter().filter(|i| i.is_dead()).count();
    assert!(dead > 0);
    assert!(dead < num_offspring);
    for ind in individuals.iter().filter(|i| !i.is_dead()) {
        assert!(ind.pheno_fitness() >= 1.0);
    }
}

#[test]
fn test_hand_built_histogram() {
    let pop_size = 100;
    let rare = Mutation::new(1, MutationKind::DeleteriousDominant, -0.01);
    let half = Mutation::new(2, MutationKind::DeleteriousDominant, -0.01);
    let fixed = Mutation::new(3, MutationKind::DeleteriousDominant, -0.01);

    let mut total = AlleleCount::new();
    for i in 0..pop_size {
        let mut one = AlleleCount::new();
        if i == 0 {
            one.insert(&rare, false);
        }
        if i < 50 {
            one.insert(&half, false);
        }
        one.insert(&fixed, false);
        total.merge(&one);
    }

    let hist = total.histogram(pop_size, false);
    let filled: Vec<usize> = hist
        .deleterious
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n > 0)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(filled, vec![0, 49, 99]);
    assert_eq!(hist.total(), 3);
}

#[test]
fn test_allele_output_files() {
    let dir = tempdir().unwrap();
    let mut config = base_config(10, 4);
    config.mutations.mutn_rate = 5.0;
    config.computation.plot_allele_gens = 2;
    run_to(dir.path(), config);

    let mut names: Vec<String> = fs::read_dir(dir.path().join("allele-bins"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["00000002.json", "00000004.json"]);
    assert!(dir
        .path()
        .join("normalized-allele-bins")
        .join("00000004.json")
        .exists());
}
