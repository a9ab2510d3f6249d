use indicatif::{ProgressBar, ProgressStyle};
use mendel_sim::simulation::{Config, PopulationStats, StopReason};
use std::path::Path;

pub fn print_parameters(config: &Config) {
    let b = &config.basic;
    let m = &config.mutations;
    let p = &config.population;
    let s = &config.selection;
    let c = &config.computation;

    println!("\n📋 Simulation Configuration");
    println!("  • Case ID: {}", b.case_id);
    if !b.description.is_empty() {
        println!("  • Description: {}", b.description);
    }
    println!("  • Population Size: {}", b.pop_size);
    println!("  • Generations: {}", b.num_generations);
    println!("  • Random Seed: {}", c.random_number_seed);

    println!("\n🧬 Genome Structure");
    println!("  • Haploid Chromosomes: {}", p.haploid_chromosome_number);
    println!(
        "  • Linkage Blocks: {} ({} per chromosome)",
        p.num_linkage_subunits,
        p.lbs_per_chromosome()
    );
    println!("  • Ploidy: Diploid");

    println!("\n⚡ Mutation Parameters");
    println!(
        "  • Rate: {} per offspring ({:?})",
        m.mutn_rate, m.mutn_rate_model
    );
    println!("  • Effect Model: {:?}", m.fitness_effect_model);
    println!(
        "  • Favorable: {:.4}, Neutral: {:.4}, Recessive: {:.4}",
        m.frac_fav_mutn, m.fraction_neutral, m.fraction_recessive
    );

    println!("\n🔀 Reproduction & Recombination");
    println!(
        "  • Offspring: {:?}, reproductive rate {}",
        p.num_offspring_model, p.reproductive_rate
    );
    println!(
        "  • Crossover: {:?} (mean {} crossovers)",
        p.crossover_model, p.mean_num_crossovers
    );
    println!("  • Growth: {:?}", p.pop_growth_model);
    if p.num_contrasting_alleles > 0 {
        println!(
            "  • Initial Alleles: {} pairs in {:.0}% of founders",
            p.num_contrasting_alleles,
            p.initial_alleles_pop_frac * 100.0
        );
    }

    println!("\n🎯 Selection");
    println!("  • Model: {:?}", s.selection_model);
    println!(
        "  • Heritability: {}, Non-scaling Noise: {}",
        s.heritability, s.non_scaling_noise
    );
    if s.fraction_random_death > 0.0 {
        println!("  • Random Death: {}", s.fraction_random_death);
    }
    println!();
}

pub fn progress_bar(num_generations: u32) -> ProgressBar {
    let pb = ProgressBar::new(num_generations as u64);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

pub fn print_summary(last: Option<&PopulationStats>, reason: StopReason, output: &Path) {
    match reason {
        StopReason::Completed => println!("\n✓ Simulation complete!"),
        StopReason::Extinct => println!("\n⚠️  Population went extinct."),
        StopReason::PopulationCap => println!("\n⚠️  Population exceeded max_pop_size."),
    }
    if let Some(stats) = last {
        println!("  Final generation: {}", stats.generation);
        println!("  Population size: {}", stats.size);
        println!("  Mean fitness: {:.6}", stats.mean_fitness);
        println!("  Mean mutations: {:.2}", stats.mean_mutations);
    }
    println!("  Output: {}", output.display());
}
