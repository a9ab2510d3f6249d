use anyhow::{Context, Result};
use mendel_sim::simulation::{Config, Simulation};
use mendel_sim::storage::Recorder;
use std::path::PathBuf;

use crate::commands::archive::pack_output;
use crate::printing::{print_parameters, print_summary, progress_bar};

/// Where the run writes and what happens afterwards.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Overrides `<data_file_path>/<case_id>`.
    pub output: Option<PathBuf>,
    pub zip: bool,
    pub user: Option<String>,
}

impl RunOptions {
    pub fn output_dir(&self, config: &Config) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            config
                .computation
                .data_file_path
                .join(&config.basic.case_id)
        })
    }
}

pub fn run_simulation(config: Config, options: &RunOptions) -> Result<()> {
    let verbosity = config.computation.verbosity;
    let output = options.output_dir(&config);
    let case_id = config.basic.case_id.clone();
    let num_generations = config.basic.num_generations;

    if verbosity > 0 {
        println!("🧬 Mendel - Running Simulation");
        println!("============================================");
        print_parameters(&config);
    }

    let recorder_config = config.clone();
    let sim = Simulation::new(config).context("Failed to initialize simulation")?;
    let recorder = Recorder::create(&output, &recorder_config)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    let mut sim = sim.with_recorder(recorder);

    let pb = (verbosity == 1).then(|| progress_bar(num_generations));
    let mut last = None;
    let reason = sim.run(|report| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
        last = Some(report.stats);
    });
    if let Some(pb) = &pb {
        pb.finish_with_message("Done");
    }
    let reason = reason.with_context(|| format!("Simulation {case_id} failed"))?;

    if verbosity > 0 {
        print_summary(last.as_ref(), reason, &output);
    }

    if options.zip {
        let archive = pack_output(&output, &case_id, options.user.as_deref())
            .context("Failed to archive output")?;
        println!("✓ Archive written to {}", archive.display());
    }
    Ok(())
}
