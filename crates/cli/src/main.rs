mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::{Context, Result};
use clap::Parser;
use mendel_sim::simulation::Config;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::Cli;
use commands::{init, run};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let defaults = cli.defaults_file.clone().or_else(defaults::find_defaults_file);

    if let Some(path) = &cli.create {
        init_tracing(1);
        return init::create_config(path, defaults.as_deref());
    }

    let config = match (&cli.file, &defaults) {
        (Some(file), defaults) => Config::load(file, defaults.as_deref())
            .with_context(|| format!("Failed to load configuration {}", file.display()))?,
        (None, Some(defaults)) => Config::load_defaults(defaults)
            .with_context(|| format!("Failed to load defaults {}", defaults.display()))?,
        (None, None) => Config::default(),
    };

    init_tracing(config.computation.verbosity);
    match &defaults {
        Some(path) => info!(path = %path.display(), "using defaults file"),
        None => warn!("no defaults file found, using built-in defaults"),
    }

    let options = run::RunOptions {
        output: cli.output.clone(),
        zip: cli.zip,
        user: cli.user.clone(),
    };
    run::run_simulation(config, &options)
}

/// Verbosity 0 logs warnings only, 1 info, 2 and up debug. `RUST_LOG` wins.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
