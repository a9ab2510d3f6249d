use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Mendel: a forward-time simulator of mutation accumulation
///
/// Runs a diploid, sexually reproducing population through a number of
/// generations of mutation, recombination and selection, and writes
/// per-generation statistics and allele-frequency histograms.
#[derive(Parser, Debug)]
#[command(name = "mendel")]
#[command(author, version, about = "Forward-time simulation of mutation accumulation", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["file", "defaults", "create"])))]
pub struct Cli {
    /// Run with the given configuration file
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Run with the defaults file only
    #[arg(short = 'd', long = "defaults")]
    pub defaults: bool,

    /// Write a defaults-primed configuration file and exit
    #[arg(short = 'c', long = "create", value_name = "FILE")]
    pub create: Option<PathBuf>,

    /// Defaults file to use instead of searching for one
    #[arg(short = 'D', long = "defaults-file", value_name = "PATH")]
    pub defaults_file: Option<PathBuf>,

    /// Output directory (default: <data_file_path>/<case_id>)
    #[arg(short = 'O', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Pack the output directory into a zip file after the run
    #[arg(short = 'z', long = "zip", conflicts_with = "create")]
    pub zip: bool,

    /// User name to prefix the zip file with
    #[arg(short = 'u', long = "user", value_name = "USER", requires = "zip")]
    pub user: Option<String>,
}
