//! Text and JSON output of a run.
//!
//! Layout of the output directory:
//!
//! ```text
//! <dir>/mendel.toml                         effective configuration
//! <dir>/mendel.hst                          mean mutation counts per generation
//! <dir>/mendel.fit                          fitness summary per generation
//! <dir>/allele-bins/NNNNNNNN.json           absolute allele histogram
//! <dir>/normalized-allele-bins/NNNNNNNN.json
//! ```

use crate::analysis::AlleleHistogram;
use crate::errors::{OutputError, SimulationError};
use crate::simulation::{Config, PopulationStats};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "mendel.toml";
pub const HISTORY_FILE: &str = "mendel.hst";
pub const FITNESS_FILE: &str = "mendel.fit";
pub const ALLELE_BINS_DIR: &str = "allele-bins";
pub const NORMALIZED_ALLELE_BINS_DIR: &str = "normalized-allele-bins";

const HISTORY_HEADER: &str = "# generation\tmean_del\tmean_neutral\tmean_fav";
const FITNESS_HEADER: &str = "# generation\tpop_size\tavg_offspring\tavg_fitness\tmin_fitness\tmax_fitness\ttotal_mutns\tmean_mutns\tnoise";

/// Writes every output file of one run. Only the driver thread touches it.
#[derive(Debug)]
pub struct Recorder {
    dir: PathBuf,
    history: BufWriter<File>,
    fitness: BufWriter<File>,
}

impl Recorder {
    /// Create the output directory, write the effective configuration and
    /// the table headers.
    pub fn create(dir: impl Into<PathBuf>, config: &Config) -> Result<Self, SimulationError> {
        let dir = dir.into();
        for sub in [
            dir.clone(),
            dir.join(ALLELE_BINS_DIR),
            dir.join(NORMALIZED_ALLELE_BINS_DIR),
        ] {
            fs::create_dir_all(&sub).map_err(|e| OutputError::io(&sub, e))?;
        }

        let config_path = dir.join(CONFIG_FILE);
        let text = config.to_toml_string()?;
        fs::write(&config_path, text).map_err(|e| OutputError::io(&config_path, e))?;

        let history = open_table(&dir.join(HISTORY_FILE), HISTORY_HEADER)?;
        let fitness = open_table(&dir.join(FITNESS_FILE), FITNESS_HEADER)?;
        Ok(Self {
            dir,
            history,
            fitness,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append one row to `mendel.hst` and one to `mendel.fit`.
    pub fn record_generation(&mut self, stats: &PopulationStats) -> Result<(), OutputError> {
        writeln!(
            self.history,
            "{}\t{:.6}\t{:.6}\t{:.6}",
            stats.generation, stats.mean_deleterious, stats.mean_neutral, stats.mean_favorable
        )
        .map_err(|e| OutputError::io(self.dir.join(HISTORY_FILE), e))?;

        writeln!(
            self.fitness,
            "{}\t{}\t{:.4}\t{:.6}\t{:.6}\t{:.6}\t{}\t{:.4}\t{:.6}",
            stats.generation,
            stats.size,
            stats.actual_avg_offspring,
            stats.mean_fitness,
            stats.min_fitness,
            stats.max_fitness,
            stats.total_mutations,
            stats.mean_mutations,
            stats.env_noise,
        )
        .map_err(|e| OutputError::io(self.dir.join(FITNESS_FILE), e))
    }

    /// Write both allele histogram documents for `generation`.
    pub fn record_alleles(
        &mut self,
        generation: u32,
        histogram: &AlleleHistogram,
        omit_first_bin: bool,
    ) -> Result<(), OutputError> {
        let name = allele_file_name(generation);
        write_json(
            &self.dir.join(ALLELE_BINS_DIR).join(&name),
            &histogram.to_bins(generation, omit_first_bin),
        )?;
        write_json(
            &self.dir.join(NORMALIZED_ALLELE_BINS_DIR).join(&name),
            &histogram.to_normalized(generation, omit_first_bin),
        )
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.history
            .flush()
            .map_err(|e| OutputError::io(self.dir.join(HISTORY_FILE), e))?;
        self.fitness
            .flush()
            .map_err(|e| OutputError::io(self.dir.join(FITNESS_FILE), e))
    }
}

/// `NNNNNNNN.json`, the generation zero-padded to eight digits.
pub fn allele_file_name(generation: u32) -> String {
    format!("{generation:08}.json")
}

fn open_table(path: &Path, header: &str) -> Result<BufWriter<File>, OutputError> {
    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{header}").map_err(|e| OutputError::io(path, e))?;
    Ok(writer)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| OutputError::io(path, e))
}
