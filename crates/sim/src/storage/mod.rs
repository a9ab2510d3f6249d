//! Storage module for persisting simulation output.
//!
//! Per-generation tables are plain text, allele histograms are JSON. All
//! writes happen on the driver thread.

mod recorder;

pub use recorder::{
    allele_file_name, Recorder, ALLELE_BINS_DIR, CONFIG_FILE, FITNESS_FILE, HISTORY_FILE,
    NORMALIZED_ALLELE_BINS_DIR,
};
