//! Population-wide allele-frequency analysis.

pub mod alleles;

pub use alleles::{
    bucket_index, Allele, AlleleBins, AlleleCount, AlleleHistogram, NormalizedAlleleBins,
    BUCKET_COUNT, NORMALIZED_BUCKET_COUNT,
};
