//! Filename metadata extractors
//!
//! Experiment date and time are not in the log body; they are encoded in the
//! filename by the experiment runner. Extractors map a log path to
//! [`ExperimentMetadata`] so alternate naming schemes can be added without
//! touching the trial pipeline.

mod psychopy;

pub use psychopy::PsychopyFilename;

use crate::error::ExtractError;
use crate::types::ExperimentMetadata;
use std::path::Path;

/// Trait for filename metadata extractors
pub trait MetadataExtractor {
    /// Extract experiment metadata from a log path
    fn extract(&self, path: &Path) -> Result<ExperimentMetadata, ExtractError>;
}
