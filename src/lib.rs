//! psylog - Trial extraction for PsychoPy experiment logs
//!
//! psylog turns a PsychoPy event log (`.log` or `.log.gz`) into a table of
//! trials through a deterministic pipeline: tokenization → autoDraw interval
//! extraction → positional alignment → response matching → trial assembly.
//!
//! ## Modules
//!
//! - **Trial Pipeline**: Process a single log file into [`Trial`] records
//! - **Batch Module**: Convert a directory of logs into CSV tables

pub mod align;
pub mod batch;
pub mod config;
pub mod error;
pub mod intervals;
pub mod metadata;
pub mod paths;
pub mod pipeline;
pub mod response;
pub mod tokenizer;
pub mod types;
pub mod writer;

pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use pipeline::{extract_trials, parse_log_file, TrialExtractor};
pub use types::{ExperimentMetadata, LogEvent, Trial, TRIAL_FIELDS};

// Batch exports
pub use batch::{batch_parse_logs, BatchOptions, BatchStatus, BatchSummary};
pub use paths::ProjectPaths;
pub use writer::{load_trials_csv, save_trials_to_csv};

/// psylog version
pub const PSYLOG_VERSION: &str = env!("CARGO_PKG_VERSION");
