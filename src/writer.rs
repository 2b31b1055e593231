//! Trial table serialization
//!
//! Trials are written as CSV with a fixed 12-column header (see
//! [`TRIAL_FIELDS`]). Missing responses are empty cells.

use crate::error::ExtractError;
use crate::types::{Trial, TRIAL_FIELDS};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Write trials as CSV to any writer.
///
/// Refuses to write an empty table.
pub fn write_trials<W: Write>(trials: &[Trial], writer: W) -> Result<(), ExtractError> {
    if trials.is_empty() {
        return Err(ExtractError::EmptyOutput);
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(TRIAL_FIELDS)?;
    for trial in trials {
        csv_writer.serialize(trial)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write trials to a CSV file, replacing any existing file.
pub fn save_trials_to_csv(trials: &[Trial], path: &Path) -> Result<(), ExtractError> {
    if trials.is_empty() {
        return Err(ExtractError::EmptyOutput);
    }

    let file = File::create(path)?;
    write_trials(trials, BufWriter::new(file))
}

/// Render trials as newline-delimited JSON, one object per line.
///
/// An empty table renders as an empty string.
pub fn trials_to_ndjson(trials: &[Trial]) -> Result<String, ExtractError> {
    let mut out = String::new();
    for trial in trials {
        out.push_str(&serde_json::to_string(trial)?);
        out.push('\n');
    }
    Ok(out)
}

/// Read a trial table back from CSV.
pub fn read_trials<R: Read>(reader: R) -> Result<Vec<Trial>, ExtractError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut trials = Vec::new();
    for record in csv_reader.deserialize() {
        trials.push(record?);
    }
    Ok(trials)
}

/// Read a trial table from a CSV file.
pub fn load_trials_csv(path: &Path) -> Result<Vec<Trial>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::MissingInput(path.to_path_buf()));
    }
    read_trials(File::open(path)?)
}
