//! Core types for the trial-extraction pipeline
//!
//! This module defines the data structures that flow through each stage:
//! raw log events, key events, stimulus intervals, aligned trial skeletons,
//! and the flat trial records handed to the writer.

use serde::{Deserialize, Serialize};

/// One tokenized log line: `(time, type, message)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Seconds since the experiment clock started
    pub timestamp: f64,
    /// Logging level column (e.g. `DATA`, `EXP`)
    pub event_type: String,
    /// Free-text message column
    pub message: String,
}

impl LogEvent {
    pub fn new(timestamp: f64, event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            event_type: event_type.into(),
            message: message.into(),
        }
    }
}

/// A keypress reported by the experiment runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub timestamp: f64,
    /// Key label as logged; only some labels count as responses
    pub key: String,
}

/// Onset/offset pair of one stimulus presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulusInterval {
    pub onset: f64,
    pub offset: f64,
}

impl StimulusInterval {
    pub fn new(onset: f64, offset: f64) -> Self {
        Self { onset, offset }
    }

    pub fn duration(&self) -> f64 {
        self.offset - self.onset
    }
}

/// The three intervals that make up one trial, aligned by position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialIntervals {
    pub first: StimulusInterval,
    pub second: StimulusInterval,
    /// Response window anchor; contributes no duration field
    pub response: StimulusInterval,
}

/// A matched keyboard response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub key: String,
    pub time: f64,
    /// Reaction time relative to the response window onset
    pub rt: f64,
}

/// Experiment date and time recovered from the log filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    /// `YYYY-MM-DD`
    pub experiment_date: String,
    /// `HH:MM:SS.mmm`
    pub experiment_time: String,
}

/// Output column names, in order
pub const TRIAL_FIELDS: [&str; 12] = [
    "experiment_date",
    "experiment_time",
    "stim1_onset",
    "stim1_offset",
    "stim2_onset",
    "stim2_offset",
    "stim1_duration",
    "stim2_duration",
    "stim_dur_delta",
    "choice_key",
    "choice_time",
    "choice_rt",
];

/// One row of the trial table
///
/// Field order matches [`TRIAL_FIELDS`]; the CSV header is derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub experiment_date: String,
    pub experiment_time: String,
    pub stim1_onset: f64,
    pub stim1_offset: f64,
    pub stim2_onset: f64,
    pub stim2_offset: f64,
    pub stim1_duration: f64,
    pub stim2_duration: f64,
    pub stim_dur_delta: f64,
    pub choice_key: Option<String>,
    pub choice_time: Option<f64>,
    pub choice_rt: Option<f64>,
}

impl Trial {
    /// Build a trial row from its parts, computing the derived fields.
    ///
    /// The three choice fields are either all set or all `None`.
    pub fn assemble(
        metadata: &ExperimentMetadata,
        intervals: &TrialIntervals,
        response: Option<Response>,
    ) -> Self {
        let stim1_duration = intervals.first.duration();
        let stim2_duration = intervals.second.duration();

        let (choice_key, choice_time, choice_rt) = match response {
            Some(r) => (Some(r.key), Some(r.time), Some(r.rt)),
            None => (None, None, None),
        };

        Self {
            experiment_date: metadata.experiment_date.clone(),
            experiment_time: metadata.experiment_time.clone(),
            stim1_onset: intervals.first.onset,
            stim1_offset: intervals.first.offset,
            stim2_onset: intervals.second.onset,
            stim2_offset: intervals.second.offset,
            stim1_duration,
            stim2_duration,
            stim_dur_delta: stim1_duration - stim2_duration,
            choice_key,
            choice_time,
            choice_rt,
        }
    }
}
