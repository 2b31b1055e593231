//! Pipeline orchestration
//!
//! This module provides the public API for psylog.
//! It orchestrates the full pipeline from a raw log file to trial records.

use crate::align::{align_trials, check_lockstep};
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::intervals::extract_intervals;
use crate::metadata::{MetadataExtractor, PsychopyFilename};
use crate::response::{extract_key_events, match_response};
use crate::tokenizer::read_events;
use crate::types::{ExperimentMetadata, LogEvent, Trial};
use std::path::Path;

/// Parse a PsychoPy time-interval log into trial records.
///
/// # Arguments
/// * `path` - Path to a `.log` or `.log.gz` file whose name carries the
///   experiment datetime
///
/// # Returns
/// One [`Trial`] per aligned stimulus triple, in presentation order. An empty
/// vector is a valid result.
///
/// # Example
/// ```ignore
/// let trials = parse_log_file("P1_2021-07-16_09h56.52.759.log.gz")?;
/// ```
pub fn parse_log_file(path: impl AsRef<Path>) -> Result<Vec<Trial>, ExtractError> {
    TrialExtractor::new().process_file(path.as_ref())
}

/// Build trial records from already tokenized events.
///
/// Pipeline stages:
/// 1. Interval extraction - one pass per stimulus
/// 2. Alignment - positional zip, truncated to the shortest sequence
/// 3. Response matching - first accepted key per response window
/// 4. Assembly - derived durations and reaction time
pub fn extract_trials(
    events: &[LogEvent],
    metadata: &ExperimentMetadata,
    config: &ExtractorConfig,
) -> Vec<Trial> {
    // Stage 1: Interval extraction
    let first = extract_intervals(events, &config.first_stimulus);
    let second = extract_intervals(events, &config.second_stimulus);
    let response = extract_intervals(events, &config.response_stimulus);

    // Stage 2: Alignment
    let aligned = align_trials(&first, &second, &response);
    for issue in check_lockstep(&aligned) {
        log::warn!("trial {}: {}", issue.trial, issue.message);
    }

    // Stage 3 and 4: Response matching and assembly
    let keys = extract_key_events(events, config);
    log::debug!(
        "{} key events, {} trials before response matching",
        keys.len(),
        aligned.len()
    );

    aligned
        .iter()
        .map(|intervals| {
            let response = match_response(&intervals.response, &keys, config);
            Trial::assemble(metadata, intervals, response)
        })
        .collect()
}

/// Reusable extractor with explicit configuration and metadata source.
///
/// Holds no state between files; one instance may process any number of logs.
pub struct TrialExtractor {
    config: ExtractorConfig,
    metadata: Box<dyn MetadataExtractor + Send + Sync>,
}

impl Default for TrialExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TrialExtractor {
    /// Create an extractor with the PsychoPy defaults
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Create an extractor with custom stimulus names or response keys
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            config,
            metadata: Box::new(PsychopyFilename),
        }
    }

    /// Replace the filename metadata extractor
    pub fn with_metadata_extractor(
        mut self,
        extractor: impl MetadataExtractor + Send + Sync + 'static,
    ) -> Self {
        self.metadata = Box::new(extractor);
        self
    }

    /// Extract all trials of one log file.
    ///
    /// Any I/O or filename failure aborts the file; no partial result is
    /// returned.
    pub fn process_file(&self, path: &Path) -> Result<Vec<Trial>, ExtractError> {
        let events = read_events(path)?;
        let metadata = self.metadata.extract(path)?;

        let trials = self.process_events(&events, &metadata);
        log::debug!("{}: {} trials", path.display(), trials.len());
        Ok(trials)
    }

    /// Extract trials from events that were tokenized elsewhere
    pub fn process_events(&self, events: &[LogEvent], metadata: &ExperimentMetadata) -> Vec<Trial> {
        extract_trials(events, metadata, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn sample_log() -> &'static str {
        "0.0000 \tEXP \tCreated window\n\
         1.0000 \tEXP \tfirstImg: autoDraw = true\n\
         3.0000 \tEXP \tfirstImg: autoDraw = null\n\
         3.0000 \tEXP \tsecondImg: autoDraw = true\n\
         4.5000 \tEXP \tsecondImg: autoDraw = null\n\
         4.5000 \tEXP \tresponseImg: autoDraw = true\n\
         5.2000\tDATA\tKeydown: 1\n\
         6.0000 \tEXP \tresponseImg: autoDraw = null\n"
    }

    fn metadata() -> ExperimentMetadata {
        ExperimentMetadata {
            experiment_date: "2021-07-16".to_string(),
            experiment_time: "09:56:52.759".to_string(),
        }
    }

    fn events(text: &str) -> Vec<LogEvent> {
        text.lines().filter_map(crate::tokenizer::parse_line).collect()
    }

    #[test]
    fn test_single_trial_with_response() {
        let trials = extract_trials(&events(sample_log()), &metadata(), &ExtractorConfig::default());

        assert_eq!(trials.len(), 1);
        let t = &trials[0];
        assert_eq!(t.experiment_date, "2021-07-16");
        assert_eq!(t.experiment_time, "09:56:52.759");
        assert_eq!(t.stim1_duration, 2.0);
        assert_eq!(t.stim2_duration, 1.5);
        assert_eq!(t.stim_dur_delta, 0.5);
        assert_eq!(t.choice_key.as_deref(), Some("1"));
        assert_eq!(t.choice_time, Some(5.2));
        assert!((t.choice_rt.unwrap() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_single_trial_without_response() {
        let log = sample_log().replace("5.2000\tDATA\tKeydown: 1", "7.5000\tDATA\tKeydown: 1");
        let trials = extract_trials(&events(&log), &metadata(), &ExtractorConfig::default());

        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0].choice_key, None);
        assert_eq!(trials[0].choice_time, None);
        assert_eq!(trials[0].choice_rt, None);
    }

    #[test]
    fn test_custom_stimulus_names() {
        let log = sample_log().replace("responseImg", "cueImg");
        let config = ExtractorConfig {
            response_stimulus: "cueImg".to_string(),
            ..ExtractorConfig::default()
        };

        assert!(extract_trials(&events(&log), &metadata(), &ExtractorConfig::default()).is_empty());
        assert_eq!(extract_trials(&events(&log), &metadata(), &config).len(), 1);
    }

    #[test]
    fn test_process_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("P1_2021-07-16_09h56.52.759.log");
        fs::write(&path, sample_log()).unwrap();

        let trials = parse_log_file(&path).unwrap();
        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0].experiment_time, "09:56:52.759");
    }

    #[test]
    fn test_bad_filename_aborts_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("participant.log");
        fs::write(&path, sample_log()).unwrap();

        let err = parse_log_file(&path).unwrap_err();
        assert!(matches!(err, ExtractError::MetadataFormat(_)));
    }

    #[test]
    fn test_custom_metadata_extractor() {
        struct Fixed;
        impl MetadataExtractor for Fixed {
            fn extract(&self, _path: &Path) -> Result<ExperimentMetadata, ExtractError> {
                Ok(ExperimentMetadata {
                    experiment_date: "1999-12-31".to_string(),
                    experiment_time: "23:59:59.999".to_string(),
                })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("participant.log");
        fs::write(&path, sample_log()).unwrap();

        let trials = TrialExtractor::new()
            .with_metadata_extractor(Fixed)
            .process_file(&path)
            .unwrap();
        assert_eq!(trials[0].experiment_date, "1999-12-31");
    }
}
