//! Extraction tunables
//!
//! The defaults reproduce the PsychoPy time-interval task exactly; overriding
//! them is only needed for experiments that name their stimuli differently.

use serde::{Deserialize, Serialize};

/// Stimulus component drawn first in each trial
pub const FIRST_STIMULUS: &str = "firstImg";

/// Stimulus component drawn second in each trial
pub const SECOND_STIMULUS: &str = "secondImg";

/// Stimulus component whose autoDraw period is the response window
pub const RESPONSE_STIMULUS: &str = "responseImg";

/// Seconds after the response window closes during which a key still counts
pub const RESPONSE_GRACE_SEC: f64 = 1.0;

/// Configuration for [`crate::pipeline::TrialExtractor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub first_stimulus: String,
    pub second_stimulus: String,
    pub response_stimulus: String,
    /// Key labels accepted as a choice
    pub response_keys: Vec<String>,
    pub grace_period_sec: f64,
    /// Event type column carrying keypresses
    pub key_event_type: String,
    /// Message prefix of a keypress event
    pub key_prefix: String,
    /// Ignore whitespace around the event type column when finding keypresses
    pub trim_event_type: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            first_stimulus: FIRST_STIMULUS.to_string(),
            second_stimulus: SECOND_STIMULUS.to_string(),
            response_stimulus: RESPONSE_STIMULUS.to_string(),
            response_keys: vec!["1".to_string(), "2".to_string()],
            grace_period_sec: RESPONSE_GRACE_SEC,
            key_event_type: "DATA".to_string(),
            key_prefix: "Keydown:".to_string(),
            trim_event_type: false,
        }
    }
}

impl ExtractorConfig {
    /// Whether an event type column marks a keypress event
    pub fn is_key_event_type(&self, event_type: &str) -> bool {
        if self.trim_event_type {
            event_type.trim() == self.key_event_type
        } else {
            event_type == self.key_event_type
        }
    }

    /// Whether `key` is one of the accepted response labels
    pub fn accepts_key(&self, key: &str) -> bool {
        self.response_keys.iter().any(|k| k == key)
    }
}
