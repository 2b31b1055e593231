//! Keyboard response matching

use crate::config::ExtractorConfig;
use crate::types::{KeyEvent, LogEvent, Response, StimulusInterval};

/// Collect keypress events (`DATA` / `Keydown: <key>`) in log order.
///
/// The event type must equal the configured type exactly unless
/// `trim_event_type` is set.
pub fn extract_key_events(events: &[LogEvent], config: &ExtractorConfig) -> Vec<KeyEvent> {
    events
        .iter()
        .filter(|e| config.is_key_event_type(&e.event_type))
        .filter_map(|e| {
            let key = e.message.strip_prefix(config.key_prefix.as_str())?;
            Some(KeyEvent {
                timestamp: e.timestamp,
                key: key.trim_start().to_string(),
            })
        })
        .collect()
}

/// Find the first accepted key inside the response window.
///
/// The window is `[onset, offset + grace]`, both ends inclusive. Each call
/// scans the full key sequence; nothing is consumed between trials.
pub fn match_response(
    window: &StimulusInterval,
    keys: &[KeyEvent],
    config: &ExtractorConfig,
) -> Option<Response> {
    let close = window.offset + config.grace_period_sec;

    keys.iter()
        .find(|k| config.accepts_key(&k.key) && window.onset <= k.timestamp && k.timestamp <= close)
        .map(|k| Response {
            key: k.key.clone(),
            time: k.timestamp,
            rt: k.timestamp - window.onset,
        })
}
