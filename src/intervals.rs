//! Stimulus interval extraction
//!
//! PsychoPy logs `<name>: autoDraw = true` when a component starts drawing
//! and `<name>: autoDraw = null` when it stops. Pairing those toggles per
//! stimulus yields the onset/offset intervals of each presentation.

use crate::types::{LogEvent, StimulusInterval};

/// Scan state for one stimulus
#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState {
    Idle,
    Open { onset: f64 },
}

/// Extract the ordered presentation intervals of `stimulus`.
///
/// A `true` toggle while an interval is open and a `null` toggle while idle
/// are both ignored, so intervals never overlap and `onset <= offset` holds
/// for ordered input. An interval still open at the end of the log is dropped.
pub fn extract_intervals(events: &[LogEvent], stimulus: &str) -> Vec<StimulusInterval> {
    let draw_on = format!("{stimulus}: autoDraw = true");
    let draw_off = format!("{stimulus}: autoDraw = null");

    let mut state = ScanState::Idle;
    let mut intervals = Vec::new();

    for event in events {
        state = match state {
            ScanState::Idle if event.message.contains(&draw_on) => ScanState::Open {
                onset: event.timestamp,
            },
            ScanState::Open { onset } if event.message.contains(&draw_off) => {
                intervals.push(StimulusInterval::new(onset, event.timestamp));
                ScanState::Idle
            }
            unchanged => unchanged,
        };
    }

    if let ScanState::Open { onset } = state {
        log::debug!("{stimulus}: dropping unterminated interval opened at {onset}");
    }

    intervals
}
