//! Trial alignment
//!
//! Trials are formed by position: the i-th trial takes the i-th interval of
//! each stimulus. This relies on the experiment drawing the three stimuli in
//! lockstep; [`check_lockstep`] reports trials where that looks violated but
//! never changes the alignment itself.

use crate::types::{StimulusInterval, TrialIntervals};
use serde::Serialize;

/// Zip three interval sequences into trial skeletons.
///
/// The result has the length of the shortest input; surplus intervals of
/// the longer inputs are dropped.
pub fn align_trials(
    first: &[StimulusInterval],
    second: &[StimulusInterval],
    response: &[StimulusInterval],
) -> Vec<TrialIntervals> {
    let n = first.len().min(second.len()).min(response.len());
    if first.len() != n || second.len() != n || response.len() != n {
        log::warn!(
            "interval counts differ (first={}, second={}, response={}); keeping {} trials",
            first.len(),
            second.len(),
            response.len(),
            n
        );
    }

    first
        .iter()
        .zip(second)
        .zip(response)
        .map(|((&a, &b), &r)| TrialIntervals {
            first: a,
            second: b,
            response: r,
        })
        .collect()
}

/// A trial whose stimuli are not in presentation order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentIssue {
    /// Zero-based trial index
    pub trial: usize,
    pub message: String,
}

/// Check that each trial's onsets are ordered first <= second <= response.
pub fn check_lockstep(trials: &[TrialIntervals]) -> Vec<AlignmentIssue> {
    let mut issues = Vec::new();

    for (idx, t) in trials.iter().enumerate() {
        if t.first.onset > t.second.onset {
            issues.push(AlignmentIssue {
                trial: idx,
                message: format!(
                    "second stimulus onset {} precedes first stimulus onset {}",
                    t.second.onset, t.first.onset
                ),
            });
        }
        if t.second.onset > t.response.onset {
            issues.push(AlignmentIssue {
                trial: idx,
                message: format!(
                    "response onset {} precedes second stimulus onset {}",
                    t.response.onset, t.second.onset
                ),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: usize, offset: f64) -> Vec<StimulusInterval> {
        (0..n)
            .map(|i| {
                let base = i as f64 * 10.0 + offset;
                StimulusInterval::new(base, base + 1.0)
            })
            .collect()
    }

    #[test]
    fn test_truncates_to_shortest() {
        let first = seq(5, 0.0);
        let second = seq(3, 2.0);
        let response = seq(7, 4.0);

        let trials = align_trials(&first, &second, &response);
        assert_eq!(trials.len(), 3);
        for (i, t) in trials.iter().enumerate() {
            assert_eq!(t.first, first[i]);
            assert_eq!(t.second, second[i]);
            assert_eq!(t.response, response[i]);
        }
    }

    #[test]
    fn test_empty_sequence_yields_no_trials() {
        let trials = align_trials(&seq(4, 0.0), &[], &seq(4, 4.0));
        assert!(trials.is_empty());
    }

    #[test]
    fn test_lockstep_ok() {
        let trials = align_trials(&seq(3, 0.0), &seq(3, 2.0), &seq(3, 4.0));
        assert!(check_lockstep(&trials).is_empty());
    }

    #[test]
    fn test_lockstep_reports_shifted_sequence() {
        // secondImg missed its first toggle, so every second interval is one
        // trial late relative to the response window.
        let second: Vec<StimulusInterval> = seq(4, 2.0).into_iter().skip(1).collect();
        let trials = align_trials(&seq(3, 0.0), &second, &seq(3, 4.0));

        let issues = check_lockstep(&trials);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.message.starts_with("response onset")));
        assert_eq!(issues[0].trial, 0);
    }
}
