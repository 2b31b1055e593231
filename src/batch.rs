//! Batch conversion of a log directory into CSV tables
//!
//! Every matching log under the input directory becomes one CSV in the output
//! directory. A failing file is recorded and the batch moves on.

use crate::error::ExtractError;
use crate::paths::ProjectPaths;
use crate::pipeline::TrialExtractor;
use crate::writer::save_trials_to_csv;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default file name pattern for log discovery
pub const DEFAULT_PATTERN: &str = "*.log*";

/// Batch run options
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory searched recursively; defaults to the project's raw folder
    pub input_dir: Option<PathBuf>,
    /// Directory receiving CSVs; defaults to the project's parsed folder
    pub output_dir: Option<PathBuf>,
    /// Wildcard matched against file names (`*`, `?`, `[...]`)
    pub pattern: String,
    /// Rewrite CSVs that already exist
    pub overwrite: bool,
    /// Report planned work without writing anything
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            pattern: DEFAULT_PATTERN.to_string(),
            overwrite: false,
            dry_run: false,
        }
    }
}

/// Outcome of one log file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum BatchStatus {
    #[serde(rename = "ok")]
    Written { trials: usize },
    #[serde(rename = "skipped")]
    Skipped { reason: String },
    #[serde(rename = "dry-run")]
    DryRun,
    #[serde(rename = "error")]
    Failed { error: String },
}

/// One processed log file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub log: PathBuf,
    pub csv: PathBuf,
    #[serde(flatten)]
    pub status: BatchStatus,
}

/// Results of a batch run, in log path order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub items: Vec<BatchItem>,
}

impl BatchSummary {
    pub fn written(&self) -> impl Iterator<Item = &BatchItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, BatchStatus::Written { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &BatchItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, BatchStatus::Skipped { .. }))
    }

    pub fn dry_run(&self) -> impl Iterator<Item = &BatchItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, BatchStatus::DryRun))
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, BatchStatus::Failed { .. }))
    }

    pub fn has_errors(&self) -> bool {
        self.failed().next().is_some()
    }

    /// Grouped plain-text report; empty groups are omitted.
    pub fn render(&self) -> String {
        let groups: [(&str, Vec<&BatchItem>); 4] = [
            ("written", self.written().collect()),
            ("skipped", self.skipped().collect()),
            ("dry-run", self.dry_run().collect()),
            ("errors", self.failed().collect()),
        ];

        let mut out = String::new();
        for (label, items) in groups {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("{label}: {}\n", items.len()));
            for item in items {
                out.push_str(&format!("  {} -> {}", item.log.display(), item.csv.display()));
                match &item.status {
                    BatchStatus::Written { trials } => out.push_str(&format!(" ({trials} trials)")),
                    BatchStatus::Skipped { reason } => out.push_str(&format!(" [{reason}]")),
                    BatchStatus::Failed { error } => out.push_str(&format!(" [error: {error}]")),
                    BatchStatus::DryRun => {}
                }
                out.push('\n');
            }
        }
        out
    }

    pub fn to_json(&self) -> Result<String, ExtractError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// CSV path for a log: `.log.gz` or the last extension is replaced by `.csv`.
pub fn target_csv_path(log_path: &Path, output_dir: &Path) -> PathBuf {
    let name = log_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = match name.strip_suffix(".log.gz") {
        Some(stem) => stem.to_string(),
        None => log_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    output_dir.join(format!("{stem}.csv"))
}

/// Recursively collect files under `dir` whose name matches `pattern`.
///
/// Symlinked directories are not descended into. Entries that cannot be read
/// are logged and skipped. Results are sorted.
pub fn find_logs(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, ExtractError> {
    if !dir.exists() {
        return Err(ExtractError::MissingInput(dir.to_path_buf()));
    }

    let mut found = BTreeSet::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }
        // Symlinks to files count as files
        if entry.path().is_file() && wildcard_match(pattern, &entry.file_name().to_string_lossy()) {
            found.insert(entry.into_path());
        }
    }

    Ok(found.into_iter().collect())
}

/// Shell-style wildcard match of a whole file name.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position after the last `*` and the name position it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() {
            match pattern[p] {
                '*' => {
                    p += 1;
                    backtrack = Some((p, n));
                    continue;
                }
                '?' => {
                    p += 1;
                    n += 1;
                    continue;
                }
                '[' => {
                    if let Some((matched, next)) = match_class(&pattern, p, name[n]) {
                        if matched {
                            p = next;
                            n += 1;
                            continue;
                        }
                    } else if name[n] == '[' {
                        // Unterminated class is a literal '['
                        p += 1;
                        n += 1;
                        continue;
                    }
                }
                c if c == name[n] => {
                    p += 1;
                    n += 1;
                    continue;
                }
                _ => {}
            }
        }

        match backtrack {
            Some((star_p, star_n)) => {
                p = star_p;
                n = star_n + 1;
                backtrack = Some((star_p, star_n + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Match `c` against the class starting at `pattern[start] == '['`.
///
/// Returns whether it matched and the index after the closing `]`, or `None`
/// if the class is unterminated.
fn match_class(pattern: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negated = matches!(pattern.get(i), Some('!'));
    if negated {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    loop {
        let lo = *pattern.get(i)?;
        if lo == ']' && !first {
            return Some((matched != negated, i + 1));
        }
        first = false;

        if pattern.get(i + 1) == Some(&'-') && pattern.get(i + 2).is_some_and(|&hi| hi != ']') {
            let hi = pattern[i + 2];
            matched |= lo <= c && c <= hi;
            i += 3;
        } else {
            matched |= lo == c;
            i += 1;
        }
    }
}

/// Parse every matching log and write its CSV.
///
/// Fails only if the input directory is missing; per-file failures are
/// recorded in the summary.
pub fn batch_parse_logs(
    options: &BatchOptions,
    extractor: &TrialExtractor,
) -> Result<BatchSummary, ExtractError> {
    let input_dir = match &options.input_dir {
        Some(dir) => dir.as_path(),
        None => ProjectPaths::discover().raw_beh.as_path(),
    };
    let output_dir = match &options.output_dir {
        Some(dir) => dir.as_path(),
        None => ProjectPaths::discover().parsed_beh.as_path(),
    };

    let logs = find_logs(input_dir, &options.pattern)?;
    log::info!("{} logs under {}", logs.len(), input_dir.display());

    let mut summary = BatchSummary::default();
    for log_path in logs {
        let csv_path = target_csv_path(&log_path, output_dir);
        let status = process_one(&log_path, &csv_path, options, extractor);

        match &status {
            BatchStatus::Failed { error } => log::warn!("{}: {error}", log_path.display()),
            other => log::info!("{}: {other:?}", log_path.display()),
        }

        summary.items.push(BatchItem {
            log: log_path,
            csv: csv_path,
            status,
        });
    }

    Ok(summary)
}

fn process_one(
    log_path: &Path,
    csv_path: &Path,
    options: &BatchOptions,
    extractor: &TrialExtractor,
) -> BatchStatus {
    if csv_path.exists() && !options.overwrite {
        return BatchStatus::Skipped {
            reason: "exists".to_string(),
        };
    }
    if options.dry_run {
        return BatchStatus::DryRun;
    }

    match convert(log_path, csv_path, extractor) {
        Ok(trials) => BatchStatus::Written { trials },
        Err(e) => BatchStatus::Failed {
            error: e.to_string(),
        },
    }
}

fn convert(
    log_path: &Path,
    csv_path: &Path,
    extractor: &TrialExtractor,
) -> Result<usize, ExtractError> {
    if let Some(parent) = csv_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let trials = extractor.process_file(log_path)?;
    save_trials_to_csv(&trials, csv_path)?;
    Ok(trials.len())
}
