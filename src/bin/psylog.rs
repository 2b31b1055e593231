//! psylog CLI - Command-line interface for psylog
//!
//! Commands:
//! - parse: Extract trials from one log file
//! - batch: Convert a directory of logs into CSV tables
//! - folders: Write the project folder index
//! - schema: Print the trial table columns

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use psylog::batch::{batch_parse_logs, BatchOptions, DEFAULT_PATTERN};
use psylog::paths::{write_folder_index, ProjectPaths};
use psylog::writer::{save_trials_to_csv, trials_to_ndjson, write_trials};
use psylog::{ExtractError, Trial, TrialExtractor, PSYLOG_VERSION, TRIAL_FIELDS};

/// psylog - Extract trial tables from PsychoPy experiment logs
#[derive(Parser)]
#[command(name = "psylog")]
#[command(version = PSYLOG_VERSION)]
#[command(about = "Extract trial tables from PsychoPy logs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract trials from a single .log or .log.gz file
    Parse {
        /// Input log file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Parse all matching logs under a directory into CSVs
    Batch {
        /// Directory containing log files (searched recursively)
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Directory to write CSV outputs
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Wildcard pattern for log file names
        #[arg(long, default_value = DEFAULT_PATTERN)]
        pattern: String,

        /// Rewrite CSVs even if they already exist
        #[arg(long)]
        overwrite: bool,

        /// List what would be done without writing files
        #[arg(long)]
        dry_run: bool,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,

        /// Project root used for default directories
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Write folder_database.txt listing raw and parsed participant folders
    Folders {
        /// Project root (defaults to PSYLOG_PROJECT_ROOT or the current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print the trial table columns
    Schema,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of trials
    Json,
    /// Newline-delimited JSON (one trial per line)
    Ndjson,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), PsylogCliError> {
    match cli.command {
        Commands::Parse {
            input,
            output,
            format,
        } => cmd_parse(&input, &output, format),

        Commands::Batch {
            input_dir,
            output_dir,
            pattern,
            overwrite,
            dry_run,
            json,
            root,
        } => {
            let paths = resolve_paths(root.as_deref());
            let options = BatchOptions {
                input_dir: Some(input_dir.unwrap_or_else(|| paths.raw_beh.clone())),
                output_dir: Some(output_dir.unwrap_or_else(|| paths.parsed_beh.clone())),
                pattern,
                overwrite,
                dry_run,
            };
            cmd_batch(&options, json)
        }

        Commands::Folders { root } => {
            let paths = resolve_paths(root.as_deref());
            let output = write_folder_index(&paths)?;
            println!("Wrote {}", output.display());
            Ok(())
        }

        Commands::Schema => {
            for field in TRIAL_FIELDS {
                println!("{field}");
            }
            Ok(())
        }
    }
}

fn resolve_paths(root: Option<&Path>) -> ProjectPaths {
    match root {
        Some(root) => ProjectPaths::from_root(root),
        None => ProjectPaths::discover().clone(),
    }
}

fn cmd_parse(input: &Path, output: &Path, format: OutputFormat) -> Result<(), PsylogCliError> {
    let trials = TrialExtractor::new().process_file(input)?;
    let to_stdout = output.to_string_lossy() == "-";

    match format {
        OutputFormat::Csv if to_stdout => {
            let stdout = io::stdout();
            write_trials(&trials, stdout.lock())?;
        }
        OutputFormat::Csv => save_trials_to_csv(&trials, output)?,
        OutputFormat::Json | OutputFormat::Ndjson => {
            let data = format_json(&trials, &format)?;
            if to_stdout {
                let mut stdout = io::stdout();
                write!(stdout, "{data}")?;
                stdout.flush()?;
            } else {
                std::fs::write(output, data)?;
            }
        }
    }

    log::info!("{}: {} trials", input.display(), trials.len());
    Ok(())
}

fn cmd_batch(options: &BatchOptions, json: bool) -> Result<(), PsylogCliError> {
    let summary = batch_parse_logs(options, &TrialExtractor::new())?;

    if json {
        println!("{}", summary.to_json()?);
    } else {
        print!("{}", summary.render());
    }

    let failed = summary.failed().count();
    if failed > 0 {
        Err(PsylogCliError::BatchFailed(failed))
    } else {
        Ok(())
    }
}

// Helper functions

fn format_json(trials: &[Trial], format: &OutputFormat) -> Result<String, PsylogCliError> {
    match format {
        OutputFormat::Ndjson => Ok(trials_to_ndjson(trials)?),
        _ => Ok(serde_json::to_string_pretty(trials)? + "\n"),
    }
}

// Error types

#[derive(Debug)]
enum PsylogCliError {
    Io(io::Error),
    Extract(ExtractError),
    Json(serde_json::Error),
    BatchFailed(usize),
}

impl From<io::Error> for PsylogCliError {
    fn from(e: io::Error) -> Self {
        PsylogCliError::Io(e)
    }
}

impl From<ExtractError> for PsylogCliError {
    fn from(e: ExtractError) -> Self {
        PsylogCliError::Extract(e)
    }
}

impl From<serde_json::Error> for PsylogCliError {
    fn from(e: serde_json::Error) -> Self {
        PsylogCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PsylogCliError> for CliError {
    fn from(e: PsylogCliError) -> Self {
        match e {
            PsylogCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PsylogCliError::Extract(ExtractError::MissingInput(path)) => CliError {
                code: "MISSING_INPUT".to_string(),
                message: format!("Input path does not exist: {}", path.display()),
                hint: Some("Pass --input-dir or set PSYLOG_PROJECT_ROOT".to_string()),
            },
            PsylogCliError::Extract(e @ ExtractError::MetadataFormat(_)) => CliError {
                code: "METADATA_FORMAT".to_string(),
                message: e.to_string(),
                hint: Some("Log names must contain YYYY-MM-DD_HHhMM.SS.mmm".to_string()),
            },
            PsylogCliError::Extract(ExtractError::EmptyOutput) => CliError {
                code: "NO_TRIALS".to_string(),
                message: ExtractError::EmptyOutput.to_string(),
                hint: Some("Check that the log contains firstImg/secondImg/responseImg autoDraw toggles".to_string()),
            },
            PsylogCliError::Extract(e) => CliError {
                code: "EXTRACT_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            PsylogCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            PsylogCliError::BatchFailed(count) => CliError {
                code: "BATCH_FAILED".to_string(),
                message: format!("{} log files failed to parse", count),
                hint: Some("Review the errors group of the summary".to_string()),
            },
        }
    }
}
