//! Project folder layout
//!
//! Raw behavioral logs live under `<root>/data/raw/beh` and parsed tables
//! under `<root>/data/parsed/beh`.

use crate::error::ExtractError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable overriding the project root
pub const ROOT_ENV_VAR: &str = "PSYLOG_PROJECT_ROOT";

/// Name of the folder index written by [`write_folder_index`]
pub const FOLDER_INDEX_FILE: &str = "folder_database.txt";

/// Resolved project folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub data: PathBuf,
    pub raw_beh: PathBuf,
    pub parsed_beh: PathBuf,
}

impl ProjectPaths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data = root.join("data");
        Self {
            raw_beh: data.join("raw").join("beh"),
            parsed_beh: data.join("parsed").join("beh"),
            data,
            root,
        }
    }

    /// Project paths for this process.
    ///
    /// Uses `PSYLOG_PROJECT_ROOT` if set, else the current directory. Resolved
    /// once; later changes to the environment are not observed.
    pub fn discover() -> &'static ProjectPaths {
        static PATHS: OnceLock<ProjectPaths> = OnceLock::new();
        PATHS.get_or_init(|| {
            let root = std::env::var_os(ROOT_ENV_VAR)
                .map(PathBuf::from)
                .or_else(|| std::env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from("."));
            let root = fs::canonicalize(&root).unwrap_or(root);
            ProjectPaths::from_root(root)
        })
    }
}

/// Sorted names of the directories directly under `path`.
pub fn list_immediate_subdirs(path: &Path) -> Result<Vec<String>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::MissingInput(path.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Render the folder index listing participant folders under raw and parsed.
pub fn render_folder_index(paths: &ProjectPaths) -> Result<String, ExtractError> {
    let sections = [("raw/beh", &paths.raw_beh), ("parsed/beh", &paths.parsed_beh)];

    let mut lines = Vec::new();
    for (label, dir) in sections {
        lines.push(format!("[{label}]"));
        lines.extend(list_immediate_subdirs(dir)?);
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

/// Write the folder index to `<root>/folder_database.txt`.
pub fn write_folder_index(paths: &ProjectPaths) -> Result<PathBuf, ExtractError> {
    let output = paths.root.join(FOLDER_INDEX_FILE);
    fs::write(&output, render_folder_index(paths)?)?;
    Ok(output)
}
