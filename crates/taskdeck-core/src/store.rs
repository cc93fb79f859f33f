//! Reads task and epic records for one team from disk. The directory is
//! owned by external writers, so every read tolerates missing, partial,
//! or malformed files by skipping them.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Epic, Task};

const EPICS_DIR: &str = "epics";

/// Point-in-time snapshot of one team's records. Serializes to the
/// machine-readable dump shape: team id plus the records as loaded.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub team: String,
    #[serde(skip)]
    pub dir: PathBuf,
    pub tasks: Vec<Task>,
    pub epics: Vec<Epic>,
}

impl Board {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.epics.is_empty()
    }
}

pub fn team_dir(root: &Path, team: &str) -> PathBuf {
    root.join(team)
}

pub fn load_board(root: &Path, team: &str) -> Board {
    let dir = team_dir(root, team);
    let tasks = load_tasks(&dir);
    let epics = load_epics(&dir);
    Board {
        team: team.to_string(),
        dir,
        tasks,
        epics,
    }
}

/// Tasks are the direct `*.json` children of the team directory, in
/// filename order. Records that fail to parse or lack an id are dropped.
pub fn load_tasks(dir: &Path) -> Vec<Task> {
    list_record_files(dir)
        .into_iter()
        .filter_map(|path| read_record(&path))
        .collect()
}

/// Epics live under the `epics` subdirectory, same rules as tasks.
pub fn load_epics(dir: &Path) -> Vec<Epic> {
    list_record_files(&dir.join(EPICS_DIR))
        .into_iter()
        .filter_map(|path| read_record(&path))
        .collect()
}

fn list_record_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.file_name() != Some(OsStr::new(EPICS_DIR)))
        .filter(|path| path.extension() == Some(OsStr::new("json")))
        .collect();
    files.sort();
    files
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}
