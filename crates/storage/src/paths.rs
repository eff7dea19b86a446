//! Resolution of the on-disk state directory and the files within it.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// `VIBECHECK_STATE_DIR` overrides the default `~/.vibecheck`.
pub fn state_dir() -> Result<PathBuf, StorageError> {
    if let Ok(dir) = std::env::var("VIBECHECK_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().ok_or(StorageError::NoHomeDir)?;
    Ok(home.join(".vibecheck"))
}

/// A short, filename-safe hash of the working directory, used as the
/// session file's key. Not a security property, purely a stable filename.
pub fn work_dir_key(work_dir: &Path) -> String {
    let digest = format!("{:x}", md5::compute(work_dir.to_string_lossy().as_bytes()));
    digest[..12].to_string()
}

pub fn session_file_path(state_dir: &Path, work_dir: &Path) -> PathBuf {
    state_dir.join(format!("session_{}.json", work_dir_key(work_dir)))
}

pub fn schedule_file_path(state_dir: &Path) -> PathBuf {
    state_dir.join("schedules.json")
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
