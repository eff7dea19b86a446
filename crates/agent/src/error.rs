//! Binary-boundary error type. Everything past startup degrades gracefully
//! (see the failure-mode table); `AgentError` exists only for conditions
//! fatal enough to abort the process with exit code 1.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("working directory does not exist: {0}")]
    WorkDirMissing(PathBuf),

    #[error("working directory is not a directory: {0}")]
    WorkDirNotADirectory(PathBuf),

    #[error("could not prepare state directory: {0}")]
    StateDir(#[from] vibecheck_storage::StorageError),

    #[error("invalid command line arguments: {0}")]
    Args(String),
}
