//! Persistence of the per-working-directory session id.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vibecheck_core::SessionId;

use crate::fs::{read_json, write_json_atomic};
use crate::paths::{session_file_path, StorageError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub work_dir: PathBuf,
    pub session_id: String,
    pub updated_at: u64,
}

/// Load the persisted session id for `work_dir`, if any.
pub fn load_session_id(state_dir: &Path, work_dir: &Path) -> Result<Option<SessionId>, StorageError> {
    let path = session_file_path(state_dir, work_dir);
    let record: Option<SessionRecord> = read_json(&path)?;
    Ok(record.map(|r| SessionId::new(r.session_id)))
}

/// Persist a session id for `work_dir`, overwriting any previous record.
pub fn save_session_id(state_dir: &Path, work_dir: &Path, session_id: &SessionId, updated_at_ms: u64) -> Result<(), StorageError> {
    let path = session_file_path(state_dir, work_dir);
    let record = SessionRecord {
        work_dir: work_dir.to_path_buf(),
        session_id: session_id.as_str().to_string(),
        updated_at: updated_at_ms,
    };
    write_json_atomic(&path, &record)
}

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;
