//! Persistence of the full scheduled-task list as one JSON array.

use std::path::Path;

use vibecheck_core::ScheduledTask;

use crate::fs::{read_json, write_json_atomic};
use crate::paths::{schedule_file_path, StorageError};

pub fn load_tasks(state_dir: &Path) -> Result<Vec<ScheduledTask>, StorageError> {
    let path = schedule_file_path(state_dir);
    Ok(read_json(&path)?.unwrap_or_default())
}

pub fn save_tasks(state_dir: &Path, tasks: &[ScheduledTask]) -> Result<(), StorageError> {
    let path = schedule_file_path(state_dir);
    write_json_atomic(&path, &tasks.to_vec())
}

#[cfg(test)]
#[path = "schedule_store_tests.rs"]
mod tests;
