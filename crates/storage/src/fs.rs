//! Atomic-write helper: write to a sibling temp file, then rename, so a
//! crash mid-write can never leave a half-written file behind.

use std::path::Path;

use crate::paths::StorageError;

pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
    }
    let body = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Decode { path: path.to_path_buf(), source })?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &body).map_err(|source| StorageError::Io { path: tmp_path.clone(), source })?;
    std::fs::rename(&tmp_path, path).map_err(|source| StorageError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let value = serde_json::from_slice(&bytes).map_err(|source| StorageError::Decode { path: path.to_path_buf(), source })?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io { path: path.to_path_buf(), source }),
    }
}
