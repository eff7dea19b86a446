//! Workspace Observer: image-mtime snapshots, screenshot-keyword detection,
//! and the narrow interface to an external headless-browser screenshot
//! collaborator. The collaborator's pixel-level mechanics are out of scope;
//! only the cap and the keyword rule are core, testable behavior.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::env::{MAX_IMAGES_PER_RESPONSE, SCREENSHOT_NAVIGATION_TIMEOUT, SCREENSHOT_PORT_TIMEOUT};

pub type ImageSnapshot = HashMap<PathBuf, SystemTime>;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Korean aliases included per the reference UI's keyword list.
const SCREENSHOT_KEYWORDS: &[&str] =
    &["screenshot", "preview", "ui", "스크린샷", "화면 캡처", "캡처해"];

/// True iff the *user's* message (never the assistant's response) mentions
/// wanting a screenshot.
pub fn mentions_screenshot(user_message: &str) -> bool {
    let lower = user_message.to_lowercase();
    SCREENSHOT_KEYWORDS.iter().any(|k| lower.contains(&k.to_lowercase()))
}

/// Snapshot the mtimes of image files under `work_dir`. On timeout or any
/// I/O error, returns an empty map rather than failing the query.
pub async fn snapshot_images(work_dir: &Path, timeout: Duration) -> ImageSnapshot {
    match tokio::time::timeout(timeout, walk_images(work_dir.to_path_buf())).await {
        Ok(Ok(map)) => map,
        _ => ImageSnapshot::new(),
    }
}

fn walk_images(dir: PathBuf) -> std::pin::Pin<Box<dyn std::future::Future<Output = std::io::Result<ImageSnapshot>> + Send>> {
    Box::pin(async move {
        let mut out = ImageSnapshot::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                if is_skippable_dir(&path) {
                    continue;
                }
                let nested = walk_images(path).await?;
                out.extend(nested);
            } else if file_type.is_file() && is_image_path(&path) {
                if let Ok(meta) = entry.metadata().await {
                    if let Ok(modified) = meta.modified() {
                        out.insert(path, modified);
                    }
                }
            }
        }
        Ok(out)
    })
}

fn is_skippable_dir(path: &Path) -> bool {
    matches!(path.file_name().and_then(|n| n.to_str()), Some(".git") | Some("node_modules") | Some("target"))
}

fn is_image_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str())).unwrap_or(false)
}

/// New-or-modified images between two snapshots, capped and sorted for
/// determinism.
pub fn diff_images(before: &ImageSnapshot, after: &ImageSnapshot, cap: usize) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = after
        .iter()
        .filter(|(path, mtime)| before.get(*path).map(|old| old != *mtime).unwrap_or(true))
        .map(|(path, _)| path.clone())
        .collect();
    changed.sort();
    changed.truncate(cap);
    changed
}

pub fn remaining_image_budget(already_attached: usize) -> usize {
    MAX_IMAGES_PER_RESPONSE.saturating_sub(already_attached)
}

/// External headless-browser screenshot backend. The production
/// implementation polls for a dev-server port within `SCREENSHOT_PORT_TIMEOUT`
/// and then navigates within `SCREENSHOT_NAVIGATION_TIMEOUT`; both are
/// enforced by the collaborator itself, not by this trait.
#[async_trait::async_trait]
pub trait ScreenshotCollaborator: Send + Sync {
    async fn capture(&self, work_dir: &Path) -> Option<Vec<u8>>;
}

/// No screenshot backend wired up; always reports failure so the caller
/// falls back to mtime-diffed images.
pub struct NullScreenshotCollaborator;

#[async_trait::async_trait]
impl ScreenshotCollaborator for NullScreenshotCollaborator {
    async fn capture(&self, _work_dir: &Path) -> Option<Vec<u8>> {
        let _ = (SCREENSHOT_PORT_TIMEOUT, SCREENSHOT_NAVIGATION_TIMEOUT);
        None
    }
}

#[cfg(test)]
#[path = "workspace_observer_tests.rs"]
mod tests;
