//! Insertion-only set of trusted filesystem path prefixes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// An append-only set of path prefixes the assistant may touch without
/// further approval. Trust is conferred by ancestor-descendant match, never
/// persisted to disk, and seeded once with the working directory.
#[derive(Debug, Clone, Default)]
pub struct TrustedPathSet {
    roots: HashSet<PathBuf>,
}

impl TrustedPathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the set with the agent's working directory.
    pub fn seeded(work_dir: impl Into<PathBuf>) -> Self {
        let mut set = Self::new();
        set.insert(work_dir.into());
        set
    }

    /// Add a path to the trusted set. Idempotent.
    ///
    /// The path is stored exactly as given (after `Path::to_path_buf`); per
    /// design, extracted paths are not resolved or normalized beyond what
    /// the caller already did.
    pub fn insert(&mut self, path: impl Into<PathBuf>) {
        self.roots.insert(path.into());
    }

    /// True iff `path` equals, or is a descendant of, some trusted root.
    pub fn is_trusted(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path == root || path.starts_with(root))
    }

    /// Filter `paths` down to the ones that are not yet trusted.
    pub fn untrusted<'a>(&self, paths: &'a [PathBuf]) -> Vec<&'a PathBuf> {
        paths.iter().filter(|p| !self.is_trusted(p)).collect()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
#[path = "trust_tests.rs"]
mod tests;
