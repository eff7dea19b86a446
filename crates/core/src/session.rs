//! Opaque assistant session identifiers and per-working-directory session state.

use std::borrow::Borrow;
use std::fmt;

/// Opaque identifier handed back by the assistant SDK. The agent never
/// inspects its contents, only stores and replays it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Tracks the resumption state for one working directory across the
/// lifetime of the process (and, via storage, across restarts).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    id: Option<SessionId>,
    /// True once at least one query has completed in this process.
    started: bool,
}

/// What resumption strategy the executor should request from the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumePolicy {
    /// Explicitly resume this stored session id.
    Resume(SessionId),
    /// No stored id, but a prior query ran this process: continue the most recent.
    ContinueMostRecent,
    /// Nothing to resume from; start fresh.
    Fresh,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: SessionId) -> Self {
        Self { id: Some(id), started: true }
    }

    pub fn id(&self) -> Option<&SessionId> {
        self.id.as_ref()
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// The resumption policy implied by the current state, per the
    /// "resume stored id, else continue most recent, else fresh" rule.
    pub fn resume_policy(&self) -> ResumePolicy {
        match &self.id {
            Some(id) => ResumePolicy::Resume(id.clone()),
            None if self.started => ResumePolicy::ContinueMostRecent,
            None => ResumePolicy::Fresh,
        }
    }

    /// Record a new session id reported by the SDK after a query completed.
    pub fn adopt(&mut self, id: SessionId) {
        self.id = Some(id);
        self.started = true;
    }

    /// Mark that a query ran even though no session id was captured
    /// (defensive; normally `adopt` is called instead).
    pub fn mark_started(&mut self) {
        self.started = true;
    }

    /// Stale-session recovery: drop the stored id and the started flag so
    /// the next attempt starts fresh.
    pub fn clear(&mut self) {
        self.id = None;
        self.started = false;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
