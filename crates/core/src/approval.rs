//! At-most-one in-flight tool-use approval request.

use std::path::PathBuf;

use tokio::sync::oneshot;

/// The outcome handed back to the SDK's suspended permission callback.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub allow: bool,
    pub reason: Option<String>,
}

impl ApprovalOutcome {
    pub fn allow() -> Self {
        Self { allow: true, reason: None }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self { allow: false, reason: Some(reason.into()) }
    }
}

/// A single in-flight approval request, parked on a oneshot channel.
///
/// The protocol has no approval correlation id; safety relies on the
/// single-flight execution invariant guaranteeing at most one of these
/// exists at a time.
pub struct PendingApproval {
    pub tool_name: String,
    pub tool_input: serde_json::Value,
    pub paths: Vec<PathBuf>,
    resolver: Option<oneshot::Sender<ApprovalOutcome>>,
}

impl PendingApproval {
    /// Create a pending approval, returning it alongside the receiver the
    /// caller should await for the eventual decision.
    pub fn new(
        tool_name: impl Into<String>,
        tool_input: serde_json::Value,
        paths: Vec<PathBuf>,
    ) -> (Self, oneshot::Receiver<ApprovalOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tool_name: tool_name.into(), tool_input, paths, resolver: Some(tx) }, rx)
    }

    /// Resolve the approval. Idempotent: a second call is a silent no-op.
    /// Returns true iff this call actually resolved the approval.
    pub fn resolve(&mut self, outcome: ApprovalOutcome) -> bool {
        match self.resolver.take() {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolver.is_none()
    }
}

#[cfg(test)]
#[path = "approval_tests.rs"]
mod tests;
