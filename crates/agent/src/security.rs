//! Security Mediator: path-trust gate in front of every tool invocation.

use std::path::PathBuf;

use serde_json::Value;
use tokio::sync::oneshot;
use vibecheck_core::{ApprovalOutcome, PendingApproval, TrustedPathSet};

const SAFE_COMMANDS: &[&str] = &[
    "nvidia-smi",
    "df",
    "free",
    "uptime",
    "whoami",
    "hostname",
    "cat /proc/cpuinfo",
    "cat /proc/meminfo",
    "ps",
    "top -bn1",
    "ls",
    "pwd",
    "date",
    "which",
    "echo",
    "git status",
    "git log",
    "git diff",
];

/// What `evaluate` decided for one tool call, before any approval round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolDecision {
    Allow,
    RequiresApproval { paths: Vec<PathBuf>, message: String },
}

/// Extract the filesystem paths a tool call would touch. Conservative by
/// tool: unknown tools and tools with no path-shaped argument return none,
/// which (by design) allows them unconditionally.
pub fn extract_paths(tool_name: &str, input: &Value) -> Vec<PathBuf> {
    match tool_name {
        "Read" | "Write" | "Edit" => input
            .get("file_path")
            .and_then(Value::as_str)
            .map(|s| vec![PathBuf::from(s)])
            .unwrap_or_default(),
        "Glob" | "Grep" => input.get("path").and_then(Value::as_str).map(|s| vec![PathBuf::from(s)]).unwrap_or_default(),
        "Bash" => input.get("command").and_then(Value::as_str).map(extract_paths_from_command).unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Heuristic extraction of path-shaped tokens from free-form shell text.
/// Unsound by construction: a false negative here is caught by the
/// per-tool checks above for the common tools, and a false positive only
/// costs an extra approval prompt.
fn extract_paths_from_command(command: &str) -> Vec<PathBuf> {
    command
        .split_whitespace()
        .filter(|tok| !tok.starts_with('-'))
        .filter(|tok| tok.contains('/'))
        .map(PathBuf::from)
        .collect()
}

fn is_safe_bash_command(command: &str) -> bool {
    let trimmed = command.trim();
    SAFE_COMMANDS.iter().any(|safe| trimmed == *safe || trimmed.starts_with(&format!("{safe} ")))
}

/// Build the human-readable `approval_required` message.
fn approval_message(tool_name: &str, input: &Value) -> String {
    let input_str = serde_json::to_string(input).unwrap_or_default();
    let truncated: String = input_str.chars().take(200).collect();
    format!("{tool_name}: {truncated}")
}

pub struct SecurityMediator {
    trusted: TrustedPathSet,
    pending: Option<PendingApproval>,
}

impl SecurityMediator {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self { trusted: TrustedPathSet::seeded(work_dir), pending: None }
    }

    pub fn add_trusted_path(&mut self, path: impl Into<PathBuf>) {
        self.trusted.insert(path);
    }

    pub fn is_trusted(&self, path: &std::path::Path) -> bool {
        self.trusted.is_trusted(path)
    }

    /// Decide whether a tool call needs an approval round-trip.
    pub fn evaluate(&self, tool_name: &str, input: &Value) -> ToolDecision {
        let paths = extract_paths(tool_name, input);
        let untrusted = self.trusted.untrusted(&paths);
        if untrusted.is_empty() {
            return ToolDecision::Allow;
        }
        if tool_name == "Bash" {
            if let Some(command) = input.get("command").and_then(Value::as_str) {
                if is_safe_bash_command(command) {
                    return ToolDecision::Allow;
                }
            }
        }
        ToolDecision::RequiresApproval { paths, message: approval_message(tool_name, input) }
    }

    /// Park a new approval request. Panics if one is already pending —
    /// callers must respect the single-flight invariant (at most one
    /// in-flight tool call per process).
    pub fn begin_approval(
        &mut self,
        tool_name: impl Into<String>,
        tool_input: Value,
        paths: Vec<PathBuf>,
    ) -> oneshot::Receiver<ApprovalOutcome> {
        debug_assert!(self.pending.is_none(), "at most one PendingApproval may exist at a time");
        let (pending, rx) = PendingApproval::new(tool_name, tool_input, paths);
        self.pending = Some(pending);
        rx
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolve the pending approval. Idempotent; a stray second `approval`
    /// message is a silent no-op. On permanent approval the raw extracted
    /// paths (not parents, not resolved symlinks) become trusted.
    pub fn resolve_approval(&mut self, approved: bool, permanent: bool) {
        let Some(pending) = self.pending.as_mut() else { return };
        if approved && permanent {
            for path in pending.paths.clone() {
                self.trusted.insert(path);
            }
        }
        let outcome = if approved { ApprovalOutcome::allow() } else { ApprovalOutcome::deny("Denied by user") };
        pending.resolve(outcome);
        self.pending = None;
    }

    /// Abort the pending approval (e.g. the SDK's own cancellation signal
    /// fired while we were waiting on the UI).
    pub fn abort_pending(&mut self, reason: impl Into<String>) {
        if let Some(mut pending) = self.pending.take() {
            pending.resolve(ApprovalOutcome::deny(reason));
        }
    }
}

#[cfg(test)]
#[path = "security_tests.rs"]
mod tests;
