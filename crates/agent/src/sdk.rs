//! The boundary to the assistant SDK. The agent never reasons about
//! assistant output, only about the envelope: deltas, tool-use lifecycle,
//! and the terminal result. `ClaudeSdkClient` is the seam that lets the
//! executor's demultiplexing logic be tested without a real assistant
//! process.

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;

use futures_util::Stream;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use vibecheck_core::{ResumePolicy, TokenUsage};

/// An SDK-exception or terminal-error-result failure. `cost_usd` is only
/// ever populated for the latter: a thrown exception never reports a cost.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SdkError(pub String, pub Option<f64>);

pub(crate) const ABORT_MESSAGE: &str = "aborted";

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into(), None)
    }

    /// Stale-session recovery matches this, case-insensitively, against the
    /// error text.
    pub fn looks_like_stale_session(&self) -> bool {
        let lower = self.0.to_lowercase();
        lower.contains("session") || lower.contains("not found")
    }

    pub fn is_abort(&self) -> bool {
        self.0 == ABORT_MESSAGE
    }
}

#[derive(Debug, Clone)]
pub struct SdkOptions {
    pub work_dir: PathBuf,
    pub resume: ResumePolicy,
    pub allowed_tools: Vec<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub agents: Option<HashMap<String, Value>>,
    pub message: String,
    pub env: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub enum SdkEvent {
    SystemInit { session_id: Option<String> },
    TextDelta { text: String },
    ToolUseStart { id: String, name: String, input: Value },
    ToolResult { tool_use_id: String },
    Result(SdkTurnResult),
}

#[derive(Debug, Clone)]
pub enum SdkTurnResult {
    Success { text: String, session_id: Option<String>, cost_usd: Option<f64>, num_turns: Option<u32>, usage: Option<TokenUsage> },
    Error { messages: Vec<String>, session_id: Option<String>, cost_usd: Option<f64> },
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<SdkEvent, SdkError>> + Send>>;

/// A handle allowing the caller to request cancellation of an in-flight turn.
#[derive(Clone)]
pub struct InterruptHandle {
    token: CancellationToken,
}

impl InterruptHandle {
    pub fn new() -> (Self, CancellationToken) {
        let token = CancellationToken::new();
        (Self { token: token.clone() }, token)
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }
}

pub struct SdkSession {
    pub events: EventStream,
    pub interrupt: InterruptHandle,
}

/// A permission callback the SDK invokes synchronously before a tool runs.
/// The executor wires this to the Security Mediator.
#[async_trait::async_trait]
pub trait ToolGate: Send + Sync {
    async fn can_use_tool(&self, tool_name: &str, input: &Value, cancel: CancellationToken) -> bool;
}

#[async_trait::async_trait]
pub trait ClaudeSdkClient: Send + Sync {
    async fn execute_turn(
        &self,
        options: SdkOptions,
        gate: std::sync::Arc<dyn ToolGate>,
    ) -> Result<SdkSession, SdkError>;
}
