//! Query Executor: drives one assistant turn end to end.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use vibecheck_core::{ExecuteResult, SessionId, SessionState, Skill};
use vibecheck_wire::ToolStatusKind;

use crate::sdk::{ClaudeSdkClient, InterruptHandle, SdkError, SdkEvent, SdkOptions, SdkSession, SdkTurnResult, ToolGate};

const DEFAULT_ALLOWED_TOOLS: &[&str] =
    &["Read", "Write", "Edit", "Bash", "Glob", "Grep", "WebFetch", "WebSearch", "TodoWrite", "NotebookEdit"];

pub struct ExecuteRequest {
    pub message: String,
    pub model: Option<String>,
    pub skill: Option<Skill>,
    pub system_prompt: Option<String>,
    pub agents: Option<HashMap<String, Value>>,
}

/// Translated assistant-turn events the caller streams out to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorEvent {
    StreamingChunk { delta: String, index: u64 },
    ToolStatus { tool: String, status: ToolStatusKind, detail: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteOutcome {
    Finished(ExecuteResult),
    Aborted,
}

pub struct Executor<C: ClaudeSdkClient> {
    sdk: Arc<C>,
    current_interrupt: Mutex<Option<InterruptHandle>>,
}

impl<C: ClaudeSdkClient> Executor<C> {
    pub fn new(sdk: Arc<C>) -> Self {
        Self { sdk, current_interrupt: Mutex::new(None) }
    }

    /// Request cancellation of whatever turn is currently in flight.
    /// Returns false if nothing was running.
    pub fn interrupt_current(&self) -> bool {
        match self.current_interrupt.lock().take() {
            Some(handle) => {
                handle.trigger();
                true
            }
            None => false,
        }
    }

    pub async fn execute(
        &self,
        work_dir: &Path,
        session: &mut SessionState,
        request: ExecuteRequest,
        gate: Arc<dyn ToolGate>,
        mut on_event: impl FnMut(ExecutorEvent),
    ) -> ExecuteOutcome {
        match self.execute_once(work_dir, session, &request, gate.clone(), &mut on_event).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_abort() => ExecuteOutcome::Aborted,
            Err(e) if e.looks_like_stale_session() && session.id().is_some() => {
                session.clear();
                match self.execute_once(work_dir, session, &request, gate, &mut on_event).await {
                    Ok(outcome) => outcome,
                    Err(e2) if e2.is_abort() => ExecuteOutcome::Aborted,
                    Err(e2) => ExecuteOutcome::Finished(error_result(&e2)),
                }
            }
            Err(e) => ExecuteOutcome::Finished(error_result(&e)),
        }
    }

    async fn execute_once(
        &self,
        work_dir: &Path,
        session: &mut SessionState,
        request: &ExecuteRequest,
        gate: Arc<dyn ToolGate>,
        on_event: &mut impl FnMut(ExecutorEvent),
    ) -> Result<ExecuteOutcome, SdkError> {
        let options = build_options(work_dir, session, request);
        let SdkSession { mut events, interrupt } = self.sdk.execute_turn(options, gate).await?;
        *self.current_interrupt.lock() = Some(interrupt);

        let mut index = 0u64;
        let mut tool_names: HashMap<String, String> = HashMap::new();
        let mut captured_session_id: Option<String> = None;
        let mut terminal: Option<SdkTurnResult> = None;

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(e) => e,
                Err(e) => {
                    *self.current_interrupt.lock() = None;
                    return Err(e);
                }
            };
            match event {
                SdkEvent::SystemInit { session_id } => {
                    if let Some(id) = session_id {
                        captured_session_id.get_or_insert(id);
                    }
                }
                SdkEvent::TextDelta { text } => {
                    on_event(ExecutorEvent::StreamingChunk { delta: text, index });
                    index += 1;
                }
                SdkEvent::ToolUseStart { id, name, input } => {
                    let detail = extract_detail(&name, &input);
                    tool_names.insert(id, name.clone());
                    on_event(ExecutorEvent::ToolStatus { tool: name, status: ToolStatusKind::Start, detail });
                }
                SdkEvent::ToolResult { tool_use_id } => {
                    if let Some(name) = tool_names.remove(&tool_use_id) {
                        on_event(ExecutorEvent::ToolStatus { tool: name, status: ToolStatusKind::End, detail: None });
                    }
                }
                SdkEvent::Result(result) => {
                    terminal = Some(result);
                    break;
                }
            }
        }
        *self.current_interrupt.lock() = None;

        match terminal {
            Some(SdkTurnResult::Success { text, session_id, cost_usd, num_turns, usage }) => {
                adopt_session(session, session_id.or(captured_session_id));
                Ok(ExecuteOutcome::Finished(ExecuteResult { text, cost_usd, num_turns, usage }))
            }
            Some(SdkTurnResult::Error { messages, session_id, cost_usd }) => {
                adopt_session(session, session_id.or(captured_session_id));
                Err(SdkError(messages.join("; "), cost_usd))
            }
            // Stream ended with no terminal result: the turn was cancelled mid-flight.
            None => Ok(ExecuteOutcome::Aborted),
        }
    }
}

fn adopt_session(session: &mut SessionState, new_id: Option<String>) {
    match new_id {
        Some(id) => session.adopt(SessionId::new(id)),
        None => session.mark_started(),
    }
}

fn error_result(e: &SdkError) -> ExecuteResult {
    ExecuteResult { text: format!("오류가 발생했습니다: {e}"), cost_usd: e.1, ..Default::default() }
}

fn build_options(work_dir: &Path, session: &SessionState, request: &ExecuteRequest) -> SdkOptions {
    let allowed_tools = request
        .skill
        .as_ref()
        .and_then(|s| s.allowed_tools.clone())
        .unwrap_or_else(|| DEFAULT_ALLOWED_TOOLS.iter().map(|s| s.to_string()).collect());

    let skill_prompt = request.skill.as_ref().and_then(|s| s.system_prompt.clone());
    let system_prompt = match (skill_prompt, request.system_prompt.clone()) {
        (Some(a), Some(b)) => Some(format!("{a}\n\n{b}")),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };

    let mut env = HashMap::new();
    env.insert("NO_COLOR".to_string(), "1".to_string());

    SdkOptions {
        work_dir: work_dir.to_path_buf(),
        resume: session.resume_policy(),
        allowed_tools,
        model: request.model.clone(),
        system_prompt,
        agents: request.agents.clone(),
        message: request.message.clone(),
        env,
    }
}

fn extract_detail(tool_name: &str, input: &Value) -> Option<String> {
    match tool_name {
        "Read" | "Write" | "Edit" => input.get("file_path").and_then(Value::as_str).map(String::from),
        "Bash" => input.get("command").and_then(Value::as_str).map(|c| c.chars().take(80).collect()),
        "Glob" | "Grep" => input.get("pattern").and_then(Value::as_str).map(String::from),
        "WebFetch" => input.get("url").and_then(Value::as_str).map(String::from),
        "WebSearch" => input.get("query").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
