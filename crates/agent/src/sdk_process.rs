//! Concrete `ClaudeSdkClient`: spawns the `claude` CLI in streaming JSON
//! mode and speaks its newline-delimited event/control protocol over
//! stdio. Grounded on the same spawn-a-wrapped-process-and-reap-it shape
//! the corpus uses for its own agent-process adapters, simplified down to
//! one child process with no health-check socket.

use std::process::Stdio;
use std::sync::Arc;

use async_stream::try_stream;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use vibecheck_core::{ResumePolicy, TokenUsage};

use crate::sdk::{ClaudeSdkClient, EventStream, InterruptHandle, SdkError, SdkEvent, SdkOptions, SdkSession, SdkTurnResult, ToolGate};

pub struct ProcessSdkClient {
    binary: String,
}

impl ProcessSdkClient {
    pub fn new() -> Self {
        Self { binary: "claude".to_string() }
    }
}

impl Default for ProcessSdkClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ClaudeSdkClient for ProcessSdkClient {
    async fn execute_turn(&self, options: SdkOptions, gate: Arc<dyn ToolGate>) -> Result<SdkSession, SdkError> {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(&options.work_dir)
            .arg("--print")
            .arg("--output-format")
            .arg("stream-json")
            .arg("--include-partial-messages")
            .arg("--permission-mode")
            .arg("default");

        match &options.resume {
            ResumePolicy::Resume(id) => {
                cmd.arg("--resume").arg(id.as_str());
            }
            ResumePolicy::ContinueMostRecent => {
                cmd.arg("--continue");
            }
            ResumePolicy::Fresh => {}
        }
        if !options.allowed_tools.is_empty() {
            cmd.arg("--allowed-tools").arg(options.allowed_tools.join(","));
        }
        if let Some(model) = &options.model {
            cmd.arg("--model").arg(model);
        }
        if let Some(prompt) = &options.system_prompt {
            cmd.arg("--append-system-prompt").arg(prompt);
        }

        cmd.env("NO_COLOR", "1");
        for (key, value) in &options.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| SdkError::new(format!("failed to spawn claude: {e}")))?;
        let mut stdin = child.stdin.take().ok_or_else(|| SdkError::new("no stdin handle"))?;
        let stdout = child.stdout.take().ok_or_else(|| SdkError::new("no stdout handle"))?;
        let stderr = child.stderr.take();

        stdin
            .write_all(format!("{}\n", options.message).as_bytes())
            .await
            .map_err(|e| SdkError::new(format!("failed to write prompt: {e}")))?;

        let (interrupt, cancel) = InterruptHandle::new();

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::debug!(%status, "claude process exited"),
                Err(e) => tracing::warn!(error = %e, "failed to wait on claude process"),
            }
        });

        if let Some(stderr) = stderr {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(target: "claude_stderr", "{line}");
                }
            });
        }

        let events: EventStream = Box::pin(try_stream! {
            let mut reader = BufReader::new(stdout).lines();
            loop {
                let line = tokio::select! {
                    _ = cancel.cancelled() => break,
                    line = reader.next_line() => line,
                };
                let Some(line) = line.map_err(|e| SdkError::new(format!("stdout read error: {e}")))? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let value: Value = serde_json::from_str(&line)
                    .map_err(|e| SdkError::new(format!("malformed event json: {e}")))?;
                if let Some(event) = parse_control_request(&value) {
                    let (id, tool_name, input) = event;
                    let allowed = gate.can_use_tool(&tool_name, &input, cancel.clone()).await;
                    let response = serde_json::json!({
                        "type": "control_response",
                        "request_id": id,
                        "allow": allowed,
                    });
                    let _ = stdin.write_all(format!("{response}\n").as_bytes()).await;
                    continue;
                }
                if let Some(event) = translate_event(&value) {
                    yield event;
                }
            }
        });

        Ok(SdkSession { events, interrupt })
    }
}

fn parse_control_request(value: &Value) -> Option<(String, String, Value)> {
    if value.get("type")?.as_str()? != "control_request" {
        return None;
    }
    if value.get("subtype")?.as_str()? != "can_use_tool" {
        return None;
    }
    let id = value.get("request_id")?.as_str()?.to_string();
    let tool_name = value.get("tool_name")?.as_str()?.to_string();
    let input = value.get("input").cloned().unwrap_or(Value::Null);
    Some((id, tool_name, input))
}

fn translate_event(value: &Value) -> Option<SdkEvent> {
    match value.get("type")?.as_str()? {
        "system" if value.get("subtype").and_then(Value::as_str) == Some("init") => {
            Some(SdkEvent::SystemInit { session_id: value.get("session_id").and_then(Value::as_str).map(String::from) })
        }
        "stream_event" => {
            let delta = value.get("event")?.get("delta")?.get("text")?.as_str()?;
            Some(SdkEvent::TextDelta { text: delta.to_string() })
        }
        "assistant" => {
            let blocks = value.get("message")?.get("content")?.as_array()?;
            blocks.iter().find_map(|block| {
                if block.get("type")?.as_str()? != "tool_use" {
                    return None;
                }
                Some(SdkEvent::ToolUseStart {
                    id: block.get("id")?.as_str()?.to_string(),
                    name: block.get("name")?.as_str()?.to_string(),
                    input: block.get("input").cloned().unwrap_or(Value::Null),
                })
            })
        }
        "user" => {
            let blocks = value.get("message")?.get("content")?.as_array()?;
            blocks.iter().find_map(|block| {
                if block.get("type")?.as_str()? != "tool_result" {
                    return None;
                }
                Some(SdkEvent::ToolResult { tool_use_id: block.get("tool_use_id")?.as_str()?.to_string() })
            })
        }
        "result" => {
            let session_id = value.get("session_id").and_then(Value::as_str).map(String::from);
            let cost_usd = value.get("total_cost_usd").and_then(Value::as_f64);
            let num_turns = value.get("num_turns").and_then(Value::as_u64).map(|n| n as u32);
            if value.get("subtype").and_then(Value::as_str) == Some("success") {
                let text = value.get("result").and_then(Value::as_str).unwrap_or_default().to_string();
                let usage = value.get("usage").map(parse_usage);
                Some(SdkEvent::Result(SdkTurnResult::Success { text, session_id, cost_usd, num_turns, usage }))
            } else {
                let messages = value
                    .get("errors")
                    .and_then(Value::as_array)
                    .map(|errs| errs.iter().filter_map(|e| e.as_str().map(String::from)).collect())
                    .unwrap_or_else(|| vec!["unknown error".to_string()]);
                Some(SdkEvent::Result(SdkTurnResult::Error { messages, session_id, cost_usd }))
            }
        }
        _ => None,
    }
}

fn parse_usage(value: &Value) -> TokenUsage {
    TokenUsage {
        input_tokens: value.get("input_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: value.get("output_tokens").and_then(Value::as_u64).unwrap_or(0),
        cache_read_input_tokens: value.get("cache_read_input_tokens").and_then(Value::as_u64).unwrap_or(0),
        cache_creation_input_tokens: value.get("cache_creation_input_tokens").and_then(Value::as_u64).unwrap_or(0),
    }
}

#[cfg(test)]
#[path = "sdk_process_tests.rs"]
mod tests;
