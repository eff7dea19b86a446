//! Fakes for exercising the executor, dispatcher, and scheduler without a
//! real assistant process or WebSocket.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::sdk::{ClaudeSdkClient, EventStream, InterruptHandle, SdkError, SdkEvent, SdkOptions, SdkSession, ToolGate, ABORT_MESSAGE};

/// One step of a scripted assistant turn.
pub enum ScriptStep {
    Emit(SdkEvent),
    /// Ask the tool gate (the security mediator, wired in by the caller)
    /// whether a tool may run; if it says no, the scripted turn ends with
    /// an abort error instead of playing out its remaining steps.
    Gate { tool_name: String, input: Value },
}

/// A `ClaudeSdkClient` that replays pre-scripted turns in call order.
pub struct FakeSdkClient {
    turns: Mutex<std::collections::VecDeque<Vec<ScriptStep>>>,
    pub calls: Arc<Mutex<Vec<SdkOptions>>>,
}

impl FakeSdkClient {
    pub fn new(turns: Vec<Vec<ScriptStep>>) -> Self {
        Self { turns: Mutex::new(turns.into_iter().collect()), calls: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ClaudeSdkClient for FakeSdkClient {
    async fn execute_turn(&self, options: SdkOptions, gate: Arc<dyn ToolGate>) -> Result<SdkSession, SdkError> {
        self.calls.lock().unwrap().push(options);
        let steps = self.turns.lock().unwrap().pop_front().unwrap_or_default();
        let (interrupt, cancel) = InterruptHandle::new();

        let events: EventStream = Box::pin(async_stream::try_stream! {
            for step in steps {
                if cancel.is_cancelled() {
                    Err(SdkError::new(ABORT_MESSAGE))?;
                }
                match step {
                    ScriptStep::Emit(event) => yield event,
                    ScriptStep::Gate { tool_name, input } => {
                        let allowed = gate.can_use_tool(&tool_name, &input, cancel.clone()).await;
                        if !allowed {
                            Err(SdkError::new("tool use denied"))?;
                        }
                    }
                }
            }
        });

        Ok(SdkSession { events, interrupt })
    }
}

/// A `ToolGate` that always allows, for tests that don't exercise approval.
pub struct AllowAllGate;

#[async_trait::async_trait]
impl ToolGate for AllowAllGate {
    async fn can_use_tool(&self, _tool_name: &str, _input: &Value, _cancel: CancellationToken) -> bool {
        true
    }
}
