//! End-to-end scenarios driving the dispatcher against a scripted SDK and
//! an in-memory outbound sink, with no real subprocess or socket involved.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::mpsc;

use vibecheck_agent::dispatch::{AgentState, GateMessage, Outbox, QueryFinished};
use vibecheck_agent::scheduler::Scheduler;
use vibecheck_agent::security::SecurityMediator;
use vibecheck_agent::skills::default_skill_table;
use vibecheck_agent::test_support::{FakeSdkClient, ScriptStep};
use vibecheck_agent::workspace_observer::NullScreenshotCollaborator;
use vibecheck_agent::{executor::Executor, sdk::SdkEvent, sdk::SdkTurnResult};
use vibecheck_core::{ExecutionSlot, FakeClock, PendingTaskQueue, ScheduledTask, SessionState};
use vibecheck_wire::{AgentMessage, ServerMessage};

struct Sink(Mutex<Vec<AgentMessage>>);

impl Sink {
    fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Vec::new())))
    }

    fn messages(&self) -> Vec<AgentMessage> {
        self.0.lock().unwrap().clone()
    }
}

impl Outbox for Sink {
    fn send(&self, message: AgentMessage) {
        self.0.lock().unwrap().push(message);
    }
}

fn harness(
    sdk: Arc<FakeSdkClient>,
) -> (AgentState<FakeSdkClient, FakeClock>, mpsc::UnboundedReceiver<GateMessage>, mpsc::UnboundedReceiver<QueryFinished>) {
    let (gate_tx, gate_rx) = mpsc::unbounded_channel();
    let (result_tx, result_rx) = mpsc::unbounded_channel();
    let state = AgentState {
        work_dir: PathBuf::from("/work"),
        clock: FakeClock::new(),
        session: SessionState::new(),
        security: SecurityMediator::new("/work"),
        skills: default_skill_table(),
        slot: ExecutionSlot::new(),
        pending: PendingTaskQueue::new(),
        scheduler: Scheduler::new(vec![]),
        executor: Arc::new(Executor::new(sdk)),
        screenshot: Arc::new(NullScreenshotCollaborator),
        gate_tx,
        query_result_tx: result_tx,
        state_dir: std::env::temp_dir().join("vibecheck-scenarios-tests"),
    };
    (state, gate_rx, result_rx)
}

/// Drains gate/result traffic until one `QueryFinished` has been applied.
async fn run_to_completion(
    state: &mut AgentState<FakeSdkClient, FakeClock>,
    gate_rx: &mut mpsc::UnboundedReceiver<GateMessage>,
    result_rx: &mut mpsc::UnboundedReceiver<QueryFinished>,
    outbox: &Arc<dyn Outbox>,
) {
    loop {
        tokio::select! {
            Some(msg) = gate_rx.recv() => state.handle_gate_message(msg, outbox),
            Some(finished) = result_rx.recv() => {
                state.handle_query_finished(finished, outbox).await;
                return;
            }
        }
    }
}

fn query(message: &str) -> ServerMessage {
    ServerMessage::Query { message: message.into(), model: None, skill_id: None, system_prompt: None, agents: None }
}

#[tokio::test]
async fn s1_simple_query() {
    let sdk = Arc::new(FakeSdkClient::new(vec![vec![
        ScriptStep::Emit(SdkEvent::TextDelta { text: "hi".into() }),
        ScriptStep::Emit(SdkEvent::Result(SdkTurnResult::Success {
            text: "hi".into(),
            session_id: None,
            cost_usd: Some(0.001),
            num_turns: Some(1),
            usage: None,
        })),
    ]]));
    let (mut state, mut gate_rx, mut result_rx) = harness(sdk);
    let sink = Sink::new();
    let outbox: Arc<dyn Outbox> = sink.clone();

    state.handle_server_message(query("hello"), &outbox);
    run_to_completion(&mut state, &mut gate_rx, &mut result_rx, &outbox).await;

    assert!(!state.slot.is_busy());
    let messages = sink.messages();
    assert_eq!(messages[0], AgentMessage::StreamingChunk { delta: "hi".into(), index: 0 });
    assert!(matches!(
        &messages[1],
        AgentMessage::Response { result, cost_usd: Some(c), num_turns: Some(1), .. }
            if result == "hi" && (*c - 0.001).abs() < f64::EPSILON
    ));
}

#[tokio::test]
async fn s2_tool_approval_trusts_the_extracted_path() {
    let sdk = Arc::new(FakeSdkClient::new(vec![vec![
        ScriptStep::Gate { tool_name: "Write".into(), input: json!({"file_path": "/outside/x.txt"}) },
        ScriptStep::Emit(SdkEvent::Result(SdkTurnResult::Success { text: "wrote it".into(), session_id: None, cost_usd: None, num_turns: None, usage: None })),
    ]]));
    let (mut state, mut gate_rx, mut result_rx) = harness(sdk);
    let sink = Sink::new();
    let outbox: Arc<dyn Outbox> = sink.clone();

    state.handle_server_message(query("write outside"), &outbox);

    // First round: just the gate request surfaces as approval_required.
    tokio::select! {
        Some(msg) = gate_rx.recv() => state.handle_gate_message(msg, &outbox),
    }
    assert_eq!(
        sink.messages(),
        vec![AgentMessage::ApprovalRequired { paths: vec!["/outside/x.txt".into()], message: "Write: {\"file_path\":\"/outside/x.txt\"}".into() }]
    );

    state.handle_server_message(ServerMessage::Approval { approved: true, permanent: Some(true) }, &outbox);
    run_to_completion(&mut state, &mut gate_rx, &mut result_rx, &outbox).await;

    assert!(state.security.is_trusted(std::path::Path::new("/outside/x.txt")));
}

#[tokio::test]
async fn s3_interrupt_sends_one_fixed_response() {
    let sdk = Arc::new(FakeSdkClient::new(vec![vec![ScriptStep::Emit(SdkEvent::TextDelta { text: "working".into() })]]));
    let (mut state, mut gate_rx, mut result_rx) = harness(sdk);
    let sink = Sink::new();
    let outbox: Arc<dyn Outbox> = sink.clone();

    state.handle_server_message(query("long task"), &outbox);
    state.handle_server_message(ServerMessage::Interrupt {}, &outbox);
    run_to_completion(&mut state, &mut gate_rx, &mut result_rx, &outbox).await;

    let responses: Vec<_> = sink.messages().into_iter().filter(|m| matches!(m, AgentMessage::Response { .. })).collect();
    assert_eq!(responses, vec![AgentMessage::response(vibecheck_agent::dispatch::INTERRUPTED_MESSAGE)]);
}

#[tokio::test]
async fn s4_overlapping_query_is_rejected_without_touching_the_sdk() {
    let sdk = Arc::new(FakeSdkClient::new(vec![vec![ScriptStep::Emit(SdkEvent::Result(SdkTurnResult::Success {
        text: "first".into(),
        session_id: None,
        cost_usd: None,
        num_turns: None,
        usage: None,
    }))]]));
    let (mut state, mut gate_rx, mut result_rx) = harness(sdk.clone());
    let sink = Sink::new();
    let outbox: Arc<dyn Outbox> = sink.clone();

    state.handle_server_message(query("first"), &outbox);
    state.handle_server_message(query("second"), &outbox);
    assert_eq!(sink.messages(), vec![AgentMessage::response(vibecheck_agent::dispatch::BUSY_MESSAGE)]);

    run_to_completion(&mut state, &mut gate_rx, &mut result_rx, &outbox).await;
    assert_eq!(sdk.call_count(), 1);
}

#[tokio::test]
async fn s5_scheduled_task_queued_while_busy_runs_after_release() {
    let sdk = Arc::new(FakeSdkClient::new(vec![
        vec![ScriptStep::Emit(SdkEvent::Result(SdkTurnResult::Success { text: "busy work".into(), session_id: None, cost_usd: None, num_turns: None, usage: None }))],
        vec![ScriptStep::Emit(SdkEvent::Result(SdkTurnResult::Success { text: "pong".into(), session_id: None, cost_usd: None, num_turns: None, usage: None }))],
    ]));
    let (mut state, mut gate_rx, mut result_rx) = harness(sdk);
    let sink = Sink::new();
    let outbox: Arc<dyn Outbox> = sink.clone();

    state.handle_server_message(query("first"), &outbox);
    assert!(state.slot.is_busy());

    let task = ScheduledTask::new("* * * * *", "ping", None, 0).unwrap();
    state.scheduler.add(task.clone());
    state.tick_scheduler(&outbox);
    assert_eq!(state.pending.len(), 0); // nothing due yet on a freshly-added scheduler
    state.pending.push(task);

    run_to_completion(&mut state, &mut gate_rx, &mut result_rx, &outbox).await;
    run_to_completion(&mut state, &mut gate_rx, &mut result_rx, &outbox).await;

    let responses: Vec<_> = sink.messages().into_iter().filter(|m| matches!(m, AgentMessage::Response { .. })).collect();
    assert!(responses.iter().any(|m| matches!(m, AgentMessage::Response { result, .. } if result == "busy work")));
    assert!(responses.iter().any(|m| matches!(m, AgentMessage::Response { result, .. } if result == "⏰ [* * * * *] pong")));
}

#[tokio::test]
async fn s6_stale_session_recovers_and_persists_the_new_id() {
    let sdk = Arc::new(FakeSdkClient::new(vec![
        vec![ScriptStep::Emit(SdkEvent::Result(SdkTurnResult::Error { messages: vec!["Session not found".into()], session_id: None, cost_usd: None }))],
        vec![ScriptStep::Emit(SdkEvent::Result(SdkTurnResult::Success { text: "recovered".into(), session_id: Some("s2".into()), cost_usd: None, num_turns: None, usage: None }))],
    ]));
    let (mut state, mut gate_rx, mut result_rx) = harness(sdk.clone());
    state.session = SessionState::with_id(vibecheck_core::SessionId::new("old"));
    let sink = Sink::new();
    let outbox: Arc<dyn Outbox> = sink.clone();

    state.handle_server_message(query("hi"), &outbox);
    run_to_completion(&mut state, &mut gate_rx, &mut result_rx, &outbox).await;

    assert_eq!(sdk.call_count(), 2);
    assert_eq!(state.session.id().unwrap().as_str(), "s2");
    assert!(sink.messages().iter().any(|m| matches!(m, AgentMessage::Response { result, .. } if result == "recovered")));
}
