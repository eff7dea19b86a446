//! The owner task: holds every piece of mutable agent state and is the only
//! thing that ever touches it. Everything else — the in-flight query, the
//! tool-permission gate, the ping timer, the scheduler tick — talks to it
//! over a channel instead of sharing memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use vibecheck_core::{
    ApprovalOutcome, Clock, ExecuteResult, PendingTaskQueue, ScheduledTask, SessionState, SkillTable,
};
use vibecheck_wire::{AgentMessage, ImageData, ServerMessage, SessionInfoSource};

use crate::env::IMAGE_SNAPSHOT_TIMEOUT;
use crate::executor::{ExecuteOutcome, ExecuteRequest, Executor, ExecutorEvent};
use crate::scheduler::Scheduler;
use crate::sdk::{ClaudeSdkClient, ToolGate};
use crate::security::{SecurityMediator, ToolDecision};
use crate::tool_labels::label_for;
use crate::workspace_observer::{self, ImageSnapshot, ScreenshotCollaborator};

pub const BUSY_MESSAGE: &str = "이전 작업이 아직 실행 중입니다. 잠시 기다려주세요.";
pub const INTERRUPTED_MESSAGE: &str = "⏹️ 작업이 중단되었습니다. 다음 메시지를 기다리는 중...";
pub const APPROVAL_ABORT_REASON: &str = "Operation aborted";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Where the dispatcher sends outbound protocol messages: the live
/// WebSocket in production, an in-memory sink in tests.
pub trait Outbox: Send + Sync {
    fn send(&self, message: AgentMessage);
}

pub struct GateRequest {
    pub tool_name: String,
    pub input: serde_json::Value,
    pub respond_to: oneshot::Sender<GateDecision>,
}

pub enum GateDecision {
    Allow,
    Pending(oneshot::Receiver<ApprovalOutcome>),
}

pub enum GateMessage {
    Request(GateRequest),
    AbortPending,
}

/// `ToolGate` handed to the executor. Every check is relayed to the owner
/// task; this struct holds no state of its own beyond the channel.
pub struct ChannelGate {
    channel: mpsc::UnboundedSender<GateMessage>,
}

impl ChannelGate {
    pub fn new(channel: mpsc::UnboundedSender<GateMessage>) -> Self {
        Self { channel }
    }
}

#[async_trait::async_trait]
impl ToolGate for ChannelGate {
    async fn can_use_tool(&self, tool_name: &str, input: &serde_json::Value, cancel: CancellationToken) -> bool {
        let (tx, rx) = oneshot::channel();
        let request = GateRequest { tool_name: tool_name.to_string(), input: input.clone(), respond_to: tx };
        if self.channel.send(GateMessage::Request(request)).is_err() {
            return false;
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = self.channel.send(GateMessage::AbortPending);
                false
            }
            decision = rx => match decision {
                Ok(GateDecision::Allow) => true,
                Ok(GateDecision::Pending(approval_rx)) => tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        let _ = self.channel.send(GateMessage::AbortPending);
                        false
                    }
                    outcome = approval_rx => outcome.map(|o| o.allow).unwrap_or(false),
                },
                Err(_) => false,
            },
        }
    }
}

/// The result of one finished query, reported back from the spawned query
/// task to the owner loop.
pub struct QueryFinished {
    pub session: SessionState,
    pub outcome: ExecuteOutcome,
    pub before_images: ImageSnapshot,
    pub user_message: String,
    /// Set when this query was a cron firing rather than an interactive one.
    pub scheduled: Option<ScheduledTask>,
}

pub struct AgentState<C: ClaudeSdkClient, Clk: Clock> {
    pub work_dir: PathBuf,
    pub clock: Clk,
    pub session: SessionState,
    pub security: SecurityMediator,
    pub skills: SkillTable,
    pub slot: vibecheck_core::ExecutionSlot,
    pub pending: PendingTaskQueue<ScheduledTask>,
    pub scheduler: Scheduler,
    pub executor: Arc<Executor<C>>,
    pub screenshot: Arc<dyn ScreenshotCollaborator>,
    pub gate_tx: mpsc::UnboundedSender<GateMessage>,
    pub query_result_tx: mpsc::UnboundedSender<QueryFinished>,
    pub state_dir: PathBuf,
}

impl<C: ClaudeSdkClient + 'static, Clk: Clock + 'static> AgentState<C, Clk> {
    /// Handle one inbound server frame.
    pub fn handle_server_message(&mut self, msg: ServerMessage, outbox: &Arc<dyn Outbox>) {
        match msg {
            ServerMessage::Query { message, model, skill_id, system_prompt, agents } => {
                self.start_query(message, model, skill_id, system_prompt, agents, None, outbox);
            }
            ServerMessage::Interrupt {} => self.handle_interrupt(outbox),
            ServerMessage::Approval { approved, permanent } => {
                self.security.resolve_approval(approved, permanent.unwrap_or(false));
            }
            ServerMessage::AddTrustedPath { path } => self.security.add_trusted_path(path),
            ServerMessage::SessionInfo { session_id, source } => self.handle_session_info(session_id, source),
            ServerMessage::Ping => outbox.send(AgentMessage::Pong),
            ServerMessage::Pong => {}
            ServerMessage::SkillList {} => {
                outbox.send(AgentMessage::SkillListResponse { skills: self.skills.all().to_vec() });
            }
            ServerMessage::ScheduleAdd { cron, message, skill_id } => self.handle_schedule_add(cron, message, skill_id, outbox),
            ServerMessage::ScheduleRemove { id } => {
                self.scheduler.remove(&id);
                self.persist_schedule();
            }
            ServerMessage::ScheduleToggle { id, enabled } => {
                self.scheduler.set_enabled(&id, enabled);
                self.persist_schedule();
            }
            ServerMessage::ScheduleList {} => {
                outbox.send(AgentMessage::ScheduleListResponse { tasks: self.scheduler.tasks().to_vec() });
            }
            ServerMessage::Error { message } => warn!(%message, "relay server reported an error"),
        }
    }

    fn handle_session_info(&mut self, session_id: Option<String>, source: SessionInfoSource) {
        if source != SessionInfoSource::Server {
            return;
        }
        if self.session.id().is_some() {
            return;
        }
        if let Some(id) = session_id {
            self.session.adopt(vibecheck_core::SessionId::new(id));
            self.persist_session();
        }
    }

    fn handle_schedule_add(&mut self, cron: String, message: String, skill_id: Option<String>, outbox: &Arc<dyn Outbox>) {
        match ScheduledTask::new(cron, message, skill_id, self.clock.epoch_ms()) {
            Ok(task) => {
                self.scheduler.add(task.clone());
                self.persist_schedule();
                outbox.send(AgentMessage::schedule_add_ok(task));
            }
            Err(e) => outbox.send(AgentMessage::schedule_add_err(e.to_string())),
        }
    }

    fn handle_interrupt(&mut self, outbox: &Arc<dyn Outbox>) {
        if !self.slot.is_busy() {
            return;
        }
        if self.executor.interrupt_current() {
            outbox.send(AgentMessage::response(INTERRUPTED_MESSAGE));
        }
    }

    /// Poll the scheduler and either run or enqueue whatever just came due.
    pub fn tick_scheduler(&mut self, outbox: &Arc<dyn Outbox>) {
        let due = self.scheduler.poll_due(self.clock.epoch_ms());
        for task in due {
            if self.slot.is_busy() {
                self.pending.push(task);
            } else {
                self.run_scheduled(task, outbox);
            }
        }
    }

    fn run_scheduled(&mut self, task: ScheduledTask, outbox: &Arc<dyn Outbox>) {
        let skill_id = task.skill_id.clone();
        self.start_query(task.message.clone(), None, skill_id, None, None, Some(task), outbox);
    }

    #[allow(clippy::too_many_arguments)]
    fn start_query(
        &mut self,
        message: String,
        model: Option<String>,
        skill_id: Option<String>,
        system_prompt: Option<String>,
        agents: Option<std::collections::HashMap<String, serde_json::Value>>,
        scheduled: Option<ScheduledTask>,
        outbox: &Arc<dyn Outbox>,
    ) {
        if self.slot.is_busy() {
            outbox.send(AgentMessage::response(BUSY_MESSAGE));
            return;
        }
        self.slot.try_acquire();

        let skill = skill_id.as_deref().and_then(|id| self.skills.find(id)).cloned();
        let request = ExecuteRequest { message: message.clone(), model, skill, system_prompt, agents };
        let session = std::mem::take(&mut self.session);
        let executor = self.executor.clone();
        let gate = Arc::new(ChannelGate::new(self.gate_tx.clone()));
        let work_dir = self.work_dir.clone();
        let events_outbox = outbox.clone();
        let result_tx = self.query_result_tx.clone();

        tokio::spawn(async move {
            let before_images = workspace_observer::snapshot_images(&work_dir, IMAGE_SNAPSHOT_TIMEOUT).await;
            let mut session = session;
            let outcome = executor
                .execute(&work_dir, &mut session, request, gate, |event| match event {
                    ExecutorEvent::StreamingChunk { delta, index } => {
                        events_outbox.send(AgentMessage::StreamingChunk { delta, index });
                    }
                    ExecutorEvent::ToolStatus { tool, status, detail } => {
                        let label = label_for(&tool, status);
                        events_outbox.send(AgentMessage::ToolStatus { tool, status, label, detail });
                    }
                })
                .await;
            let _ = result_tx.send(QueryFinished { session, outcome, before_images, user_message: message, scheduled });
        });
    }

    /// Handle a `GateMessage` relayed from the in-flight query's tool gate.
    pub fn handle_gate_message(&mut self, msg: GateMessage, outbox: &Arc<dyn Outbox>) {
        match msg {
            GateMessage::Request(req) => match self.security.evaluate(&req.tool_name, &req.input) {
                ToolDecision::Allow => {
                    let _ = req.respond_to.send(GateDecision::Allow);
                }
                ToolDecision::RequiresApproval { paths, message } => {
                    let path_strings = paths.iter().map(|p| p.display().to_string()).collect();
                    let rx = self.security.begin_approval(req.tool_name, req.input, paths);
                    outbox.send(AgentMessage::ApprovalRequired { paths: path_strings, message });
                    let _ = req.respond_to.send(GateDecision::Pending(rx));
                }
            },
            GateMessage::AbortPending => self.security.abort_pending(APPROVAL_ABORT_REASON),
        }
    }

    /// Handle the result of a finished (or aborted) query, then drain one
    /// pending task if the slot is now free.
    pub async fn handle_query_finished(&mut self, finished: QueryFinished, outbox: &Arc<dyn Outbox>) {
        self.session = finished.session;
        self.slot.release();

        match finished.outcome {
            ExecuteOutcome::Aborted => {
                // handleInterrupt has already sent its own response.
            }
            ExecuteOutcome::Finished(result) => {
                if let Some(task) = finished.scheduled {
                    let preview: String = result.text.chars().take(200).collect();
                    self.scheduler.record_run(&task.id, self.clock.epoch_ms(), preview);
                    self.persist_schedule();
                    outbox.send(AgentMessage::response(format!("⏰ [{}] {}", task.cron, result.text)));
                } else {
                    let images = self.collect_images(&finished.user_message, &finished.before_images, &result.text).await;
                    outbox.send(response_with_images(result, images));
                }
                self.persist_session();
            }
        }

        if let Some(task) = self.pending.pop() {
            self.run_scheduled(task, outbox);
        }
    }

    async fn collect_images(&self, user_message: &str, before: &ImageSnapshot, response_text: &str) -> Vec<ImageData> {
        let mut images = Vec::new();

        if workspace_observer::mentions_screenshot(user_message) {
            if let Some(bytes) = self.screenshot.capture(&self.work_dir).await {
                images.push(ImageData { filename: "screenshot.png".to_string(), data: base64::engine::general_purpose::STANDARD.encode(bytes) });
            }
        }

        let budget = workspace_observer::remaining_image_budget(images.len());
        if budget > 0 {
            let after = workspace_observer::snapshot_images(&self.work_dir, IMAGE_SNAPSHOT_TIMEOUT).await;
            for path in workspace_observer::diff_images(before, &after, budget) {
                if let Some(image) = read_image(&path) {
                    images.push(image);
                }
            }
        }

        let budget = workspace_observer::remaining_image_budget(images.len());
        if images.is_empty() && budget > 0 {
            for path in paths_mentioned_in_text(response_text, &self.work_dir).into_iter().take(budget) {
                if let Some(image) = read_image(&path) {
                    images.push(image);
                }
            }
        }

        images
    }

    fn persist_session(&self) {
        let Some(id) = self.session.id() else { return };
        if let Err(e) = vibecheck_storage::save_session_id(&self.state_dir, &self.work_dir, id, self.clock.epoch_ms()) {
            warn!(error = %e, "failed to persist session id");
        }
    }

    fn persist_schedule(&self) {
        if let Err(e) = vibecheck_storage::save_tasks(&self.state_dir, self.scheduler.tasks()) {
            warn!(error = %e, "failed to persist scheduled tasks");
        }
    }
}

fn response_with_images(result: ExecuteResult, images: Vec<ImageData>) -> AgentMessage {
    AgentMessage::Response { result: result.text, images, cost_usd: result.cost_usd, num_turns: result.num_turns, usage: result.usage }
}

fn read_image(path: &Path) -> Option<ImageData> {
    let bytes = std::fs::read(path).ok()?;
    let filename = path.file_name()?.to_string_lossy().to_string();
    Some(ImageData { filename, data: base64::engine::general_purpose::STANDARD.encode(bytes) })
}

fn is_image_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str())).unwrap_or(false)
}

/// Scan free-form response text for tokens that look like image paths,
/// either absolute or relative to the working directory, and that exist on
/// disk. Last-resort fallback when neither the screenshot keyword nor the
/// mtime diff produced anything.
fn paths_mentioned_in_text(text: &str, work_dir: &Path) -> Vec<PathBuf> {
    text.split_whitespace()
        .map(|tok| tok.trim_matches(|c: char| matches!(c, '`' | '"' | '\'' | ',' | '.' | ')' | '(')))
        .filter_map(|tok| {
            let candidate = PathBuf::from(tok);
            let resolved = if candidate.is_absolute() { candidate } else { work_dir.join(candidate) };
            (is_image_extension(&resolved) && resolved.is_file()).then_some(resolved)
        })
        .collect()
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
