use serde::{Deserialize, Serialize};

use vibecheck_core::{ExecuteResult, ScheduledTask, Skill, TokenUsage};

use crate::image::ImageData;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatusKind {
    Start,
    End,
}

/// Messages the agent sends to the relay server (and onward to the UI).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AgentMessage {
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "response")]
    Response {
        result: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        images: Vec<ImageData>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost_usd: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        num_turns: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },
    #[serde(rename = "streaming_chunk")]
    StreamingChunk { delta: String, index: u64 },
    #[serde(rename = "tool_status")]
    ToolStatus {
        tool: String,
        status: ToolStatusKind,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    #[serde(rename = "approval_required")]
    ApprovalRequired { paths: Vec<String>, message: String },
    #[serde(rename = "session_sync")]
    SessionSync { work_dir: String, session_id: Option<String> },
    #[serde(rename = "session_update")]
    SessionUpdate { work_dir: String, session_id: String },
    #[serde(rename = "skill_list_response")]
    SkillListResponse { skills: Vec<Skill> },
    #[serde(rename = "schedule_list_response")]
    ScheduleListResponse { tasks: Vec<ScheduledTask> },
    #[serde(rename = "schedule_add_response")]
    ScheduleAddResponse {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task: Option<ScheduledTask>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl AgentMessage {
    pub fn response(result: impl Into<String>) -> Self {
        Self::Response { result: result.into(), images: Vec::new(), cost_usd: None, num_turns: None, usage: None }
    }

    /// Build a `response` from an `ExecuteResult`, before any images are attached.
    pub fn from_execute_result(result: ExecuteResult) -> Self {
        Self::Response {
            result: result.text,
            images: Vec::new(),
            cost_usd: result.cost_usd,
            num_turns: result.num_turns,
            usage: result.usage,
        }
    }

    pub fn schedule_add_ok(task: ScheduledTask) -> Self {
        Self::ScheduleAddResponse { success: true, task: Some(task), error: None }
    }

    pub fn schedule_add_err(error: impl Into<String>) -> Self {
        Self::ScheduleAddResponse { success: false, task: None, error: Some(error.into()) }
    }
}

#[cfg(test)]
#[path = "agent_to_server_tests.rs"]
mod tests;
