use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Messages the relay server sends to the agent.
///
/// Unknown `type` values deserialize to neither variant and are dropped by
/// the dispatcher at the decode boundary (see `decode_inbound`) rather than
/// failing the whole frame, per the forward-compatibility requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "query")]
    Query {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skill_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        system_prompt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agents: Option<HashMap<String, serde_json::Value>>,
    },
    #[serde(rename = "approval")]
    Approval {
        approved: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permanent: Option<bool>,
    },
    #[serde(rename = "add_trusted_path")]
    AddTrustedPath { path: String },
    #[serde(rename = "interrupt")]
    Interrupt {},
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "session_info")]
    SessionInfo { session_id: Option<String>, source: SessionInfoSource },
    #[serde(rename = "skill_list")]
    SkillList {},
    #[serde(rename = "schedule_add")]
    ScheduleAdd {
        cron: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skill_id: Option<String>,
    },
    #[serde(rename = "schedule_remove")]
    ScheduleRemove { id: String },
    #[serde(rename = "schedule_toggle")]
    ScheduleToggle { id: String, enabled: bool },
    #[serde(rename = "schedule_list")]
    ScheduleList {},
    #[serde(rename = "error")]
    Error { message: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionInfoSource {
    Server,
    Agent,
}

/// Decode one inbound frame. Returns `Ok(None)` for a frame whose `type` is
/// unrecognized (forward compatibility) and `Err` only for frames that are
/// not valid JSON objects at all.
pub fn decode_inbound(raw: &str) -> serde_json::Result<Option<ServerMessage>> {
    match serde_json::from_str::<ServerMessage>(raw) {
        Ok(msg) => Ok(Some(msg)),
        Err(e) => {
            // Distinguish "unknown tag" (ignore) from genuinely malformed JSON (propagate).
            let value: serde_json::Value = serde_json::from_str(raw)?;
            if value.get("type").is_some() {
                Ok(None)
            } else {
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "server_to_agent_tests.rs"]
mod tests;
