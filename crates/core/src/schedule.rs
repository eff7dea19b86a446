//! Cron-driven scheduled prompts.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid cron expression: {0}")]
    InvalidCron(String),
}

/// A persisted cron-fired prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledTask {
    pub id: String,
    pub cron: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
    pub enabled: bool,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<String>,
}

impl ScheduledTask {
    /// Construct a new task, validating the cron expression at insertion
    /// time per the invariant that a `ScheduledTask` is never stored with a
    /// malformed schedule.
    pub fn new(
        cron: impl Into<String>,
        message: impl Into<String>,
        skill_id: Option<String>,
        created_at_ms: u64,
    ) -> Result<Self, ScheduleError> {
        let cron = cron.into();
        validate_cron(&cron)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            cron,
            message: message.into(),
            skill_id,
            enabled: true,
            created_at: created_at_ms,
            last_run: None,
            last_result: None,
        })
    }

    pub fn record_run(&mut self, at_ms: u64, result_preview: impl Into<String>) {
        self.last_run = Some(at_ms);
        self.last_result = Some(result_preview.into());
    }
}

/// Validate a 5-field cron expression. Rejects free-form phrases like
/// "every day" and anything the underlying cron parser cannot schedule.
pub fn validate_cron(expr: &str) -> Result<(), ScheduleError> {
    cron::Schedule::from_str(&normalize_for_cron_crate(expr))
        .map(|_| ())
        .map_err(|e| ScheduleError::InvalidCron(e.to_string()))
}

/// The `cron` crate expects a leading seconds field; the wire format here is
/// the conventional 5-field minute-hour-dom-month-dow expression, so prefix
/// a literal `0` seconds field before handing it to the parser.
fn normalize_for_cron_crate(expr: &str) -> String {
    format!("0 {expr}")
}

/// Compute the next fire time (as epoch milliseconds) strictly after `after_ms`.
pub fn next_fire_after(expr: &str, after_ms: u64) -> Option<u64> {
    use chrono::{TimeZone, Utc};
    let schedule = cron::Schedule::from_str(&normalize_for_cron_crate(expr)).ok()?;
    let after = Utc.timestamp_millis_opt(after_ms as i64).single()?;
    schedule.after(&after).next().map(|dt| dt.timestamp_millis() as u64)
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
