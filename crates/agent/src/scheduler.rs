//! Cron scheduler: reconciles the persisted task list against wall-clock
//! time and hands due tasks to the dispatcher, which competes them for the
//! single execution slot exactly like an interactive query.

use vibecheck_core::{next_fire_after, ScheduledTask};

pub const POLL_INTERVAL_SECS: u64 = 20;

pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
    last_checked_ms: Option<u64>,
}

impl Scheduler {
    pub fn new(tasks: Vec<ScheduledTask>) -> Self {
        Self { tasks, last_checked_ms: None }
    }

    pub fn tasks(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    pub fn add(&mut self, task: ScheduledTask) {
        self.tasks.push(task);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn record_run(&mut self, id: &str, at_ms: u64, result_preview: impl Into<String>) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.record_run(at_ms, result_preview);
        }
    }

    /// Tasks whose schedule has a fire time in `(since, now_ms]`, where
    /// `since` is the moment of the previous poll (or just before `now_ms`
    /// on the very first poll, so nothing fires retroactively at startup).
    pub fn poll_due(&mut self, now_ms: u64) -> Vec<ScheduledTask> {
        let since = self.last_checked_ms.unwrap_or(now_ms.saturating_sub(1));
        self.last_checked_ms = Some(now_ms);

        self.tasks
            .iter()
            .filter(|t| t.enabled)
            .filter(|t| matches!(next_fire_after(&t.cron, since), Some(fire_at) if fire_at <= now_ms))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
