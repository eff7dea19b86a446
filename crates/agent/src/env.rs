//! Centralized environment-variable access for the agent binary. CLI flags
//! take precedence over these; these are the defaults underneath them.

use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "wss://vibecheck.nestoz.co/ws/agent";
pub const PING_INTERVAL: Duration = Duration::from_secs(15);
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const IMAGE_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(2);
pub const SCREENSHOT_PORT_TIMEOUT: Duration = Duration::from_secs(30);
pub const SCREENSHOT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(15);
pub const MAX_IMAGES_PER_RESPONSE: usize = 5;

/// `VIBECHECK_LOG`, falling back to `RUST_LOG`, else "info".
pub fn log_filter() -> String {
    std::env::var("VIBECHECK_LOG").or_else(|_| std::env::var("RUST_LOG")).unwrap_or_else(|_| "info".to_string())
}

pub fn ping_interval() -> Duration {
    env_duration_ms("VIBECHECK_PING_INTERVAL_MS").unwrap_or(PING_INTERVAL)
}

pub fn reconnect_delay() -> Duration {
    env_duration_ms("VIBECHECK_RECONNECT_DELAY_MS").unwrap_or(RECONNECT_DELAY)
}

fn env_duration_ms(key: &str) -> Option<Duration> {
    std::env::var(key).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
