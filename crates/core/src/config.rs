//! Immutable per-process agent configuration, assembled once at startup.

use std::path::PathBuf;

/// Everything the agent needs to know for the lifetime of the process.
///
/// Built once from CLI flags layered over environment defaults and never
/// mutated afterward; clone freely, it is cheap.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub work_dir: PathBuf,
    pub server_url: String,
    pub new_session: bool,
}

impl AgentConfig {
    pub fn new(api_key: impl Into<String>, work_dir: PathBuf, server_url: impl Into<String>, new_session: bool) -> Self {
        Self { api_key: api_key.into(), work_dir, server_url: server_url.into(), new_session }
    }

    /// The `<serverURL>?key=<apiKey>` connection URL.
    pub fn connect_url(&self) -> String {
        let mut url = self.server_url.clone();
        if url.contains('?') {
            url.push('&');
        } else {
            url.push('?');
        }
        url.push_str("key=");
        url.push_str(&self.api_key);
        url
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
