// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vibecheck_agent::connection;
use vibecheck_agent::dispatch::AgentState;
use vibecheck_agent::error::AgentError;
use vibecheck_agent::scheduler::Scheduler;
use vibecheck_agent::sdk_process::ProcessSdkClient;
use vibecheck_agent::security::SecurityMediator;
use vibecheck_agent::skills::default_skill_table;
use vibecheck_agent::workspace_observer::NullScreenshotCollaborator;
use vibecheck_core::{AgentConfig, ExecutionSlot, PendingTaskQueue, SessionState, SystemClock};
use vibecheck_storage::{load_session_id, load_tasks, state_dir};

#[derive(Parser, Debug)]
#[command(name = "vibecheck-agent", about = "Bridges a local Claude Code session to the VibeCheck relay server")]
struct Cli {
    /// API key used to authenticate with the relay server.
    #[arg(long)]
    key: String,

    /// Working directory the assistant operates in. Defaults to the
    /// current directory.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Relay server WebSocket URL.
    #[arg(long, default_value = vibecheck_agent::env::DEFAULT_SERVER_URL)]
    server: String,

    /// Ignore any persisted session id and start fresh.
    #[arg(long)]
    new_session: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(vibecheck_agent::env::log_filter())).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "agent exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AgentError> {
    let cli = Cli::parse();

    let dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| AgentError::Args(format!("could not resolve current directory: {e}")))?,
    };

    if !dir.exists() {
        return Err(AgentError::WorkDirMissing(dir));
    }
    if !dir.is_dir() {
        return Err(AgentError::WorkDirNotADirectory(dir));
    }
    let work_dir = dir.canonicalize().unwrap_or(dir);

    let config = AgentConfig::new(cli.key, work_dir.clone(), cli.server, cli.new_session);
    let state_dir = state_dir()?;
    std::fs::create_dir_all(&state_dir).map_err(|source| vibecheck_storage::StorageError::Io { path: state_dir.clone(), source })?;

    let session = if config.new_session {
        SessionState::new()
    } else {
        match load_session_id(&state_dir, &work_dir) {
            Ok(Some(id)) => SessionState::with_id(id),
            Ok(None) => SessionState::new(),
            Err(e) => {
                info!(error = %e, "no usable persisted session, starting fresh");
                SessionState::new()
            }
        }
    };

    let tasks = load_tasks(&state_dir).unwrap_or_default();

    let (gate_tx, gate_rx) = mpsc::unbounded_channel();
    let (result_tx, result_rx) = mpsc::unbounded_channel();

    let state = AgentState {
        work_dir: work_dir.clone(),
        clock: SystemClock,
        session,
        security: SecurityMediator::new(work_dir.clone()),
        skills: default_skill_table(),
        slot: ExecutionSlot::new(),
        pending: PendingTaskQueue::new(),
        scheduler: Scheduler::new(tasks),
        executor: Arc::new(vibecheck_agent::executor::Executor::new(Arc::new(ProcessSdkClient::new()))),
        screenshot: Arc::new(NullScreenshotCollaborator),
        gate_tx,
        query_result_tx: result_tx,
        state_dir,
    };

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    connection::run(config, state, gate_rx, result_rx, shutdown).await;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler, watching ctrl-c only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
