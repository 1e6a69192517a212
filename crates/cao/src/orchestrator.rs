// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator: `handoff`, `assign`, `send_message`, `shutdown`
//! on top of the Registry, Reader, and Bus. No orchestrator actor, just
//! async functions taking the shared `Store` components by reference.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use cao_mux::MuxAdapter;

use crate::bus;
use crate::error::{ApiError, ErrorCode};
use crate::provider;
use crate::reader::{self, poll_loop};
use crate::registry::{Message, MessageKind, NewTerminal, Registry, Status, TerminalId};

/// Outcome of a completed or failed `handoff`.
pub struct HandoffResult {
    pub terminal_id: TerminalId,
    pub output: String,
    pub failed: bool,
}

fn session_name(agent_profile: &str) -> String {
    let slug: String = agent_profile
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let nonce = Uuid::new_v4().simple().to_string();
    format!("cao-{slug}-{}", &nonce[..8])
}

/// Allocate a terminal, launch the provider command under the mux, and spawn
/// its Reader poll task. Returns once the mux session exists (not once idle).
pub(crate) async fn launch(
    registry: &Arc<Registry>,
    mux: &Arc<dyn MuxAdapter>,
    agent_profile: &str,
    provider_key: &str,
    cwd: &str,
    parent_id: Option<TerminalId>,
    poll_interval: Duration,
    idle_timeout: Duration,
    shutdown: &CancellationToken,
) -> Result<TerminalId, ApiError> {
    let name = session_name(agent_profile);
    let terminal_id = registry
        .new_terminal(NewTerminal {
            agent_profile: agent_profile.to_string(),
            provider: provider_key.to_string(),
            cwd: cwd.to_string(),
            session_name: name.clone(),
            parent_id,
        })
        .await;

    let profile = provider::lookup(provider_key);
    let env = vec![("CAO_TERMINAL_ID".to_string(), terminal_id.clone())];
    mux.create(&name, cwd, &profile.launch_command, &env)
        .await
        .map_err(|e| ApiError::from(e).with_terminal(terminal_id.clone()))?;

    let registry = registry.clone();
    let mux = mux.clone();
    let terminal_for_task = terminal_id.clone();
    let name_for_task = name.clone();
    let provider_for_task = provider_key.to_string();
    let reader_shutdown = shutdown.clone();
    tokio::spawn(async move {
        poll_loop(
            registry,
            mux,
            terminal_for_task,
            name_for_task,
            provider_for_task,
            poll_interval,
            idle_timeout,
            reader_shutdown,
        )
        .await;
    });

    Ok(terminal_id)
}

/// Poll the registry until `terminal_id` reaches one of `targets`, or
/// `timeout` elapses. On timeout, marks the terminal `ERROR`.
async fn await_status(
    registry: &Registry,
    terminal_id: &str,
    targets: &[Status],
    poll_interval: Duration,
    timeout: Duration,
) -> Result<Status, ApiError> {
    let wait = async {
        loop {
            let terminal = registry.get(terminal_id).await.map_err(|_| {
                ApiError::new(ErrorCode::NotFound, "terminal disappeared while waiting")
            })?;
            if targets.contains(&terminal.status) {
                return Ok(terminal.status);
            }
            tokio::time::sleep(poll_interval).await;
        }
    };

    match tokio::time::timeout(timeout, wait).await {
        Ok(result) => result,
        Err(_) => {
            let _ = registry.update_status(terminal_id, Status::Error).await;
            Err(ApiError::new(ErrorCode::Timeout, "timed out waiting for status transition")
                .with_terminal(terminal_id))
        }
    }
}

/// `handoff(from_id, agent_profile, provider?, body, cwd?)`.
#[allow(clippy::too_many_arguments)]
pub async fn handoff(
    registry: &Arc<Registry>,
    mux: &Arc<dyn MuxAdapter>,
    agent_profile: &str,
    provider_key: &str,
    body: &str,
    cwd: &str,
    poll_interval: Duration,
    idle_timeout: Duration,
    startup_timeout: Duration,
    handoff_timeout: Duration,
    shutdown: &CancellationToken,
) -> Result<HandoffResult, ApiError> {
    let terminal_id =
        launch(registry, mux, agent_profile, provider_key, cwd, None, poll_interval, idle_timeout, shutdown)
            .await?;

    if let Err(e) =
        await_status(registry, &terminal_id, &[Status::Idle], poll_interval, startup_timeout).await
    {
        warn!(terminal_id = %terminal_id, "launch failed to reach idle");
        return Err(ApiError::new(ErrorCode::LaunchFailure, e.message).with_terminal(terminal_id));
    }

    let terminal = registry.get(&terminal_id).await.map_err(|_| {
        ApiError::new(ErrorCode::Internal, "terminal vanished after reaching idle")
    })?;
    reader::inject_task(registry, mux.as_ref(), &terminal.session_name, &terminal_id, body)
        .await
        .map_err(ApiError::from)?;
    registry.update_status(&terminal_id, Status::Busy).await.map_err(|_| {
        ApiError::new(ErrorCode::Internal, "terminal vanished after injection")
    })?;

    let final_status = await_status(
        registry,
        &terminal_id,
        &[Status::Completed, Status::Error],
        poll_interval,
        handoff_timeout,
    )
    .await?;

    let terminal = registry.get(&terminal_id).await.map_err(|_| {
        ApiError::new(ErrorCode::Internal, "terminal vanished before output capture")
    })?;
    let pane = mux.capture(&terminal.session_name, 500).await.map_err(ApiError::from)?;
    let output = reader::extract_result(&pane, &terminal_id);

    if final_status == Status::Completed {
        let _ = mux.kill(&terminal.session_name).await;
        let _ = registry.remove(&terminal_id).await;
        info!(terminal_id = %terminal_id, "handoff completed, terminal killed");
        Ok(HandoffResult { terminal_id, output, failed: false })
    } else {
        info!(terminal_id = %terminal_id, "handoff failed, terminal left alive for inspection");
        Ok(HandoffResult { terminal_id, output, failed: true })
    }
}

/// `assign(from_id, agent_profile, provider?, body, cwd?, callback_terminal_id?)`
///. Returns immediately once the task has been injected; the new
/// terminal keeps running and reports back via `send_message` on its own.
#[allow(clippy::too_many_arguments)]
pub async fn assign(
    registry: &Arc<Registry>,
    mux: &Arc<dyn MuxAdapter>,
    from_id: &str,
    agent_profile: &str,
    provider_key: &str,
    body: &str,
    cwd: &str,
    callback_terminal_id: Option<&str>,
    poll_interval: Duration,
    idle_timeout: Duration,
    startup_timeout: Duration,
    shutdown: &CancellationToken,
) -> Result<TerminalId, ApiError> {
    let terminal_id =
        launch(registry, mux, agent_profile, provider_key, cwd, None, poll_interval, idle_timeout, shutdown)
            .await?;

    if let Err(e) =
        await_status(registry, &terminal_id, &[Status::Idle], poll_interval, startup_timeout).await
    {
        return Err(ApiError::new(ErrorCode::LaunchFailure, e.message).with_terminal(terminal_id));
    }

    let callback = callback_terminal_id.unwrap_or(from_id);
    let terminal = registry.get(&terminal_id).await.map_err(|_| {
        ApiError::new(ErrorCode::Internal, "terminal vanished after reaching idle")
    })?;
    let body_with_callback = format!(
        "{body}\n\nWhen this task is complete, call send_message(to={callback}, body=<result>) \
         to report back."
    );
    reader::inject_task(registry, mux.as_ref(), &terminal.session_name, &terminal_id, &body_with_callback)
        .await
        .map_err(ApiError::from)?;
    registry.update_status(&terminal_id, Status::Busy).await.map_err(|_| {
        ApiError::new(ErrorCode::Internal, "terminal vanished after injection")
    })?;

    Ok(terminal_id)
}

/// `send_message(from_id, to_id, body)`, delegating to the Bus.
pub async fn send_message(
    registry: &Registry,
    mux: &dyn MuxAdapter,
    from_id: &str,
    to_id: &str,
    body: &str,
    kind: MessageKind,
) -> Result<bus::SendOutcome, ApiError> {
    let message = Message {
        from_id: from_id.to_string(),
        to_id: to_id.to_string(),
        body: body.to_string(),
        enqueued_at: chrono::Utc::now(),
        kind,
    };
    bus::send_message(registry, mux, message).await.map_err(|e| match e {
        crate::registry::RegistryError::Dead => {
            ApiError::new(ErrorCode::DeadRecipient, "recipient is dead").with_terminal(to_id)
        }
        crate::registry::RegistryError::NotFound => {
            ApiError::new(ErrorCode::NotFound, "unknown terminal").with_terminal(to_id)
        }
        crate::registry::RegistryError::InvalidTransition { .. } => {
            ApiError::new(ErrorCode::Internal, "unexpected transition during delivery")
        }
    })
}

/// `shutdown(id)`: kill the mux session and mark the terminal dead.
pub async fn shutdown_one(registry: &Registry, mux: &dyn MuxAdapter, id: &str) -> Result<(), ApiError> {
    let terminal = registry.get(id).await.map_err(|_| ApiError::new(ErrorCode::NotFound, "unknown terminal"))?;
    let _ = mux.kill(&terminal.session_name).await;
    registry
        .remove(id)
        .await
        .map_err(|_| ApiError::new(ErrorCode::Internal, "terminal vanished during shutdown"))
}

/// `shutdown(all)`: kill every non-dead terminal.
pub async fn shutdown_all(registry: &Registry, mux: &dyn MuxAdapter) {
    for terminal in registry.list().await {
        if terminal.status != Status::Dead {
            let _ = mux.kill(&terminal.session_name).await;
            let _ = registry.remove(&terminal.id).await;
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
