// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message Bus: a thin set of free functions operating on the
//! Registry and Injector rather than a separate actor.

use std::sync::Arc;

use cao_mux::MuxAdapter;
use tracing::debug;

use crate::reader;
use crate::registry::{Message, Registry, RegistryError, Status};

/// Result of a `send_message` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Queued,
    Delivered,
}

/// Enqueue `message` into the recipient's inbox. If the recipient is
/// currently `IDLE`, immediately deliver it through the same status-edge
/// mechanism used by the poller.
pub async fn send_message(
    registry: &Registry,
    mux: &dyn MuxAdapter,
    message: Message,
) -> Result<SendOutcome, RegistryError> {
    let to_id = message.to_id.clone();
    registry.enqueue(message).await?;

    let terminal = registry.get(&to_id).await?;
    if terminal.status == Status::Idle {
        deliver_on_idle_edge(registry, mux, &to_id).await?;
        return Ok(SendOutcome::Delivered);
    }
    Ok(SendOutcome::Queued)
}

/// Called whenever the Registry observes a `* -> IDLE` transition. Pops at
/// most one message from the head of the inbox and injects it, returning
/// the terminal to `BUSY`. A no-op if the inbox is empty.
pub async fn deliver_on_idle_edge(
    registry: &Registry,
    mux: &dyn MuxAdapter,
    terminal_id: &str,
) -> Result<bool, RegistryError> {
    let Some(message) = registry.pop_ready(terminal_id).await? else {
        return Ok(false);
    };
    let terminal = registry.get(terminal_id).await?;
    debug!(terminal_id = %terminal_id, from = %message.from_id, "delivering queued message");

    if reader::inject_task(registry, mux, &terminal.session_name, terminal_id, &message.body)
        .await
        .is_ok()
    {
        let _ = registry.update_status(terminal_id, Status::Busy).await;
    }
    Ok(true)
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
