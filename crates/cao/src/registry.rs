// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal Registry: the sole mutator of terminal status.
//!
//! Guarded by a single `tokio::sync::RwLock`: every mutation is O(1) and
//! never held across mux I/O or a blocking wait.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Opaque, stable, never-reused terminal identifier.
pub type TerminalId = String;

/// Lifecycle status of a managed terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Starting,
    Idle,
    Busy,
    Completed,
    Error,
    Dead,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "STARTING",
            Self::Idle => "IDLE",
            Self::Busy => "BUSY",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
            Self::Dead => "DEAD",
        }
    }

    /// Whether `self -> next` is a legal edge in the FSM.
    fn can_transition_to(self, next: Status) -> bool {
        use Status::*;
        matches!(
            (self, next),
            (Starting, Idle)
                | (Starting, Error)
                | (Starting, Dead)
                | (Idle, Busy)
                | (Idle, Error)
                | (Idle, Dead)
                | (Busy, Idle)
                | (Busy, Completed)
                | (Busy, Error)
                | (Busy, Dead)
                | (Completed, Dead)
                | (Error, Dead)
        )
    }
}

/// A pending inter-terminal message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub from_id: TerminalId,
    pub to_id: TerminalId,
    pub body: String,
    pub enqueued_at: DateTime<Utc>,
    pub kind: MessageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    System,
    Result,
}

/// Authoritative per-terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalState {
    pub id: TerminalId,
    pub session_name: String,
    pub agent_profile: String,
    pub provider: String,
    pub cwd: String,
    pub status: Status,
    #[serde(skip)]
    pub inbox: VecDeque<Message>,
    pub current_task: Option<String>,
    pub parent_id: Option<TerminalId>,
    pub created_at: DateTime<Utc>,
    pub last_status_at: DateTime<Utc>,
    /// Monotonic counter bumped on every status change; lets long-pollers
    /// and the Bus detect the Nth idle edge without racing on timestamps.
    pub status_seq: u64,
    /// The exact text of the most recent injected line, used by the Reader
    /// to exclude echoed input from marker matching.
    #[serde(skip)]
    pub last_injected_line: Option<String>,
}

/// Error returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NotFound,
    InvalidTransition { from: Status, to: Status },
    Dead,
}

pub struct NewTerminal {
    pub agent_profile: String,
    pub provider: String,
    pub cwd: String,
    pub session_name: String,
    pub parent_id: Option<TerminalId>,
}

/// The id -> TerminalState mapping. All reads and writes go through the
/// single internal lock.
#[derive(Default)]
pub struct Registry {
    terminals: RwLock<HashMap<TerminalId, TerminalState>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new terminal id and record it as `STARTING`. Does not
    /// talk to the mux — that is the Orchestrator's job.
    pub async fn new_terminal(&self, spec: NewTerminal) -> TerminalId {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let state = TerminalState {
            id: id.clone(),
            session_name: spec.session_name,
            agent_profile: spec.agent_profile,
            provider: spec.provider,
            cwd: spec.cwd,
            status: Status::Starting,
            inbox: VecDeque::new(),
            current_task: None,
            parent_id: spec.parent_id,
            created_at: now,
            last_status_at: now,
            status_seq: 0,
            last_injected_line: None,
        };
        self.terminals.write().await.insert(id.clone(), state);
        debug!(terminal_id = %id, "terminal registered");
        id
    }

    pub async fn get(&self, id: &str) -> Result<TerminalState, RegistryError> {
        self.terminals.read().await.get(id).cloned().ok_or(RegistryError::NotFound)
    }

    pub async fn list(&self) -> Vec<TerminalState> {
        self.terminals.read().await.values().cloned().collect()
    }

    /// Apply `new_status`, enforcing the FSM. Rejects illegal transitions
    /// without mutating anything.
    pub async fn update_status(&self, id: &str, new_status: Status) -> Result<TerminalState, RegistryError> {
        let mut terminals = self.terminals.write().await;
        let terminal = terminals.get_mut(id).ok_or(RegistryError::NotFound)?;
        if terminal.status == new_status {
            return Ok(terminal.clone());
        }
        if !terminal.status.can_transition_to(new_status) {
            warn!(terminal_id = id, from = terminal.status.as_str(), to = new_status.as_str(), "rejected illegal transition");
            return Err(RegistryError::InvalidTransition { from: terminal.status, to: new_status });
        }
        terminal.status = new_status;
        terminal.last_status_at = Utc::now();
        terminal.status_seq += 1;
        debug!(terminal_id = id, to = new_status.as_str(), seq = terminal.status_seq, "status transition");
        Ok(terminal.clone())
    }

    pub async fn set_current_task(&self, id: &str, task: Option<String>) -> Result<(), RegistryError> {
        let mut terminals = self.terminals.write().await;
        let terminal = terminals.get_mut(id).ok_or(RegistryError::NotFound)?;
        terminal.current_task = task;
        Ok(())
    }

    /// Record the most recently injected line, consulted by the Reader's
    /// echo tie-break.
    pub async fn set_last_injected_line(&self, id: &str, line: Option<String>) -> Result<(), RegistryError> {
        let mut terminals = self.terminals.write().await;
        let terminal = terminals.get_mut(id).ok_or(RegistryError::NotFound)?;
        terminal.last_injected_line = line;
        Ok(())
    }

    /// Append a message to `id`'s inbox. Fails if the terminal is `DEAD` or
    /// `COMPLETED` (the latter is already en route to teardown).
    pub async fn enqueue(&self, message: Message) -> Result<(), RegistryError> {
        let mut terminals = self.terminals.write().await;
        let terminal = terminals.get_mut(&message.to_id).ok_or(RegistryError::NotFound)?;
        if matches!(terminal.status, Status::Dead | Status::Completed) {
            return Err(RegistryError::Dead);
        }
        terminal.inbox.push_back(message);
        Ok(())
    }

    /// Pop the head of `id`'s inbox iff its status is `IDLE`.
    pub async fn pop_ready(&self, id: &str) -> Result<Option<Message>, RegistryError> {
        let mut terminals = self.terminals.write().await;
        let terminal = terminals.get_mut(id).ok_or(RegistryError::NotFound)?;
        if terminal.status != Status::Idle {
            return Ok(None);
        }
        Ok(terminal.inbox.pop_front())
    }

    /// Mark `id` as `DEAD` and drop its inbox. Best-effort: a terminal that
    /// cannot legally transition to `DEAD` from its current status (there
    /// is no such status) never occurs, since every status can reach `DEAD`.
    pub async fn remove(&self, id: &str) -> Result<(), RegistryError> {
        let mut terminals = self.terminals.write().await;
        let terminal = terminals.get_mut(id).ok_or(RegistryError::NotFound)?;
        terminal.status = Status::Dead;
        terminal.last_status_at = Utc::now();
        terminal.status_seq += 1;
        terminal.inbox.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
