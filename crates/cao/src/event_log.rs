// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL event log of terminal status transitions. Used for
//! post-hoc debugging of a running server — explicitly NOT a durability
//! mechanism: the log is never replayed on restart.

use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::registry::Status;

/// A serialized terminal status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub terminal_id: String,
    pub from: String,
    pub to: String,
    pub seq: u64,
    pub timestamp_ms: u64,
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// File-backed append-only event log.
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// Create a new event log writing to `dir/events.jsonl`. If `dir` is
    /// `None`, the log is a no-op (used by tests).
    pub fn new(dir: Option<&std::path::Path>) -> Self {
        let path = dir.map(|dir| {
            let _ = std::fs::create_dir_all(dir);
            dir.join("events.jsonl")
        });
        Self { path }
    }

    /// Append a status transition entry to the log file.
    pub fn push_transition(&self, terminal_id: &str, from: Status, to: Status, seq: u64) {
        let Some(ref path) = self.path else { return };
        let entry = TransitionEntry {
            terminal_id: terminal_id.to_string(),
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            seq,
            timestamp_ms: now_ms(),
        };
        let Ok(mut line) = serde_json::to_string(&entry) else { return };
        line.push('\n');
        let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = file.write_all(line.as_bytes());
    }
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod tests;
