// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`crate::MuxAdapter`] for tests that never shells out.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{MuxAdapter, MuxError, MuxResult};

#[derive(Debug, Default, Clone)]
struct FakeSession {
    cwd: String,
    pane: String,
    injected: Vec<String>,
}

/// Scriptable fake multiplexer. Tests drive agent behavior by calling
/// [`FakeMuxAdapter::set_pane`] to simulate what the agent would have
/// printed in response to an injection.
#[derive(Debug, Default)]
pub struct FakeMuxAdapter {
    sessions: Mutex<HashMap<String, FakeSession>>,
}

impl FakeMuxAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the simulated pane contents for a session, as if the agent
    /// had printed something in response to the last injection.
    pub fn set_pane(&self, session_name: &str, contents: impl Into<String>) {
        if let Some(session) = self.sessions.lock().unwrap_or_else(|e| e.into_inner()).get_mut(session_name) {
            session.pane = contents.into();
        }
    }

    /// Append to the simulated pane contents.
    pub fn append_pane(&self, session_name: &str, contents: &str) {
        if let Some(session) = self.sessions.lock().unwrap_or_else(|e| e.into_inner()).get_mut(session_name) {
            session.pane.push_str(contents);
        }
    }

    /// Everything ever sent to a session via `send_keys`, in order.
    pub fn injected(&self, session_name: &str) -> Vec<String> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_name)
            .map(|s| s.injected.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MuxAdapter for FakeMuxAdapter {
    async fn create(
        &self,
        session_name: &str,
        cwd: &str,
        _initial_command: &[String],
        _env: &[(String, String)],
    ) -> MuxResult<()> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if sessions.contains_key(session_name) {
            return Err(MuxError::SessionExists(session_name.to_owned()));
        }
        sessions.insert(session_name.to_owned(), FakeSession { cwd: cwd.to_owned(), ..Default::default() });
        Ok(())
    }

    async fn send_keys(&self, session_name: &str, text: &str, append_enter: bool) -> MuxResult<()> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let session =
            sessions.get_mut(session_name).ok_or_else(|| MuxError::SessionMissing(session_name.to_owned()))?;
        let mut entry = text.to_owned();
        if append_enter {
            entry.push('\n');
        }
        session.injected.push(entry);
        Ok(())
    }

    async fn capture(&self, session_name: &str, tail_lines: usize) -> MuxResult<String> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let session =
            sessions.get(session_name).ok_or_else(|| MuxError::SessionMissing(session_name.to_owned()))?;
        let tail: Vec<&str> = session.pane.lines().rev().take(tail_lines).collect();
        Ok(tail.into_iter().rev().collect::<Vec<_>>().join("\n"))
    }

    async fn kill(&self, session_name: &str) -> MuxResult<()> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).remove(session_name);
        Ok(())
    }

    async fn exists(&self, session_name: &str) -> MuxResult<bool> {
        Ok(self.sessions.lock().unwrap_or_else(|e| e.into_inner()).contains_key(session_name))
    }

    async fn list(&self) -> MuxResult<Vec<String>> {
        Ok(self.sessions.lock().unwrap_or_else(|e| e.into_inner()).keys().cloned().collect())
    }
}
