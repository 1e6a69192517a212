// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform interface over a terminal multiplexer.
//!
//! The orchestrator never shells out to `tmux` directly — every create,
//! send-keys, capture, kill and list goes through a [`MuxAdapter`]. This
//! keeps the injection/readback protocol (`cao::reader`) testable against
//! [`fake::FakeMuxAdapter`] without a real terminal multiplexer present.

pub mod error;
pub mod fake;
pub mod tmux;

pub use error::{MuxError, MuxResult};

use async_trait::async_trait;

/// A named, running multiplexer session.
pub type SessionName = String;

#[async_trait]
pub trait MuxAdapter: Send + Sync {
    /// Start a detached session named `session_name` running `initial_command`
    /// under `cwd`. Fails with [`MuxError::SessionExists`] if the name is
    /// already taken.
    async fn create(
        &self,
        session_name: &str,
        cwd: &str,
        initial_command: &[String],
        env: &[(String, String)],
    ) -> MuxResult<()>;

    /// Submit `text` to the session, optionally followed by Enter.
    async fn send_keys(&self, session_name: &str, text: &str, append_enter: bool) -> MuxResult<()>;

    /// Capture the last `tail_lines` of the session's pane.
    async fn capture(&self, session_name: &str, tail_lines: usize) -> MuxResult<String>;

    /// Terminate the session.
    async fn kill(&self, session_name: &str) -> MuxResult<()>;

    /// Whether a session with this name is currently alive.
    async fn exists(&self, session_name: &str) -> MuxResult<bool>;

    /// List all live session names known to the multiplexer.
    async fn list(&self) -> MuxResult<Vec<String>>;
}

#[cfg(test)]
mod lib_tests;
