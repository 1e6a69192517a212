// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tmux`-backed [`crate::MuxAdapter`]: every operation shells out to the
//! `tmux` binary on the host.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{MuxAdapter, MuxError, MuxResult};

/// Adapter that drives a real `tmux` installation.
#[derive(Debug, Clone)]
pub struct TmuxAdapter {
    /// Path or name of the `tmux` binary (overridable for testing against a
    /// stub script).
    binary: String,
}

impl Default for TmuxAdapter {
    fn default() -> Self {
        Self { binary: "tmux".to_owned() }
    }
}

impl TmuxAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    async fn run(&self, args: &[&str]) -> MuxResult<std::process::Output> {
        Command::new(&self.binary).args(args).output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MuxError::Unavailable(format!("{}: {e}", self.binary))
            } else {
                MuxError::ExecFailure(format!("{}: {e}", self.binary))
            }
        })
    }
}

#[async_trait]
impl MuxAdapter for TmuxAdapter {
    async fn create(
        &self,
        session_name: &str,
        cwd: &str,
        initial_command: &[String],
        env: &[(String, String)],
    ) -> MuxResult<()> {
        if self.exists(session_name).await? {
            return Err(MuxError::SessionExists(session_name.to_owned()));
        }

        let mut args: Vec<String> =
            vec!["new-session".into(), "-d".into(), "-s".into(), session_name.into(), "-c".into(), cwd.into()];
        for (key, value) in env {
            args.push("-e".into());
            args.push(format!("{key}={value}"));
        }
        if !initial_command.is_empty() {
            args.extend(initial_command.iter().cloned());
        }
        let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self.run(&args_ref).await?;
        if !output.status.success() {
            warn!(session = session_name, stderr = %String::from_utf8_lossy(&output.stderr), "tmux new-session failed");
            return Err(MuxError::ExecFailure(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        debug!(session = session_name, "tmux session created");
        Ok(())
    }

    async fn send_keys(&self, session_name: &str, text: &str, append_enter: bool) -> MuxResult<()> {
        if !self.exists(session_name).await? {
            return Err(MuxError::SessionMissing(session_name.to_owned()));
        }
        let mut args = vec!["send-keys", "-t", session_name, "-l", "--", text];
        let output = self.run(&args).await?;
        if !output.status.success() {
            return Err(MuxError::ExecFailure(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        if append_enter {
            args = vec!["send-keys", "-t", session_name, "Enter"];
            let output = self.run(&args).await?;
            if !output.status.success() {
                return Err(MuxError::ExecFailure(String::from_utf8_lossy(&output.stderr).into_owned()));
            }
        }
        Ok(())
    }

    async fn capture(&self, session_name: &str, tail_lines: usize) -> MuxResult<String> {
        if !self.exists(session_name).await? {
            return Err(MuxError::SessionMissing(session_name.to_owned()));
        }
        let start = format!("-{tail_lines}");
        let args = vec!["capture-pane", "-p", "-t", session_name, "-S", &start];
        let output = self.run(&args).await?;
        if !output.status.success() {
            return Err(MuxError::ExecFailure(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn kill(&self, session_name: &str) -> MuxResult<()> {
        if !self.exists(session_name).await? {
            return Ok(());
        }
        let output = self.run(&["kill-session", "-t", session_name]).await?;
        if !output.status.success() {
            return Err(MuxError::ExecFailure(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(())
    }

    async fn exists(&self, session_name: &str) -> MuxResult<bool> {
        let output = self.run(&["has-session", "-t", session_name]).await?;
        Ok(output.status.success())
    }

    async fn list(&self) -> MuxResult<Vec<String>> {
        let output = self.run(&["list-sessions", "-F", "#{session_name}"]).await?;
        if !output.status.success() {
            // No server running is not a hard failure; it just means no sessions.
            return Ok(Vec::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout).lines().map(str::to_owned).collect())
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
