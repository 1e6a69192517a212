// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server configuration, parsed from CLI flags or `CAO_*` environment
//! variables.

use std::path::PathBuf;

use clap::Parser;

/// Orchestrator for multiple interactive AI developer agents.
#[derive(Debug, Clone, Parser)]
#[command(name = "cao", version, about)]
pub struct Config {
    /// Host address to bind the HTTP control plane to.
    #[arg(long, env = "CAO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// HTTP port to listen on.
    #[arg(long, env = "CAO_PORT", default_value = "9889")]
    pub port: u16,

    /// Directory holding flow definition files.
    #[arg(long, env = "CAO_FLOWS_DIR")]
    pub flows_dir: Option<PathBuf>,

    /// Directory holding agent profile markdown files.
    #[arg(long, env = "CAO_PROFILES_DIR")]
    pub profiles_dir: Option<PathBuf>,

    /// Directory the event log is written under (JSONL). Omit to disable.
    #[arg(long, env = "CAO_EVENT_LOG_DIR")]
    pub event_log_dir: Option<PathBuf>,

    /// How often the Reader polls a terminal's pane, in milliseconds.
    #[arg(long, env = "CAO_POLL_INTERVAL_MS", default_value = "500")]
    pub poll_interval_ms: u64,

    /// How long a terminal may sit with no marker/ready-prompt match before
    /// it is forced into `ERROR` with kind `timeout`, in seconds.
    #[arg(long, env = "CAO_IDLE_TIMEOUT_SECS", default_value = "86400")]
    pub idle_timeout_secs: u64,

    /// How long `handoff`/`assign` wait for a freshly-launched terminal to
    /// reach `IDLE` before failing with `launch-failure`, in seconds.
    #[arg(long, env = "CAO_STARTUP_TIMEOUT_SECS", default_value = "60")]
    pub startup_timeout_secs: u64,

    /// Optional overall deadline for a blocking `handoff` call, in seconds.
    /// Unset means no deadline beyond `idle_timeout_secs`.
    #[arg(long, env = "CAO_HANDOFF_TIMEOUT_SECS")]
    pub handoff_timeout_secs: Option<u64>,

    /// How often the flow scheduler checks for due flows, in seconds.
    #[arg(long, env = "CAO_SCHEDULER_TICK_SECS", default_value = "30")]
    pub scheduler_tick_secs: u64,

    /// Log format: `json` or `text`.
    #[arg(long, env = "CAO_LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level filter (trace, debug, info, warn, error), or an
    /// `EnvFilter` directive string.
    #[arg(long, env = "CAO_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.log_format != "json" && self.log_format != "text" {
            anyhow::bail!("invalid log format: {} (expected json or text)", self.log_format);
        }
        if self.poll_interval_ms == 0 {
            anyhow::bail!("--poll-interval-ms must be greater than zero");
        }
        Ok(())
    }

    pub fn flows_dir(&self) -> PathBuf {
        self.flows_dir.clone().unwrap_or_else(|| default_state_dir().join("flows"))
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.profiles_dir.clone().unwrap_or_else(|| default_state_dir().join("profiles"))
    }

    pub fn event_log_dir(&self) -> PathBuf {
        self.event_log_dir.clone().unwrap_or_else(|| default_state_dir().join("events"))
    }
}

fn default_state_dir() -> PathBuf {
    dirs_home().join(".cao")
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
