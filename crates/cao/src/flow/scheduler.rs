// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow Scheduler: a single tick every `scheduler_tick_secs`
//! checks every enabled flow, runs its optional gate script, interpolates
//! its prompt template, and invokes `assign`. Firing history is kept
//! per flow for post-hoc inspection of what ran and why.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use cao_mux::MuxAdapter;

use crate::flow::file::{self, FlowDef};
use crate::orchestrator;
use crate::registry::Registry;

const MAX_HISTORY: usize = 20;

/// Outcome of a single scheduler tick for one flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FiringOutcome {
    Spawned { terminal_id: String },
    Skipped,
    ScriptFailed { reason: String },
    AssignFailed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiringRecord {
    pub at: DateTime<Utc>,
    pub outcome: FiringOutcome,
}

struct FlowRuntime {
    def: FlowDef,
    next_fire_at: DateTime<Utc>,
    history: VecDeque<FiringRecord>,
}

/// Public, serializable summary of one flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSummary {
    pub name: String,
    pub schedule: String,
    pub agent_profile: String,
    pub enabled: bool,
    pub next_fire_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDetail {
    pub summary: FlowSummary,
    pub def: FlowDef,
    pub history: Vec<FiringRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowSchedulerError {
    #[error("flow not found: {0}")]
    NotFound(String),
    #[error("invalid cron expression: {0}")]
    InvalidSchedule(String),
    #[error(transparent)]
    File(#[from] file::FlowFileError),
}

/// Parse a cron expression, accepting both the traditional 5-field form
/// (minute hour day-of-month month day-of-week) and the `cron` crate's
/// native 6-field form with a leading seconds field.
fn parse_schedule(expr: &str) -> Result<Schedule, FlowSchedulerError> {
    let field_count = expr.split_whitespace().count();
    let normalized = if field_count == 5 { format!("0 {expr}") } else { expr.to_string() };
    Schedule::from_str(&normalized).map_err(|e| FlowSchedulerError::InvalidSchedule(e.to_string()))
}

fn next_fire_after(schedule: &Schedule, after: DateTime<Utc>) -> DateTime<Utc> {
    schedule.after(&after).next().unwrap_or(after + chrono::Duration::days(3650))
}

/// Holds every known flow and drives the periodic firing tick.
pub struct FlowScheduler {
    flows_dir: PathBuf,
    flows: RwLock<HashMap<String, FlowRuntime>>,
}

impl FlowScheduler {
    /// Load all flow files under `flows_dir` and compute initial
    /// `next_fire_at` for each from the current time.
    pub async fn load(flows_dir: PathBuf) -> Self {
        let scheduler = Self { flows_dir, flows: RwLock::new(HashMap::new()) };
        scheduler.reload().await;
        scheduler
    }

    /// Re-read the flows directory, recomputing `next_fire_at` for every
    /// flow found. Existing firing history is preserved for flows that
    /// still exist.
    pub async fn reload(&self) {
        let now = Utc::now();
        let defs = file::load_all(&self.flows_dir);
        let mut flows = self.flows.write().await;
        let mut next = HashMap::new();
        for def in defs {
            let schedule = match parse_schedule(&def.meta.schedule) {
                Ok(s) => s,
                Err(e) => {
                    warn!(flow = %def.meta.name, error = %e, "skipping flow with invalid schedule");
                    continue;
                }
            };
            let history = flows.remove(&def.meta.name).map(|r| r.history).unwrap_or_default();
            let next_fire_at = next_fire_after(&schedule, now);
            next.insert(def.meta.name.clone(), FlowRuntime { def, next_fire_at, history });
        }
        *flows = next;
    }

    pub async fn upsert_file(&self, name: &str, contents: &str) -> Result<(), FlowSchedulerError> {
        let path = self.flows_dir.join(format!("{name}.md"));
        let def = file::parse(&path, contents)?;
        if def.meta.name != name {
            return Err(FlowSchedulerError::NotFound(name.to_string()));
        }
        std::fs::create_dir_all(&self.flows_dir).ok();
        std::fs::write(&path, contents).ok();
        self.reload().await;
        Ok(())
    }

    pub async fn remove(&self, name: &str) -> Result<(), FlowSchedulerError> {
        let path = self.flows_dir.join(format!("{name}.md"));
        let _ = std::fs::remove_file(path);
        self.flows.write().await.remove(name).ok_or_else(|| FlowSchedulerError::NotFound(name.to_string()))?;
        Ok(())
    }

    pub async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), FlowSchedulerError> {
        let mut flows = self.flows.write().await;
        let runtime = flows.get_mut(name).ok_or_else(|| FlowSchedulerError::NotFound(name.to_string()))?;
        runtime.def.meta.enabled = enabled;
        let path = self.flows_dir.join(format!("{name}.md"));
        if let Ok(text) = file::render(&runtime.def) {
            let _ = std::fs::write(path, text);
        }
        Ok(())
    }

    pub async fn list(&self) -> Vec<FlowSummary> {
        self.flows
            .read()
            .await
            .values()
            .map(|r| FlowSummary {
                name: r.def.meta.name.clone(),
                schedule: r.def.meta.schedule.clone(),
                agent_profile: r.def.meta.agent_profile.clone(),
                enabled: r.def.meta.enabled,
                next_fire_at: r.next_fire_at,
            })
            .collect()
    }

    pub async fn get(&self, name: &str) -> Option<FlowDetail> {
        self.flows.read().await.get(name).map(|r| FlowDetail {
            summary: FlowSummary {
                name: r.def.meta.name.clone(),
                schedule: r.def.meta.schedule.clone(),
                agent_profile: r.def.meta.agent_profile.clone(),
                enabled: r.def.meta.enabled,
                next_fire_at: r.next_fire_at,
            },
            def: r.def.clone(),
            history: r.history.iter().cloned().collect(),
        })
    }

    pub async fn get_def(&self, name: &str) -> Option<FlowDef> {
        self.flows.read().await.get(name).map(|r| r.def.clone())
    }

    fn record(history: &mut VecDeque<FiringRecord>, outcome: FiringOutcome) {
        history.push_back(FiringRecord { at: Utc::now(), outcome });
        while history.len() > MAX_HISTORY {
            history.pop_front();
        }
    }
}

/// Execute the gate script, if any, returning the interpolation values.
/// `None` means "skip this firing".
async fn run_gate_script(script: &Path, cwd: &Path) -> Result<Option<HashMap<String, String>>, String> {
    let mut child = Command::new(script)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| e.to_string())?;

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        let _ = out.read_to_string(&mut stdout).await;
    }
    let status = child.wait().await.map_err(|e| e.to_string())?;
    if !status.success() {
        return Err(format!("script exited with {status}"));
    }

    #[derive(Deserialize)]
    struct GateOutput {
        execute: bool,
        #[serde(default)]
        output: HashMap<String, String>,
    }
    let parsed: GateOutput = serde_json::from_str(stdout.trim()).map_err(|e| e.to_string())?;
    Ok(if parsed.execute { Some(parsed.output) } else { None })
}

/// Run one firing check across every enabled, due flow.
async fn tick(scheduler: &FlowScheduler, registry: &Arc<Registry>, mux: &Arc<dyn MuxAdapter>, shutdown: &CancellationToken, poll_interval: Duration, idle_timeout: Duration, startup_timeout: Duration) {
    let now = Utc::now();
    let due: Vec<String> = {
        let flows = scheduler.flows.read().await;
        flows
            .values()
            .filter(|r| r.def.meta.enabled && r.next_fire_at <= now)
            .map(|r| r.def.meta.name.clone())
            .collect()
    };

    for name in due {
        let (def, cwd) = {
            let flows = scheduler.flows.read().await;
            let Some(runtime) = flows.get(&name) else { continue };
            (runtime.def.clone(), std::env::temp_dir())
        };

        let gate = match &def.meta.script {
            Some(script) => run_gate_script(script, &cwd).await,
            None => Ok(Some(HashMap::new())),
        };

        let outcome = match gate {
            Ok(None) => FiringOutcome::Skipped,
            Ok(Some(values)) => {
                let prompt = file::interpolate(&def.prompt_template, &values);
                let provider = def.meta.provider.clone().unwrap_or_else(|| "claude_code".to_string());
                match orchestrator::assign(
                    registry,
                    mux,
                    "flow-scheduler",
                    &def.meta.agent_profile,
                    &provider,
                    &prompt,
                    cwd.to_string_lossy().as_ref(),
                    None,
                    poll_interval,
                    idle_timeout,
                    startup_timeout,
                    shutdown,
                )
                .await
                {
                    Ok(terminal_id) => {
                        info!(flow = %name, terminal_id = %terminal_id, "flow fired");
                        FiringOutcome::Spawned { terminal_id }
                    }
                    Err(e) => {
                        error!(flow = %name, error = %e.message, "flow assign failed");
                        FiringOutcome::AssignFailed { reason: e.message }
                    }
                }
            }
            Err(reason) => {
                warn!(flow = %name, reason = %reason, "flow gate script failed");
                FiringOutcome::ScriptFailed { reason }
            }
        };

        let mut flows = scheduler.flows.write().await;
        if let Some(runtime) = flows.get_mut(&name) {
            FlowScheduler::record(&mut runtime.history, outcome);
            if let Ok(schedule) = parse_schedule(&runtime.def.meta.schedule) {
                runtime.next_fire_at = next_fire_after(&schedule, now);
            }
        }
    }
}

/// Background tick task: runs every `tick_interval` until `shutdown` fires.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    scheduler: Arc<FlowScheduler>,
    registry: Arc<Registry>,
    mux: Arc<dyn MuxAdapter>,
    tick_interval: Duration,
    poll_interval: Duration,
    idle_timeout: Duration,
    startup_timeout: Duration,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(tick_interval) => {}
        }
        tick(&scheduler, &registry, &mux, &shutdown, poll_interval, idle_timeout, startup_timeout).await;
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
