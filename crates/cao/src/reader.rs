// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Injector/Reader: submits keystrokes to a terminal and polls
//! its pane to detect idle/completion/error via output-signature heuristics.
//!
//! The Reader is the only source of status transitions out of `BUSY`.
//! One background task per live terminal runs [`poll_loop`], collapsed into
//! a single generic loop since readback here is marker-based rather than
//! screen-classification-based.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cao_mux::MuxAdapter;

use crate::provider::{self, ProviderProfile};
use crate::registry::{Registry, Status};

/// Outcome of matching one pane snapshot against the marker/ready-prompt
/// priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadbackEvent {
    Error { payload: String },
    Completed,
    Idle,
    Unchanged,
}

/// Strip ANSI escapes and normalize line endings before the text is
/// returned over the API.
pub fn normalize(raw: &str) -> String {
    let stripped = strip_ansi_escapes::strip_str(raw);
    stripped.replace("\r\n", "\n").replace('\r', "\n")
}

/// Classify a captured pane snapshot against a terminal's markers.
///
/// Tie-break: if both markers appear, the later-positioned one
/// wins. A marker occurring only on the most recent injected line (echo of
/// the input itself) is ignored.
pub fn classify(
    pane: &str,
    terminal_id: &str,
    profile: &ProviderProfile,
    last_injected_line: Option<&str>,
) -> ReadbackEvent {
    let normalized = normalize(pane);
    let done = provider::completion_marker(terminal_id);
    let err = provider::error_marker(terminal_id);

    let lines: Vec<&str> = normalized.lines().collect();
    // A marker only counts if the line it appears on isn't merely an echo
    // of the most recently injected line.
    let is_echo = |idx: usize| last_injected_line.is_some_and(|echoed| lines[idx] == echoed);

    let mut done_at = None;
    let mut err_at = None;
    for (idx, line) in lines.iter().enumerate() {
        if line.contains(&done) && !is_echo(idx) {
            done_at = Some(idx);
        }
        if line.contains(&err) && !is_echo(idx) {
            err_at = Some(idx);
        }
    }

    match (done_at, err_at) {
        (Some(d), Some(e)) if e > d => ReadbackEvent::Error { payload: extract_tail(&normalized, &err) },
        (Some(_), Some(_)) => ReadbackEvent::Completed,
        (None, Some(_)) => ReadbackEvent::Error { payload: extract_tail(&normalized, &err) },
        (Some(_), None) => ReadbackEvent::Completed,
        (None, None) => {
            let last_line = lines.iter().rev().find(|l| !l.trim().is_empty()).copied().unwrap_or("");
            if profile.ready_prompt.is_match(last_line) {
                ReadbackEvent::Idle
            } else {
                ReadbackEvent::Unchanged
            }
        }
    }
}

fn extract_tail(normalized: &str, marker: &str) -> String {
    match normalized.rfind(marker) {
        Some(idx) => normalized[..idx].trim_end().to_string(),
        None => normalized.trim_end().to_string(),
    }
}

/// Extract the task result: the text between the last injection and the
/// completion marker.
pub fn extract_result(pane: &str, terminal_id: &str) -> String {
    let normalized = normalize(pane);
    let done = provider::completion_marker(terminal_id);
    extract_tail(&normalized, &done)
}

/// Background poll loop for one terminal. Captures the pane every
/// `poll_interval`, classifies it, and applies the resulting status
/// transition to the registry. Runs until `shutdown` fires or the
/// terminal is removed from the registry.
pub async fn poll_loop(
    registry: Arc<Registry>,
    mux: Arc<dyn MuxAdapter>,
    terminal_id: String,
    session_name: String,
    provider_key: String,
    poll_interval: Duration,
    idle_timeout: Duration,
    shutdown: CancellationToken,
) {
    let profile = provider::lookup(&provider_key).clone();
    let mut last_unchanged_since: Option<chrono::DateTime<Utc>> = None;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(poll_interval) => {}
        }

        let Ok(terminal) = registry.get(&terminal_id).await else { break };
        if terminal.status == Status::Dead {
            break;
        }

        let pane = match mux.capture(&session_name, 200).await {
            Ok(pane) => pane,
            Err(e) => {
                warn!(terminal_id = %terminal_id, error = %e, "pane capture failed");
                continue;
            }
        };

        let event = classify(&pane, &terminal_id, &profile, terminal.last_injected_line.as_deref());
        match event {
            ReadbackEvent::Error { payload } => {
                last_unchanged_since = None;
                debug!(terminal_id = %terminal_id, "reader observed error marker");
                let _ = registry.update_status(&terminal_id, Status::Error).await;
                let _ = payload;
            }
            ReadbackEvent::Completed => {
                last_unchanged_since = None;
                debug!(terminal_id = %terminal_id, "reader observed completion marker");
                let _ = registry.update_status(&terminal_id, Status::Completed).await;
            }
            ReadbackEvent::Idle => {
                last_unchanged_since = None;
                if terminal.status == Status::Starting || terminal.status == Status::Busy {
                    if registry.update_status(&terminal_id, Status::Idle).await.is_ok() {
                        let _ = crate::bus::deliver_on_idle_edge(&registry, mux.as_ref(), &terminal_id).await;
                    }
                }
            }
            ReadbackEvent::Unchanged => {
                let since = last_unchanged_since.get_or_insert_with(Utc::now);
                if Utc::now().signed_duration_since(*since).to_std().unwrap_or_default() >= idle_timeout {
                    warn!(terminal_id = %terminal_id, "idle timeout exceeded, marking error");
                    let _ = registry.update_status(&terminal_id, Status::Error).await;
                }
            }
        }
    }
}

/// Inject a task body with completion/error markers and submit it, recording
/// the injected text's lines so the Reader can discount their echo.
pub async fn inject_task(
    registry: &Registry,
    mux: &dyn MuxAdapter,
    session_name: &str,
    terminal_id: &str,
    body: &str,
) -> cao_mux::MuxResult<()> {
    let text = provider::with_markers(terminal_id, body);
    mux.send_keys(session_name, &text, true).await?;
    let last_line = text.lines().last().map(str::to_string);
    let _ = registry.set_last_injected_line(terminal_id, last_line).await;
    Ok(())
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
