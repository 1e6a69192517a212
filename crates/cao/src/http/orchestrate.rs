// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /orchestrate/handoff`, `POST /orchestrate/assign`.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorCode};
use crate::orchestrator;
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct HandoffRequest {
    pub from_id: String,
    pub agent: String,
    #[serde(default)]
    pub provider: Option<String>,
    pub body: String,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HandoffResponse {
    pub terminal_id: String,
    pub output: String,
    pub status: &'static str,
}

pub async fn handoff(
    State(store): State<Arc<Store>>,
    Json(req): Json<HandoffRequest>,
) -> Result<Json<HandoffResponse>, ApiError> {
    if req.agent.trim().is_empty() || req.body.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::InvalidRequest, "agent and body are required"));
    }
    let cwd = req.cwd.unwrap_or_else(|| std::env::temp_dir().to_string_lossy().into_owned());
    let provider = req.provider.unwrap_or_else(|| "claude_code".to_string());

    let result = orchestrator::handoff(
        &store.registry,
        &store.mux,
        &req.agent,
        &provider,
        &req.body,
        &cwd,
        store.poll_interval(),
        store.idle_timeout(),
        store.startup_timeout(),
        store.handoff_timeout(),
        &store.shutdown,
    )
    .await?;

    Ok(Json(HandoffResponse {
        terminal_id: result.terminal_id,
        output: result.output,
        status: if result.failed { "error" } else { "completed" },
    }))
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub from_id: String,
    pub agent: String,
    #[serde(default)]
    pub provider: Option<String>,
    pub body: String,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub callback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub terminal_id: String,
}

pub async fn assign(
    State(store): State<Arc<Store>>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, ApiError> {
    if req.agent.trim().is_empty() || req.body.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::InvalidRequest, "agent and body are required"));
    }
    let cwd = req.cwd.unwrap_or_else(|| std::env::temp_dir().to_string_lossy().into_owned());
    let provider = req.provider.unwrap_or_else(|| "claude_code".to_string());

    let terminal_id = orchestrator::assign(
        &store.registry,
        &store.mux,
        &req.from_id,
        &req.agent,
        &provider,
        &req.body,
        &cwd,
        req.callback.as_deref(),
        store.poll_interval(),
        store.idle_timeout(),
        store.startup_timeout(),
        &store.shutdown,
    )
    .await?;

    Ok(Json(AssignResponse { terminal_id }))
}

#[cfg(test)]
#[path = "orchestrate_tests.rs"]
mod tests;
