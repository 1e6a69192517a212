// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST|GET /terminals`, `GET|DELETE /terminals/{id}`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorCode};
use crate::orchestrator;
use crate::registry::{Status, TerminalState};
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct CreateTerminalRequest {
    pub agent: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTerminalResponse {
    pub id: String,
    pub session_name: String,
    pub status: Status,
}

pub async fn create_terminal(
    State(store): State<Arc<Store>>,
    Json(req): Json<CreateTerminalRequest>,
) -> Result<Json<CreateTerminalResponse>, ApiError> {
    if req.agent.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::InvalidRequest, "agent must not be empty"));
    }
    let cwd = req.cwd.unwrap_or_else(|| std::env::temp_dir().to_string_lossy().into_owned());
    let provider = req.provider.unwrap_or_else(|| "claude_code".to_string());

    let terminal_id = orchestrator::launch(
        &store.registry,
        &store.mux,
        &req.agent,
        &provider,
        &cwd,
        req.parent_id,
        store.poll_interval(),
        store.idle_timeout(),
        &store.shutdown,
    )
    .await?;

    let terminal = store.registry.get(&terminal_id).await.map_err(|_| {
        ApiError::new(ErrorCode::Internal, "terminal vanished immediately after creation")
    })?;
    Ok(Json(CreateTerminalResponse { id: terminal.id, session_name: terminal.session_name, status: terminal.status }))
}

pub async fn list_terminals(State(store): State<Arc<Store>>) -> Json<Vec<TerminalState>> {
    Json(store.registry.list().await)
}

pub async fn get_terminal(
    State(store): State<Arc<Store>>,
    Path(id): Path<String>,
) -> Result<Json<TerminalState>, ApiError> {
    store
        .registry
        .get(&id)
        .await
        .map(Json)
        .map_err(|_| ApiError::new(ErrorCode::NotFound, "unknown terminal").with_terminal(id))
}

pub async fn delete_terminal(
    State(store): State<Arc<Store>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    // Idempotent: killing an already-dead terminal still returns success.
    let _ = orchestrator::shutdown_one(&store.registry, store.mux.as_ref(), &id).await;
    Json(serde_json::json!({ "ok": true }))
}

#[cfg(test)]
#[path = "terminals_tests.rs"]
mod tests;
