// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST|GET /flows`, `GET /flows/{name}`, `POST /flows/{name}/run`,
//! `PATCH|DELETE /flows/{name}`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorCode};
use crate::flow::file;
use crate::flow::{FlowDetail, FlowSchedulerError, FlowSummary};
use crate::orchestrator;
use crate::store::Store;

impl From<FlowSchedulerError> for ApiError {
    fn from(e: FlowSchedulerError) -> Self {
        match e {
            FlowSchedulerError::NotFound(name) => {
                ApiError::new(ErrorCode::NotFound, "unknown flow").with_terminal(name)
            }
            FlowSchedulerError::InvalidSchedule(reason) => ApiError::new(ErrorCode::InvalidRequest, reason),
            FlowSchedulerError::File(e) => ApiError::new(ErrorCode::InvalidRequest, e.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateFlowResponse {
    pub name: String,
}

/// Body is the raw flow file text (YAML front matter + prompt template).
pub async fn create_flow(
    State(store): State<Arc<Store>>,
    body: String,
) -> Result<Json<CreateFlowResponse>, ApiError> {
    let def = file::parse(std::path::Path::new("<request>"), &body)
        .map_err(|e| ApiError::new(ErrorCode::InvalidRequest, e.to_string()))?;
    store.flows.upsert_file(&def.meta.name, &body).await?;
    Ok(Json(CreateFlowResponse { name: def.meta.name }))
}

pub async fn list_flows(State(store): State<Arc<Store>>) -> Json<Vec<FlowSummary>> {
    Json(store.flows.list().await)
}

pub async fn get_flow(
    State(store): State<Arc<Store>>,
    Path(name): Path<String>,
) -> Result<Json<FlowDetail>, ApiError> {
    store.flows.get(&name).await.map(Json).ok_or_else(|| {
        ApiError::new(ErrorCode::NotFound, "unknown flow").with_terminal(name)
    })
}

pub async fn run_flow(
    State(store): State<Arc<Store>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let def = store
        .flows
        .get_def(&name)
        .await
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, "unknown flow").with_terminal(&name))?;

    let provider = def.meta.provider.clone().unwrap_or_else(|| "claude_code".to_string());
    let cwd = std::env::temp_dir();
    let terminal_id = orchestrator::assign(
        &store.registry,
        &store.mux,
        "flow-scheduler",
        &def.meta.agent_profile,
        &provider,
        &def.prompt_template,
        cwd.to_string_lossy().as_ref(),
        None,
        store.poll_interval(),
        store.idle_timeout(),
        store.startup_timeout(),
        &store.shutdown,
    )
    .await?;

    Ok(Json(serde_json::json!({ "terminal_id": terminal_id })))
}

#[derive(Debug, Deserialize)]
pub struct PatchFlowRequest {
    #[serde(default)]
    pub enabled: Option<bool>,
}

pub async fn patch_flow(
    State(store): State<Arc<Store>>,
    Path(name): Path<String>,
    Json(req): Json<PatchFlowRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(enabled) = req.enabled {
        store.flows.set_enabled(&name, enabled).await?;
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

pub async fn delete_flow(
    State(store): State<Arc<Store>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    store.flows.remove(&name).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[cfg(test)]
#[path = "flows_tests.rs"]
mod tests;
