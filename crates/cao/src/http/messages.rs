// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /terminals/{id}/messages`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::bus::SendOutcome;
use crate::error::ApiError;
use crate::orchestrator;
use crate::registry::MessageKind;
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub from_id: String,
    pub body: String,
    #[serde(default = "default_kind")]
    pub kind: MessageKind,
}

fn default_kind() -> MessageKind {
    MessageKind::User
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendMessageResponse {
    Queued,
    Delivered,
}

pub async fn send_message(
    State(store): State<Arc<Store>>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let outcome = orchestrator::send_message(
        &store.registry,
        store.mux.as_ref(),
        &req.from_id,
        &id,
        &req.body,
        req.kind,
    )
    .await?;
    Ok(Json(match outcome {
        SendOutcome::Queued => SendMessageResponse::Queued,
        SendOutcome::Delivered => SendMessageResponse::Delivered,
    }))
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
