// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unified error kinds shared across the registry, orchestrator, and HTTP
//! transport.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kinds propagated as `{kind, message, terminal_id?}` over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    InvalidRequest,
    NotFound,
    InvalidTransition,
    LaunchFailure,
    Timeout,
    DeadRecipient,
    MuxUnavailable,
    ScriptFailure,
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidTransition => StatusCode::CONFLICT,
            Self::LaunchFailure => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::DeadRecipient => StatusCode::GONE,
            Self::MuxUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ScriptFailure => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid-request",
            Self::NotFound => "not-found",
            Self::InvalidTransition => "invalid-transition",
            Self::LaunchFailure => "launch-failure",
            Self::Timeout => "timeout",
            Self::DeadRecipient => "dead-recipient",
            Self::MuxUnavailable => "mux-unavailable",
            Self::ScriptFailure => "script-failure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error body returned by every HTTP endpoint on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorCode, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), terminal_id: None }
    }

    pub fn with_terminal(mut self, terminal_id: impl Into<String>) -> Self {
        self.terminal_id = Some(terminal_id.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.kind.http_status(), Json(self)).into_response()
    }
}

impl From<cao_mux::MuxError> for ApiError {
    fn from(e: cao_mux::MuxError) -> Self {
        ApiError::new(ErrorCode::MuxUnavailable, e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
