// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;

use super::ErrorCode;

#[test]
fn http_status_mapping() {
    assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
    assert_eq!(ErrorCode::DeadRecipient.http_status(), StatusCode::GONE);
    assert_eq!(ErrorCode::Internal.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn as_str_is_kebab_case() {
    assert_eq!(ErrorCode::InvalidTransition.as_str(), "invalid-transition");
    assert_eq!(ErrorCode::MuxUnavailable.as_str(), "mux-unavailable");
}

#[test]
fn serializes_kebab_case() {
    let json = serde_json::to_string(&ErrorCode::DeadRecipient).unwrap();
    assert_eq!(json, "\"dead-recipient\"");
}
