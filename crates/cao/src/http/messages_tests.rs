// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::http::StatusCode;
use cao_mux::fake::FakeMuxAdapter;
use clap::Parser;

use super::super::build_router;
use crate::config::Config;
use crate::store::Store;

async fn test_store() -> Arc<Store> {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::parse_from([
        "cao",
        "--flows-dir",
        dir.path().to_str().unwrap(),
        "--event-log-dir",
        dir.path().to_str().unwrap(),
    ]);
    std::mem::forget(dir);
    Store::new(config, Arc::new(FakeMuxAdapter::new())).await.unwrap()
}

#[tokio::test]
async fn send_message_to_unknown_terminal_404s() {
    let store = test_store().await;
    let app = build_router(store);
    let server = axum_test::TestServer::new(app).unwrap();

    let resp = server
        .post("/terminals/does-not-exist/messages")
        .json(&serde_json::json!({ "from_id": "operator", "body": "hi" }))
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn send_message_to_starting_terminal_is_queued() {
    let store = test_store().await;
    let app = build_router(store);
    let server = axum_test::TestServer::new(app).unwrap();

    let create = server.post("/terminals").json(&serde_json::json!({ "agent": "reviewer" })).await;
    let id = create.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

    let resp = server
        .post(&format!("/terminals/{id}/messages"))
        .json(&serde_json::json!({ "from_id": "operator", "body": "check the build" }))
        .await;
    resp.assert_status(StatusCode::OK);
    let body: serde_json::Value = resp.json();
    assert_eq!(body, serde_json::json!("queued"));
}

#[tokio::test]
async fn send_message_to_dead_terminal_is_gone() {
    let store = test_store().await;
    let app = build_router(store);
    let server = axum_test::TestServer::new(app).unwrap();

    let create = server.post("/terminals").json(&serde_json::json!({ "agent": "reviewer" })).await;
    let id = create.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();
    server.delete(&format!("/terminals/{id}")).await;

    let resp = server
        .post(&format!("/terminals/{id}/messages"))
        .json(&serde_json::json!({ "from_id": "operator", "body": "hi" }))
        .await;
    resp.assert_status(StatusCode::GONE);
}
