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
    // Leak the tempdir for the lifetime of the test so flows_dir stays valid.
    std::mem::forget(dir);
    Store::new(config, Arc::new(FakeMuxAdapter::new())).await.unwrap()
}

#[tokio::test]
async fn create_terminal_returns_starting_status() {
    let store = test_store().await;
    let app = build_router(store);
    let server = axum_test::TestServer::new(app).unwrap();

    let resp = server.post("/terminals").json(&serde_json::json!({ "agent": "reviewer" })).await;
    resp.assert_status(StatusCode::OK);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "STARTING");
    assert!(body["id"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn create_terminal_rejects_empty_agent() {
    let store = test_store().await;
    let app = build_router(store);
    let server = axum_test::TestServer::new(app).unwrap();

    let resp = server.post("/terminals").json(&serde_json::json!({ "agent": "" })).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_unknown_terminal_404() {
    let store = test_store().await;
    let app = build_router(store);
    let server = axum_test::TestServer::new(app).unwrap();

    let resp = server.get("/terminals/does-not-exist").await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_terminals_includes_created_one() {
    let store = test_store().await;
    let app = build_router(store);
    let server = axum_test::TestServer::new(app).unwrap();

    server.post("/terminals").json(&serde_json::json!({ "agent": "reviewer" })).await;
    let resp = server.get("/terminals").await;
    let body: Vec<serde_json::Value> = resp.json();
    assert_eq!(body.len(), 1);
}

#[tokio::test]
async fn delete_terminal_is_idempotent() {
    let store = test_store().await;
    let app = build_router(store);
    let server = axum_test::TestServer::new(app).unwrap();

    let create = server.post("/terminals").json(&serde_json::json!({ "agent": "reviewer" })).await;
    let id = create.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

    let first = server.delete(&format!("/terminals/{id}")).await;
    first.assert_status(StatusCode::OK);
    let second = server.delete(&format!("/terminals/{id}")).await;
    second.assert_status(StatusCode::OK);

    let get_resp = server.get(&format!("/terminals/{id}")).await;
    let body: serde_json::Value = get_resp.json();
    assert_eq!(body["status"], "DEAD");
}
