// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use cao_mux::fake::FakeMuxAdapter;
use clap::Parser;

use super::*;

#[tokio::test]
async fn new_store_loads_flows_from_configured_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("nightly.md"),
        "---\nname: nightly\nschedule: \"0 2 * * *\"\nagent_profile: reviewer\n---\ngo\n",
    )
    .unwrap();

    let config = Config::parse_from([
        "cao",
        "--flows-dir",
        dir.path().to_str().unwrap(),
        "--event-log-dir",
        dir.path().to_str().unwrap(),
    ]);
    let store = Store::new(config, Arc::new(FakeMuxAdapter::new())).await.unwrap();

    assert_eq!(store.flows.list().await.len(), 1);
}

#[tokio::test]
async fn rejects_invalid_config() {
    let config = Config::parse_from(["cao", "--log-format", "xml"]);
    let err = Store::new(config, Arc::new(FakeMuxAdapter::new())).await.unwrap_err();
    assert!(err.to_string().contains("log format"));
}
