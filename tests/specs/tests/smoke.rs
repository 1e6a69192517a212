// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use cao_mux::MuxAdapter;
use cao_specs::{TestServer, POLL};

#[tokio::test]
async fn sequential_handoff_returns_output_and_kills_terminal() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let http = reqwest::Client::new();

    let driver = {
        let server_mux = server.mux.clone();
        let store = server.store.clone();
        tokio::spawn(async move {
            let terminal = loop {
                if let Some(t) = store.registry.list().await.into_iter().next() {
                    break t;
                }
                tokio::time::sleep(POLL).await;
            };
            loop {
                if server_mux.exists(&terminal.session_name).await.unwrap_or(false) {
                    break;
                }
                tokio::time::sleep(POLL).await;
            }
            server_mux.set_pane(&terminal.session_name, "❯");
            loop {
                if store.registry.get(&terminal.id).await.map(|t| t.status) == Ok(cao::registry::Status::Busy)
                {
                    break;
                }
                tokio::time::sleep(POLL).await;
            }
            let marker = cao::provider::completion_marker(&terminal.id);
            server_mux.set_pane(&terminal.session_name, &format!("review looks good\n{marker}"));
        })
    };

    let resp = http
        .post(format!("{}/orchestrate/handoff", server.base_url))
        .json(&serde_json::json!({ "from_id": "supervisor", "agent": "reviewer", "body": "review file X" }))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["output"], "review looks good");

    let terminal_id = body["terminal_id"].as_str().unwrap().to_string();
    assert_eq!(server.store.registry.get(&terminal_id).await.unwrap().status, cao::registry::Status::Dead);
    driver.await?;
    Ok(())
}

#[tokio::test]
async fn parallel_assign_runs_two_terminals_independently() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let http = reqwest::Client::new();

    let driver = {
        let server_mux = server.mux.clone();
        let store = server.store.clone();
        tokio::spawn(async move {
            let mut seen = std::collections::HashSet::new();
            while seen.len() < 2 {
                for terminal in store.registry.list().await {
                    if seen.contains(&terminal.id) {
                        continue;
                    }
                    if server_mux.exists(&terminal.session_name).await.unwrap_or(false) {
                        server_mux.set_pane(&terminal.session_name, "❯");
                        seen.insert(terminal.id);
                    }
                }
                tokio::time::sleep(POLL).await;
            }
        })
    };

    let first = http
        .post(format!("{}/orchestrate/assign", server.base_url))
        .json(&serde_json::json!({ "from_id": "supervisor", "agent": "reviewer", "body": "task one" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let second = http
        .post(format!("{}/orchestrate/assign", server.base_url))
        .json(&serde_json::json!({ "from_id": "supervisor", "agent": "developer", "body": "task two" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    let first_id = first["terminal_id"].as_str().unwrap().to_string();
    let second_id = second["terminal_id"].as_str().unwrap().to_string();
    assert_ne!(first_id, second_id);
    assert_eq!(server.store.registry.get(&first_id).await.unwrap().status, cao::registry::Status::Busy);
    assert_eq!(server.store.registry.get(&second_id).await.unwrap().status, cao::registry::Status::Busy);
    driver.await?;
    Ok(())
}

#[tokio::test]
async fn dead_recipient_rejects_message() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let http = reqwest::Client::new();

    let create = http
        .post(format!("{}/terminals", server.base_url))
        .json(&serde_json::json!({ "agent": "reviewer" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let id = create["id"].as_str().unwrap().to_string();

    http.delete(format!("{}/terminals/{id}", server.base_url)).send().await?;

    let resp = http
        .post(format!("{}/terminals/{id}/messages", server.base_url))
        .json(&serde_json::json!({ "from_id": "operator", "body": "hi" }))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::GONE);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["kind"], "dead-recipient");
    Ok(())
}

#[tokio::test]
async fn queued_message_delivers_on_next_idle_edge() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let http = reqwest::Client::new();

    let create = http
        .post(format!("{}/terminals", server.base_url))
        .json(&serde_json::json!({ "agent": "reviewer" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    let id = create["id"].as_str().unwrap().to_string();
    let (_, session) = server.await_one_terminal().await;

    let resp = http
        .post(format!("{}/terminals/{id}/messages", server.base_url))
        .json(&serde_json::json!({ "from_id": "operator", "body": "status?" }))
        .send()
        .await?;
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body, serde_json::json!("queued"));

    server.mux.set_pane(&session, "❯");
    loop {
        if server.mux.injected(&session).iter().any(|i| i.contains("status?")) {
            break;
        }
        tokio::time::sleep(POLL).await;
    }
    assert_eq!(server.store.registry.get(&id).await.unwrap().status, cao::registry::Status::Busy);
    Ok(())
}

#[tokio::test]
async fn launch_failure_on_startup_timeout_marks_terminal_error() -> anyhow::Result<()> {
    let server = TestServer::start_with_args(&["--startup-timeout-secs", "0"]).await?;
    let http = reqwest::Client::new();

    let resp = http
        .post(format!("{}/orchestrate/handoff", server.base_url))
        .json(&serde_json::json!({ "from_id": "supervisor", "agent": "reviewer", "body": "review" }))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["kind"], "launch-failure");
    Ok(())
}

#[tokio::test]
async fn run_flow_endpoint_spawns_a_terminal_for_the_flow_agent_profile() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let http = reqwest::Client::new();

    let flow_body = "---\nname: gated-check\nschedule: \"* * * * *\"\nagent_profile: checker\n---\nCheck the build.\n";
    http.post(format!("{}/flows", server.base_url)).body(flow_body).send().await?;

    let driver = {
        let server_mux = server.mux.clone();
        let store = server.store.clone();
        tokio::spawn(async move {
            let terminal = loop {
                if let Some(t) = store.registry.list().await.into_iter().next() {
                    break t;
                }
                tokio::time::sleep(POLL).await;
            };
            loop {
                if server_mux.exists(&terminal.session_name).await.unwrap_or(false) {
                    break;
                }
                tokio::time::sleep(POLL).await;
            }
            server_mux.set_pane(&terminal.session_name, "❯");
        })
    };

    let resp = http.post(format!("{}/flows/gated-check/run", server.base_url)).send().await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = resp.json().await?;
    let terminal_id = body["terminal_id"].as_str().unwrap().to_string();

    let terminal = server.store.registry.get(&terminal_id).await.unwrap();
    assert_eq!(terminal.agent_profile, "checker");
    assert_eq!(terminal.status, cao::registry::Status::Busy);
    driver.await?;
    Ok(())
}
