// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client used by the `cao` binary's CLI front-ends
//! (`launch`/`team`/`shutdown`/`flow …`/`install`). These talk to a running
//! `cao serve` instance over loopback HTTP; they hold no state of their own.

use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

/// Error surfaced by a client call, distinguishing "server reachable but
/// rejected the request" from "server unreachable", so `main.rs` can map
/// each to the exit codes named for CLI front-ends.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("server unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("{}: {}", .0.kind, .0.message)]
    Api(ApiError),
}

pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub struct CreateTerminalResponse {
    pub id: String,
    pub session_name: String,
    pub status: String,
}

async fn unwrap_response<T: for<'de> Deserialize<'de>>(resp: reqwest::Response) -> Result<T, ClientError> {
    if resp.status().is_success() {
        Ok(resp.json::<T>().await?)
    } else {
        let api_error: ApiError = resp.json().await?;
        Err(ClientError::Api(api_error))
    }
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    pub async fn launch(
        &self,
        agent: &str,
        provider: Option<&str>,
        cwd: Option<&str>,
    ) -> Result<CreateTerminalResponse, ClientError> {
        let resp = self
            .http
            .post(format!("{}/terminals", self.base_url))
            .json(&json!({ "agent": agent, "provider": provider, "cwd": cwd }))
            .send()
            .await?;
        unwrap_response(resp).await
    }

    pub async fn list_terminals(&self) -> Result<Vec<serde_json::Value>, ClientError> {
        let resp = self.http.get(format!("{}/terminals", self.base_url)).send().await?;
        unwrap_response(resp).await
    }

    pub async fn shutdown_one(&self, id: &str) -> Result<(), ClientError> {
        let resp = self.http.delete(format!("{}/terminals/{id}", self.base_url)).send().await?;
        unwrap_response::<serde_json::Value>(resp).await?;
        Ok(())
    }

    pub async fn shutdown_all(&self) -> Result<(), ClientError> {
        for terminal in self.list_terminals().await? {
            if let Some(id) = terminal["id"].as_str() {
                self.shutdown_one(id).await?;
            }
        }
        Ok(())
    }

    pub async fn create_flow(&self, file_contents: &str) -> Result<serde_json::Value, ClientError> {
        let resp = self
            .http
            .post(format!("{}/flows", self.base_url))
            .header("content-type", "text/plain")
            .body(file_contents.to_string())
            .send()
            .await?;
        unwrap_response(resp).await
    }

    pub async fn list_flows(&self) -> Result<Vec<serde_json::Value>, ClientError> {
        let resp = self.http.get(format!("{}/flows", self.base_url)).send().await?;
        unwrap_response(resp).await
    }

    pub async fn run_flow(&self, name: &str) -> Result<serde_json::Value, ClientError> {
        let resp = self.http.post(format!("{}/flows/{name}/run", self.base_url)).send().await?;
        unwrap_response(resp).await
    }

    pub async fn set_flow_enabled(&self, name: &str, enabled: bool) -> Result<(), ClientError> {
        let resp = self
            .http
            .patch(format!("{}/flows/{name}", self.base_url))
            .json(&json!({ "enabled": enabled }))
            .send()
            .await?;
        unwrap_response::<serde_json::Value>(resp).await?;
        Ok(())
    }

    pub async fn delete_flow(&self, name: &str) -> Result<(), ClientError> {
        let resp = self.http.delete(format!("{}/flows/{name}", self.base_url)).send().await?;
        unwrap_response::<serde_json::Value>(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
