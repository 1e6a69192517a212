// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box harness: boots the Orchestration Server in-process against a
//! [`cao_mux::fake::FakeMuxAdapter`] (no real tmux dependency), bound to an
//! ephemeral loopback port, and exposes a `reqwest::Client` base URL plus the
//! fake mux handle so tests can script agent pane output directly.

use std::sync::Arc;
use std::time::Duration;

use cao_mux::fake::FakeMuxAdapter;
use cao_mux::MuxAdapter;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use cao::config::Config;
use cao::http::build_router;
use cao::store::Store;

pub const POLL: Duration = Duration::from_millis(5);

/// A running in-process server, its fake mux, and its base URL.
pub struct TestServer {
    pub base_url: String,
    pub mux: Arc<FakeMuxAdapter>,
    pub store: Arc<Store>,
    shutdown: CancellationToken,
    _flows_dir: tempfile::TempDir,
}

impl TestServer {
    /// Start a server with default timeouts (fast polling, generous
    /// deadlines) suitable for scripted-agent tests.
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with_args(&[]).await
    }

    pub async fn start_with_args(extra_args: &[&str]) -> anyhow::Result<Self> {
        let flows_dir = tempfile::tempdir()?;
        let mut args = vec![
            "cao".to_string(),
            "--flows-dir".to_string(),
            flows_dir.path().to_string_lossy().into_owned(),
            "--poll-interval-ms".to_string(),
            "5".to_string(),
            "--startup-timeout-secs".to_string(),
            "5".to_string(),
        ];
        args.extend(extra_args.iter().map(|s| s.to_string()));
        let config = Config::parse_from(args);

        let mux_concrete = Arc::new(FakeMuxAdapter::new());
        let mux: Arc<dyn MuxAdapter> = mux_concrete.clone();
        let store = Store::new(config, mux).await?;
        store.spawn_scheduler();

        let router = build_router(store.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = store.shutdown.clone();
        let sd = shutdown.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).with_graceful_shutdown(sd.cancelled_owned()).await;
        });

        Ok(Self { base_url: format!("http://{addr}"), mux: mux_concrete, store, shutdown, _flows_dir: flows_dir })
    }

    /// Wait until exactly one terminal has ever been registered and its mux
    /// session exists, then return its `(id, session_name)`.
    pub async fn await_one_terminal(&self) -> (String, String) {
        loop {
            if let Some(t) = self.store.registry.list().await.into_iter().next() {
                if self.mux.exists(&t.session_name).await.unwrap_or(false) {
                    return (t.id, t.session_name);
                }
            }
            tokio::time::sleep(POLL).await;
        }
    }

    pub async fn await_status(&self, id: &str, status: cao::registry::Status) {
        loop {
            if self.store.registry.get(id).await.map(|t| t.status) == Ok(status) {
                return;
            }
            tokio::time::sleep(POLL).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
