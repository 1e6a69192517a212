// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator for multiple interactive AI developer agents, each running
//! inside its own terminal-multiplexer session.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod bus;
pub mod client;
pub mod config;
pub mod error;
pub mod event_log;
pub mod flow;
pub mod frontmatter;
pub mod http;
pub mod orchestrator;
pub mod profile;
pub mod provider;
pub mod reader;
pub mod registry;
pub mod store;

pub use config::Config;
pub use store::Store;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cao_mux::tmux::TmuxAdapter;

/// Initialize `tracing` from `config.log_format`/`config.log_level`. Safe to
/// call more than once (e.g. from integration tests): uses `try_init`.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

/// Run the Orchestration Server to completion: build the `Store` against a
/// real `tmux`-backed Mux Adapter, spawn the flow scheduler, and serve the
/// HTTP control plane until shut down (Ctrl-C or `/shutdown`-triggered
/// cancellation of `store.shutdown`).
pub async fn serve(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);
    config.validate()?;

    let mux: Arc<dyn cao_mux::MuxAdapter> = Arc::new(TmuxAdapter::new("tmux"));
    let store = Store::new(config.clone(), mux).await?;
    store.spawn_scheduler();

    let router = http::build_router(store.clone());
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "cao serve listening");

    let shutdown = store.shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c, shutting down");
            shutdown.cancel();
        }
    });

    let result = axum::serve(listener, router).with_graceful_shutdown(store.shutdown.clone().cancelled_owned()).await;
    if let Err(e) = result {
        error!(error = %e, "HTTP server error");
    }

    orchestrator::shutdown_all(&store.registry, store.mux.as_ref()).await;
    Ok(())
}
