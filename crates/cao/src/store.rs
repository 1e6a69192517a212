// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state passed to every HTTP handler via axum's `State`
//! extractor.

use std::sync::Arc;
use std::time::Duration;

use cao_mux::MuxAdapter;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::event_log::EventLog;
use crate::flow::FlowScheduler;
use crate::registry::Registry;

/// Shared server state.
pub struct Store {
    pub registry: Arc<Registry>,
    pub mux: Arc<dyn MuxAdapter>,
    pub flows: Arc<FlowScheduler>,
    pub event_log: Arc<EventLog>,
    pub config: Config,
    pub shutdown: CancellationToken,
}

impl Store {
    pub async fn new(config: Config, mux: Arc<dyn MuxAdapter>) -> anyhow::Result<Arc<Self>> {
        config.validate()?;
        let flows_dir = config.flows_dir();
        let event_log_dir = config.event_log_dir();
        let flows = FlowScheduler::load(flows_dir).await;
        let event_log = EventLog::new(Some(&event_log_dir));

        Ok(Arc::new(Self {
            registry: Arc::new(Registry::new()),
            mux,
            flows: Arc::new(flows),
            event_log: Arc::new(event_log),
            config,
            shutdown: CancellationToken::new(),
        }))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config.idle_timeout_secs)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.config.startup_timeout_secs)
    }

    pub fn handoff_timeout(&self) -> Duration {
        self.config
            .handoff_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(u64::MAX / 2))
    }

    pub fn scheduler_tick(&self) -> Duration {
        Duration::from_secs(self.config.scheduler_tick_secs)
    }

    /// Spawn the Flow Scheduler's background tick task.
    pub fn spawn_scheduler(self: &Arc<Self>) {
        let scheduler = self.flows.clone();
        let registry = self.registry.clone();
        let mux = self.mux.clone();
        let tick = self.scheduler_tick();
        let poll_interval = self.poll_interval();
        let idle_timeout = self.idle_timeout();
        let startup_timeout = self.startup_timeout();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            crate::flow::scheduler::run(scheduler, registry, mux, tick, poll_interval, idle_timeout, startup_timeout, shutdown)
                .await;
        });
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
