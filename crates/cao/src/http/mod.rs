// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP control plane, one module per resource concern.

mod flows;
mod health;
mod messages;
mod orchestrate;
mod terminals;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::Store;

/// Build the axum `Router` with every control-plane route.
pub fn build_router(store: Arc<Store>) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/terminals", post(terminals::create_terminal).get(terminals::list_terminals))
        .route("/terminals/{id}", get(terminals::get_terminal).delete(terminals::delete_terminal))
        .route("/terminals/{id}/messages", post(messages::send_message))
        .route("/orchestrate/handoff", post(orchestrate::handoff))
        .route("/orchestrate/assign", post(orchestrate::assign))
        .route("/flows", post(flows::create_flow).get(flows::list_flows))
        .route("/flows/{name}", get(flows::get_flow).patch(flows::patch_flow).delete(flows::delete_flow))
        .route("/flows/{name}/run", post(flows::run_flow))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
