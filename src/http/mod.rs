//! HTTP surface: `axum::Router` serving `/quote`, `/health`,
//! `/metrics`. Follows the teacher's `monitoring/websocket_server.rs`
//! shape (an `axum::Router` built from a cloneable `Arc<AppState>`
//! plus `tower_http`'s `CorsLayer`/`TraceLayer`), minus the websocket
//! upgrade this crate has no use for.

pub mod dto;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router as AxumRouter;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::facade::Router as QuoteRouter;

pub struct AppState {
    pub router: Arc<QuoteRouter>,
    pub metrics_handle: PrometheusHandle,
}

pub fn build_app(router: Arc<QuoteRouter>, metrics_handle: PrometheusHandle) -> AxumRouter {
    let state = Arc::new(AppState { router, metrics_handle });

    AxumRouter::new()
        .route("/health", get(routes::health))
        .route("/quote", get(routes::quote))
        .route("/metrics", get(routes::metrics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
