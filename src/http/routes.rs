use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::facade::QuoteRequest;
use crate::http::dto::{
    ErrorResponse, GraphStatsDto, HealthResponse, QuoteDto, QuoteQuery, QuoteResponse,
};
use crate::http::AppState;

impl IntoResponse for crate::error::RouterError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.kind(), message: self.to_string() };
        (status, Json(body)).into_response()
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let graph = state.router.graph();
    let status = if state.router.is_degraded() { "degraded" } else { "healthy" };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        chain_id: state.router.config().chain_id,
        graph_stats: GraphStatsDto {
            token_count: graph.token_count(),
            pool_count: graph.pool_count(),
            last_update_unix_seconds: graph.last_update_unix_seconds(),
        },
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    crate::metrics::render(&state.metrics_handle)
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, crate::error::RouterError> {
    let config = state.router.config();
    let max_hops = query.max_hops.unwrap_or(config.max_hops_default);
    let max_splits = query.max_splits.unwrap_or(config.max_splits_default);
    let deadline = crate::facade::default_deadline(config.request_deadline_ms);

    let req = QuoteRequest {
        token_in: query.token_in,
        token_out: query.token_out,
        amount_in: query.amount_in,
        slippage_bps: query.slippage_bps,
        max_hops,
        max_splits,
        deadline,
    };

    let router = Arc::clone(&state.router);
    let result = tokio::task::spawn_blocking(move || router.quote(req))
        .await
        .unwrap_or_else(|join_err| {
            error!(%join_err, "quote task panicked");
            Err(crate::error::RouterError::Internal("quote worker panicked".to_string()))
        })?;

    Ok(Json(QuoteResponse {
        quote: QuoteDto::from(&result.quote),
        timestamp: result.produced_at_unix,
        cached: result.cached,
    }))
}
