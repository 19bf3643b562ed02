//! Route handlers for the gateway's HTTP surface.

use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::response::{GatewayError, SearchResponse};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Default, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub families: usize,
    pub instances: usize,
}

/// `GET /proxy?url=<target>`
pub async fn proxy(
    State(state): State<AppState>,
    params: Result<Query<ProxyParams>, QueryRejection>,
) -> Response {
    let start = Instant::now();
    let params = params.map(|Query(p)| p).unwrap_or_default();

    let response = match state.fetcher.fetch(params.url.as_deref()).await {
        Ok(upstream) => upstream.into_response(),
        Err(e) => e.into_response(),
    };

    metrics::record_request("proxy", response.status().as_u16(), start);
    response
}

/// `GET /search?q=<query>`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let start = Instant::now();
    let query = params
        .ok()
        .and_then(|Query(p)| p.q)
        .filter(|q| !q.trim().is_empty());

    let response = match query {
        Some(q) => SearchResponse(state.aggregator.search(&q).await).into_response(),
        None => GatewayError::MissingParameter("Missing q parameter").into_response(),
    };

    metrics::record_request("search", response.status().as_u16(), start);
    response
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let registry = state.aggregator.registry();
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        families: registry.families().len(),
        instances: registry.instance_count(),
    })
}
