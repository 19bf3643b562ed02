//! Response envelope mapping.
//!
//! # Responsibilities
//! - Map gateway errors to status codes and a `{"error": ...}` JSON body
//! - Turn a passthrough outcome into a client response with cache headers
//! - Turn search results into a 200 JSON array
//!
//! # Design Decisions
//! - Every error path produces JSON, never plain text
//! - Upstream status codes are preserved verbatim on passthrough
//! - "No results" is an empty array, never an error

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::passthrough::UpstreamResponse;
use crate::search::SearchResultItem;

/// Request-level failures surfaced to callers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required query parameter was absent or empty.
    #[error("{0}")]
    MissingParameter(&'static str),

    /// The target host is not on the allowlist.
    #[error("Domain not allowed: {0}")]
    ForbiddenHost(String),

    /// The target could not be parsed or is not fetchable.
    #[error("Invalid url param: {0}")]
    InvalidTarget(String),

    /// The upstream could not be reached or did not answer in time.
    #[error("Upstream request failed: {0}")]
    UpstreamUnreachable(String),

    #[error("Internal error: {0}")]
    Unexpected(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            GatewayError::ForbiddenHost(_) => StatusCode::FORBIDDEN,
            GatewayError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MissingParameter(_) => "missing_parameter",
            GatewayError::ForbiddenHost(_) => "forbidden_host",
            GatewayError::InvalidTarget(_) => "invalid_target",
            GatewayError::UpstreamUnreachable(_) => "upstream_unreachable",
            GatewayError::Unexpected(_) => "unexpected",
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, self.content_type);
        if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", self.cache_ttl_secs)) {
            headers.insert(header::CACHE_CONTROL, value);
        }
        response
    }
}

/// Successful search envelope: always 200 with a JSON array.
pub struct SearchResponse(pub Vec<SearchResultItem>);

impl IntoResponse for SearchResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}
