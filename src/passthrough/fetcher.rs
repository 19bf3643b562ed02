//! Allowlist-enforced passthrough fetcher.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use reqwest::redirect::Policy;
use url::Url;

use crate::config::PassthroughConfig;
use crate::http::response::GatewayError;
use crate::observability::metrics;
use crate::security::Allowlist;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upstream response captured for the client.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub body: Bytes,
    pub cache_ttl_secs: u64,
}

/// Forwards one GET to an allowlisted host.
#[derive(Clone)]
pub struct PassthroughFetcher {
    client: reqwest::Client,
    allowlist: Arc<Allowlist>,
    config: PassthroughConfig,
}

impl PassthroughFetcher {
    pub fn new(allowlist: Arc<Allowlist>, config: PassthroughConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(allowlisted_redirects(allowlist.clone(), config.max_redirects))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            allowlist,
            config,
        })
    }

    /// Validate a caller-supplied target without touching the network.
    pub fn resolve_target(&self, target: Option<&str>) -> Result<Url, GatewayError> {
        let raw = match target {
            Some(t) if !t.is_empty() => t,
            _ => return Err(GatewayError::MissingParameter("Missing url param")),
        };

        let url = Url::parse(raw).map_err(|e| GatewayError::InvalidTarget(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidTarget(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| GatewayError::InvalidTarget("missing host".to_string()))?;

        if !self.allowlist.is_host_allowed(host) {
            return Err(GatewayError::ForbiddenHost(host.to_string()));
        }

        Ok(url)
    }

    /// Validate `target` and forward a single GET to it.
    pub async fn fetch(&self, target: Option<&str>) -> Result<UpstreamResponse, GatewayError> {
        let url = match self.resolve_target(target) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected passthrough target");
                metrics::record_passthrough(e.kind());
                return Err(e);
            }
        };

        let start = Instant::now();
        let host = url.host_str().unwrap_or_default().to_string();
        tracing::debug!(host = %host, path = %url.path(), "Forwarding passthrough request");

        let result = self.forward(url).await;
        match &result {
            Ok(upstream) => {
                tracing::debug!(
                    host = %host,
                    status = %upstream.status,
                    bytes = upstream.body.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Passthrough complete"
                );
                metrics::record_passthrough("ok");
            }
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "Passthrough upstream failed");
                metrics::record_passthrough(e.kind());
            }
        }
        result
    }

    async fn forward(&self, url: Url) -> Result<UpstreamResponse, GatewayError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "*/*")
            .header(header::CACHE_CONTROL, format!("max-age={}", self.config.cache_ttl_secs))
            .send()
            .await
            .map_err(describe_transport_error)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

        let body = response.bytes().await.map_err(describe_transport_error)?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
            cache_ttl_secs: self.config.cache_ttl_secs,
        })
    }
}

fn describe_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::UpstreamUnreachable("upstream timed out".to_string())
    } else {
        GatewayError::UpstreamUnreachable(e.to_string())
    }
}

/// Follow redirects only while each hop stays on an allowlisted http(s) host.
fn allowlisted_redirects(allowlist: Arc<Allowlist>, max_redirects: usize) -> Policy {
    Policy::custom(move |attempt| {
        let url = attempt.url();
        let on_list = matches!(url.scheme(), "http" | "https") && allowlist.is_url_allowed(url);
        if attempt.previous().len() > max_redirects {
            attempt.stop()
        } else if on_list {
            attempt.follow()
        } else {
            tracing::warn!(location = %url, "Not following redirect off the allowlist");
            attempt.stop()
        }
    })
}
