//! Federated fallback search across mirror families.
//!
//! # Responsibilities
//! - Try every configured instance in family order, one at a time
//! - Bound each attempt with its own deadline
//! - Return the first non-empty normalized result list
//!
//! # Design Decisions
//! - Strictly sequential: mirrors are never queried concurrently
//! - A failing mirror is a `Skip`, never a request-level error
//! - Exhaustion yields an empty list, not an error
//! - Dropping the `search` future cancels the in-flight call and stops the chain

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, StatusCode};
use thiserror::Error;
use tokio::time::timeout;
use url::Url;

use crate::config::SearchConfig;
use crate::observability::metrics;
use crate::search::normalize::NormalizeError;
use crate::search::registry::{BackendFamily, Registry};
use crate::search::types::{SearchResultItem, MAX_RESULTS};

/// Why an instance attempt did not produce results.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("upstream returned {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Parse(#[from] NormalizeError),

    #[error("no usable results")]
    Empty,

    #[error("instance URL cannot carry a search path")]
    InvalidUrl,
}

impl SkipReason {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::Transport(_) => "transport",
            SkipReason::Timeout(_) => "timeout",
            SkipReason::Status(_) => "status",
            SkipReason::Parse(_) => "parse",
            SkipReason::Empty => "empty",
            SkipReason::InvalidUrl => "invalid_url",
        }
    }
}

/// Outcome of a single instance attempt.
#[derive(Debug)]
pub enum Attempt {
    Success(Vec<SearchResultItem>),
    Skip(SkipReason),
}

/// Queries mirror instances in order until one answers with results.
#[derive(Clone)]
pub struct Aggregator {
    client: reqwest::Client,
    registry: Arc<Registry>,
    config: SearchConfig,
}

impl Aggregator {
    pub fn new(registry: Arc<Registry>, config: SearchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            registry,
            config,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.config.attempt_timeout_ms)
    }

    fn cap(&self) -> usize {
        self.config.max_results.clamp(1, MAX_RESULTS)
    }

    /// Search every family in order; an empty list means nothing answered.
    pub async fn search(&self, query: &str) -> Vec<SearchResultItem> {
        let start = Instant::now();
        let mut attempts = 0usize;

        for family in self.registry.families() {
            for instance in &family.instances {
                attempts += 1;
                match self.attempt(family, instance, query).await {
                    Attempt::Success(items) => {
                        tracing::info!(
                            family = %family.name,
                            instance = %instance,
                            attempts,
                            results = items.len(),
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "Search answered"
                        );
                        metrics::record_search_attempt(&family.name, "success");
                        return items;
                    }
                    Attempt::Skip(reason) => {
                        tracing::warn!(
                            family = %family.name,
                            instance = %instance,
                            reason = %reason,
                            "Search instance skipped, trying next"
                        );
                        metrics::record_search_attempt(&family.name, reason.label());
                    }
                }
            }
        }

        tracing::warn!(
            attempts,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "All search instances exhausted"
        );
        Vec::new()
    }

    /// Query one instance under the per-attempt deadline.
    pub async fn attempt(&self, family: &BackendFamily, instance: &Url, query: &str) -> Attempt {
        let url = match family.shape.search_url(instance, query) {
            Some(url) => url,
            None => return Attempt::Skip(SkipReason::InvalidUrl),
        };

        let deadline = self.attempt_timeout();
        match timeout(deadline, self.fetch_and_normalize(family, url)).await {
            Ok(Ok(items)) if items.is_empty() => Attempt::Skip(SkipReason::Empty),
            Ok(Ok(items)) => Attempt::Success(items),
            Ok(Err(reason)) => Attempt::Skip(reason),
            Err(_) => Attempt::Skip(SkipReason::Timeout(deadline)),
        }
    }

    async fn fetch_and_normalize(
        &self,
        family: &BackendFamily,
        url: Url,
    ) -> Result<Vec<SearchResultItem>, SkipReason> {
        tracing::debug!(family = %family.name, url = %url, "Querying search instance");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, format!("max-age={}", self.config.cache_ttl_secs))
            .send()
            .await
            .map_err(|e| SkipReason::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkipReason::Status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SkipReason::Transport(e.to_string()))?;

        Ok(family.shape.normalize(&body, self.cap())?)
    }
}
