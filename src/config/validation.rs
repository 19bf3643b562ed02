//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, result cap within bounds)
//! - Keep the request deadline above every upstream deadline it wraps
//! - Check allowlist hostnames and mirror instance URLs are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::search::MAX_RESULTS;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("search.max_results must be between 1 and {max}, got {0}", max = MAX_RESULTS)]
    MaxResults(usize),

    #[error("allowlist hostname '{0}' must be a bare lowercase host")]
    AllowlistHost(String),

    #[error("backend family at position {0} has an empty name")]
    FamilyName(usize),

    #[error("backend family '{0}' has no instances")]
    NoInstances(String),

    #[error("backend family '{family}' has invalid instance URL '{url}'")]
    InstanceUrl { family: String, url: String },

    #[error(
        "timeouts.request_secs ({request_ms}ms) must exceed the full search chain \
         ({instances} instances x {attempt_ms}ms)"
    )]
    SearchBudget {
        request_ms: u64,
        attempt_ms: u64,
        instances: usize,
    },

    #[error("timeouts.request_secs ({request_secs}s) must exceed passthrough.timeout_secs ({upstream_secs}s)")]
    PassthroughBudget { request_secs: u64, upstream_secs: u64 },

    #[error("metrics address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let positives = [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("passthrough.timeout_secs", config.passthrough.timeout_secs),
        ("search.attempt_timeout_ms", config.search.attempt_timeout_ms),
    ];
    for (field, value) in positives {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { field });
        }
    }

    let instances: usize = config.families.iter().map(|f| f.instances.len()).sum();
    let request_ms = config.timeouts.request_secs.saturating_mul(1_000);
    let chain_ms = config
        .search
        .attempt_timeout_ms
        .saturating_mul(instances as u64);
    if instances > 0 && request_ms <= chain_ms {
        errors.push(ValidationError::SearchBudget {
            request_ms,
            attempt_ms: config.search.attempt_timeout_ms,
            instances,
        });
    }
    if config.timeouts.request_secs <= config.passthrough.timeout_secs {
        errors.push(ValidationError::PassthroughBudget {
            request_secs: config.timeouts.request_secs,
            upstream_secs: config.passthrough.timeout_secs,
        });
    }

    if config.search.max_results == 0 || config.search.max_results > MAX_RESULTS {
        errors.push(ValidationError::MaxResults(config.search.max_results));
    }

    for entry in &config.allowlist.entries {
        if !is_bare_host(&entry.hostname) {
            errors.push(ValidationError::AllowlistHost(entry.hostname.clone()));
        }
    }

    for (idx, family) in config.families.iter().enumerate() {
        if family.name.trim().is_empty() {
            errors.push(ValidationError::FamilyName(idx));
        }
        if family.instances.is_empty() {
            errors.push(ValidationError::NoInstances(family.name.clone()));
        }
        for instance in &family.instances {
            let valid = Url::parse(instance)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
                .unwrap_or(false);
            if !valid {
                errors.push(ValidationError::InstanceUrl {
                    family: family.name.clone(),
                    url: instance.clone(),
                });
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A hostname with no scheme, port, path or uppercase characters.
fn is_bare_host(host: &str) -> bool {
    !host.is_empty()
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
}
