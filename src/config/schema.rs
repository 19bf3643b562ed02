//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,

    /// Hosts the passthrough fetcher may contact.
    pub allowlist: AllowlistConfig,

    /// Passthrough fetcher settings.
    pub passthrough: PassthroughConfig,

    /// Search aggregator settings.
    pub search: SearchConfig,

    /// Ordered backend mirror families (primary first).
    pub families: Vec<FamilyConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            allowlist: AllowlistConfig::default(),
            passthrough: PassthroughConfig::default(),
            search: SearchConfig::default(),
            families: default_families(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time an inbound request may take, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// How an allowlist hostname is compared against a target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Host must equal the entry.
    Exact,
    /// Host must equal the entry or be a subdomain of it.
    Suffix,
}

/// A single allowlisted hostname.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AllowlistEntry {
    pub hostname: String,

    #[serde(default = "default_match_mode")]
    pub match_mode: MatchMode,
}

impl AllowlistEntry {
    pub fn exact(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            match_mode: MatchMode::Exact,
        }
    }

    pub fn suffix(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            match_mode: MatchMode::Suffix,
        }
    }
}

fn default_match_mode() -> MatchMode {
    MatchMode::Suffix
}

/// Allowlist configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AllowlistConfig {
    pub entries: Vec<AllowlistEntry>,
}

impl Default for AllowlistConfig {
    fn default() -> Self {
        Self {
            entries: vec![
                AllowlistEntry::suffix("youtube.com"),
                AllowlistEntry::suffix("youtube-nocookie.com"),
                AllowlistEntry::suffix("ytimg.com"),
                AllowlistEntry::suffix("ggpht.com"),
                AllowlistEntry::suffix("googlevideo.com"),
                AllowlistEntry::exact("returnyoutubedislikeapi.com"),
            ],
        }
    }
}

/// Passthrough fetcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// User-Agent sent to upstream hosts.
    pub user_agent: String,

    /// Cache TTL hint in seconds, sent upstream and echoed to the client.
    pub cache_ttl_secs: u64,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of allowlisted redirect hops to follow.
    pub max_redirects: usize,
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            cache_ttl_secs: 300,
            timeout_secs: 15,
            max_redirects: 5,
        }
    }
}

/// Search aggregator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// User-Agent sent to mirror instances.
    pub user_agent: String,

    /// Deadline for a single instance attempt in milliseconds.
    pub attempt_timeout_ms: u64,

    /// Cache TTL hint in seconds sent with each instance call.
    pub cache_ttl_secs: u64,

    /// Maximum number of items returned (never above 15).
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            attempt_timeout_ms: 6_000,
            cache_ttl_secs: 600,
            max_results: 15,
        }
    }
}

fn default_user_agent() -> String {
    format!("edge-gateway/{}", env!("CARGO_PKG_VERSION"))
}

/// Response shape spoken by a backend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// Top-level array of typed entries (`/api/v1/search`).
    Invidious,
    /// Object with an `items` array (`/search`).
    Piped,
}

/// A family of interchangeable mirror instances sharing one response shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FamilyConfig {
    /// Family identifier for logging/metrics.
    pub name: String,

    pub shape: ResponseShape,

    /// Base URLs, tried in order.
    pub instances: Vec<String>,
}

fn default_families() -> Vec<FamilyConfig> {
    vec![
        FamilyConfig {
            name: "invidious".to_string(),
            shape: ResponseShape::Invidious,
            instances: vec![
                "https://inv.nadeko.net".to_string(),
                "https://invidious.nerdvpn.de".to_string(),
                "https://yewtu.be".to_string(),
            ],
        },
        FamilyConfig {
            name: "piped".to_string(),
            shape: ResponseShape::Piped,
            instances: vec![
                "https://pipedapi.kavin.rocks".to_string(),
                "https://pipedapi.adminforge.de".to_string(),
            ],
        },
    ]
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
