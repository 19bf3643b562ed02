//! Edge gateway library: allowlisted passthrough fetching and federated
//! fallback search over mirror families.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod passthrough;
pub mod search;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
