//! Upstream passthrough subsystem.
//!
//! # Data Flow
//! ```text
//! GET /proxy?url=<target>
//!     → fetcher.rs (parse target, allowlist check)
//!     → single outbound GET with cache hint
//!     → UpstreamResponse (status, content type, body)
//!     → http/response.rs (envelope with Cache-Control)
//! ```
//!
//! # Design Decisions
//! - Exactly one outbound call per request; no retries here
//! - Validation failures never touch the network
//! - Redirects are only followed while they stay on the allowlist

pub mod fetcher;

pub use fetcher::{PassthroughFetcher, UpstreamResponse};
