//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, CORS, timeout)
//!     → handlers.rs (/proxy, /search, /health)
//!     → passthrough fetcher or search aggregator
//!     → response.rs (envelope: status, headers, JSON errors)
//!     → Send to client
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use response::{ErrorBody, GatewayError, SearchResponse};
pub use server::{AppState, HttpServer, ServerError};
