//! Federated search subsystem.
//!
//! # Data Flow
//! ```text
//! GET /search?q=<query>
//!     → registry.rs (ordered families and instances)
//!     → aggregator.rs (sequential attempts, per-attempt deadline)
//!     → normalize.rs (family payload → SearchResultItem)
//!     → first non-empty list, or []
//! ```
//!
//! # Design Decisions
//! - Registry is immutable configuration injected at construction
//! - Every request restarts from the top of the list; no health memory
//! - Results are capped at MAX_RESULTS

pub mod aggregator;
pub mod normalize;
pub mod registry;
pub mod types;

pub use aggregator::{Aggregator, Attempt, SkipReason};
pub use registry::{BackendFamily, Registry, RegistryError};
pub use types::{SearchResultItem, MAX_RESULTS};
