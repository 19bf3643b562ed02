//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Passthrough request:
//!     → allowlist.rs (is the target host allowed?)
//!     → Pass to passthrough fetcher, or reject with 403
//! ```
//!
//! # Design Decisions
//! - Fail closed: anything that does not parse or match is rejected
//! - No trust in client input

pub mod allowlist;

pub use allowlist::Allowlist;
