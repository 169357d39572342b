//! Rejection workflows.
//!
//! Coordinates the record store, download daemon, and library gateways to
//! execute the reject and soft-delete transitions. The store write is
//! authoritative; daemon and filesystem teardown are best-effort.

mod orchestrator;
mod types;

pub use orchestrator::RejectionOrchestrator;
pub use types::*;
