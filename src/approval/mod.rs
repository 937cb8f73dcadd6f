//! Approval module
//!
//! Tracks which posted notification offers which movie and guarantees a
//! notification leads to at most one acquisition request.

mod coordinator;
mod models;

pub use coordinator::ApprovalCoordinator;
pub use models::*;
