//! Bot runtime: chat event routing and scheduled reconciliation.

mod router;
mod ticker;

pub use router::{EventRouter, Routed, RouterSettings};
pub use ticker::spawn_reconcile_ticker;
