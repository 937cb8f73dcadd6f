//! Reconciliation of catalog listings against the library.

mod engine;

pub use engine::{missing, retain_release_month, MissingReport, ReconciliationEngine};
