//! Discordarr Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod approval;
pub mod bot;
pub mod bridge;
pub mod catalog;
pub mod config;
pub mod discord;
pub mod error;
pub mod library;
pub mod notifications;
pub mod reconcile;

// Re-export commonly used types for convenience
pub use approval::ApprovalCoordinator;
pub use bridge::{Bridge, PassReport};
pub use catalog::{CatalogGateway, CatalogItem, MovieCategory};
pub use error::{BridgeError, BridgeResult};
pub use library::{AcquisitionDefaults, LibraryGateway};
pub use notifications::{Actor, ConfirmationEvent, NotificationHandle, Notifier};
pub use reconcile::ReconciliationEngine;
