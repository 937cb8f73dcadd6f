//! Data models for the approval workflow.

use chrono::{DateTime, Utc};

use crate::catalog::CatalogItem;
use crate::library::AcquisitionRequest;
use crate::notifications::{Actor, NotificationHandle};

/// Approval state of a posted notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Pending,
    Resolved, // terminal
}

/// A posted offer and the catalog movie it advertises. Never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub handle: NotificationHandle,
    pub catalog_id: i64,
    pub title: String,
    pub registered_at: DateTime<Utc>,
}

/// A freshly registered notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub notification: Notification,
    /// A confirmation that arrived before the notification was registered.
    /// The caller must feed it back through the normal confirmation path.
    pub early_confirmation: Option<Actor>,
}

/// Why a confirmation event didn't lead to an acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The event came from the bot's own account.
    SelfTriggered,
    /// An earlier confirmation already resolved the notification.
    AlreadyResolved,
    /// The handle is not tracked (yet). The confirmation is held briefly in
    /// case its notification is still being registered.
    UnknownNotification,
}

impl std::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoOpReason::SelfTriggered => write!(f, "self-triggered"),
            NoOpReason::AlreadyResolved => write!(f, "already resolved"),
            NoOpReason::UnknownNotification => write!(f, "unknown notification"),
        }
    }
}

/// Result of feeding one confirmation event to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// First valid confirmation: the caller must submit `request`, once.
    Acquire {
        notification: Notification,
        item: CatalogItem,
        request: AcquisitionRequest,
    },
    NoOp(NoOpReason),
}

impl Resolution {
    pub fn is_noop(&self) -> bool {
        matches!(self, Resolution::NoOp(_))
    }
}
