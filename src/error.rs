//! Error taxonomy shared by the gateways and the approval workflow.

use thiserror::Error;

use crate::notifications::NotificationHandle;

/// Errors surfaced by gateways, the reconciliation engine and the approval coordinator.
///
/// Adapters work with `anyhow` internally and map failures into these variants at
/// their trait boundary, so the workflow can decide what to tell the channel.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Library unavailable: {0}")]
    LibraryUnavailable(String),

    #[error("Library rejected movie {tmdb_id}: {detail}")]
    LibraryRejected { tmdb_id: i64, detail: String },

    #[error("Notification {0} is already registered")]
    DuplicateNotification(NotificationHandle),

    #[error("Unparsable release date {raw:?} for movie {tmdb_id}")]
    UnparsableReleaseDate { tmdb_id: i64, raw: String },

    #[error("Notifier failed: {0}")]
    NotifierFailed(String),

    #[error("A reconciliation pass is already running")]
    PassInFlight,
}

pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BridgeError::LibraryRejected {
            tmdb_id: 30,
            detail: "This movie has already been added".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Library rejected movie 30: This movie has already been added"
        );

        let err = BridgeError::UnparsableReleaseDate {
            tmdb_id: 7,
            raw: "soon".to_string(),
        };
        assert_eq!(err.to_string(), "Unparsable release date \"soon\" for movie 7");

        let err = BridgeError::DuplicateNotification(NotificationHandle::new("123"));
        assert_eq!(err.to_string(), "Notification 123 is already registered");
    }
}
