//! Chat notifications module
//!
//! The workflow posts offers and status lines through the [`Notifier`] trait and
//! receives [`ConfirmationEvent`]s back on a channel. The Discord adapter lives in
//! [`crate::discord`].

mod models;

pub use models::{Actor, ConfirmationEvent, NotificationHandle};

use async_trait::async_trait;

use crate::catalog::CatalogItem;
use crate::error::BridgeResult;

/// Outbound side of the chat channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post an offer for `item` with its confirmation affordance attached.
    async fn post(&self, item: &CatalogItem) -> BridgeResult<NotificationHandle>;

    /// Announce that `item` was handed to the library.
    async fn post_added(&self, item: &CatalogItem) -> BridgeResult<()>;

    /// Post a plain status line.
    async fn say(&self, text: &str) -> BridgeResult<()>;
}
