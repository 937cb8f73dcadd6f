//! [`Notifier`] backed by a Discord channel.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::models::CreateMessage;
use super::rest::DiscordRest;
use crate::catalog::CatalogItem;
use crate::error::{BridgeError, BridgeResult};
use crate::notifications::{NotificationHandle, Notifier};

/// Posts offers to one channel and attaches the confirmation reaction.
pub struct DiscordNotifier {
    rest: Arc<DiscordRest>,
    channel_id: String,
    confirm_emoji: String,
}

impl DiscordNotifier {
    pub fn new(rest: Arc<DiscordRest>, channel_id: String, confirm_emoji: String) -> Self {
        Self {
            rest,
            channel_id,
            confirm_emoji,
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn post(&self, item: &CatalogItem) -> BridgeResult<NotificationHandle> {
        let message = self
            .rest
            .create_message(&self.channel_id, &CreateMessage::offer(item))
            .await
            .map_err(|e| BridgeError::NotifierFailed(format!("{:#}", e)))?;

        // The offer exists either way; users can still add the reaction themselves.
        if let Err(e) = self
            .rest
            .add_reaction(&self.channel_id, &message.id, &self.confirm_emoji)
            .await
        {
            warn!(
                "Posted offer for {} [{}] but failed to add confirmation reaction: {:#}",
                item.title, item.id, e
            );
        }

        Ok(NotificationHandle::new(message.id))
    }

    async fn post_added(&self, item: &CatalogItem) -> BridgeResult<()> {
        self.rest
            .create_message(&self.channel_id, &CreateMessage::added(item))
            .await
            .map(|_| ())
            .map_err(|e| BridgeError::NotifierFailed(format!("{:#}", e)))
    }

    async fn say(&self, text: &str) -> BridgeResult<()> {
        self.rest
            .create_message(&self.channel_id, &CreateMessage::text(text))
            .await
            .map(|_| ())
            .map_err(|e| BridgeError::NotifierFailed(format!("{:#}", e)))
    }
}
