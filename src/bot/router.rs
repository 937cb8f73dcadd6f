//! Routing of chat events to the workflow.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::{BotCommand, Bridge};
use crate::discord::ChatEvent;
use crate::notifications::{Actor, ConfirmationEvent, NotificationHandle};

/// Settings restricting which chat events are acted upon.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub channel_id: String,
    pub prefix: String,
    pub confirm_emoji: String,
}

/// What the router did with one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    Ready,
    Command(BotCommand),
    Confirmation(ConfirmationEvent),
    Ignored,
}

/// Turns raw chat events into commands and confirmation events.
///
/// Commands run on their own tasks so a long pass never delays confirmations.
/// Confirmations are forwarded, in arrival order, to a single consumer.
pub struct EventRouter {
    bridge: Arc<Bridge>,
    settings: RouterSettings,
    confirmations: mpsc::Sender<ConfirmationEvent>,
    self_user_id: Option<String>,
}

impl EventRouter {
    pub fn new(
        bridge: Arc<Bridge>,
        settings: RouterSettings,
        confirmations: mpsc::Sender<ConfirmationEvent>,
    ) -> Self {
        Self {
            bridge,
            settings,
            confirmations,
            self_user_id: None,
        }
    }

    /// Route events until the stream closes or `shutdown` is cancelled.
    pub async fn run(mut self, mut events: mpsc::Receiver<ChatEvent>, shutdown: CancellationToken) {
        info!(
            "Listening on channel {} only (prefix {:?})",
            self.settings.channel_id, self.settings.prefix
        );

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.route(event).await;
                    }
                    None => break,
                },
                _ = shutdown.cancelled() => {
                    info!("Event router received shutdown signal");
                    break;
                }
            }
        }

        info!("Event router stopped");
    }

    /// Act on one chat event.
    pub async fn route(&mut self, event: ChatEvent) -> Routed {
        match event {
            ChatEvent::Ready { user } => {
                info!("Logged in as {} (bot user id {})", user.username, user.id);
                self.bridge
                    .coordinator()
                    .set_system_actor(Actor::new(user.id.clone()))
                    .await;
                self.self_user_id = Some(user.id);
                Routed::Ready
            }
            ChatEvent::MessageCreated(message) => {
                if message.channel_id != self.settings.channel_id
                    || message.author.bot
                    || self.self_user_id.as_deref() == Some(message.author.id.as_str())
                {
                    return Routed::Ignored;
                }

                let Some(command) = BotCommand::parse(&self.settings.prefix, &message.content)
                else {
                    return Routed::Ignored;
                };

                debug!("Command {:?} from {}", command, message.author.id);
                let bridge = self.bridge.clone();
                let spawned = command.clone();
                tokio::spawn(async move {
                    bridge.handle_command(spawned).await;
                });
                Routed::Command(command)
            }
            ChatEvent::ReactionAdded(reaction) => {
                if reaction.channel_id != self.settings.channel_id {
                    return Routed::Ignored;
                }
                if reaction.emoji.name.as_deref() != Some(self.settings.confirm_emoji.as_str()) {
                    debug!(
                        "Ignoring reaction {:?} on {}",
                        reaction.emoji.name, reaction.message_id
                    );
                    return Routed::Ignored;
                }

                // Self-triggered reactions are forwarded too; the coordinator rejects them.
                let event = ConfirmationEvent::new(
                    NotificationHandle::new(reaction.message_id),
                    Actor::new(reaction.user_id),
                );
                if self.confirmations.send(event.clone()).await.is_err() {
                    warn!("Confirmation consumer is gone, dropping {:?}", event);
                    return Routed::Ignored;
                }
                Routed::Confirmation(event)
            }
        }
    }
}
