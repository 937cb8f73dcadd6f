//! Discord API types.
//!
//! Only the fields this bot reads or writes are modelled.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::catalog::CatalogItem;

/// Embed colour for movie offers.
pub const OFFER_COLOUR: u32 = 0xb45818;

/// Embed colour for movies handed to the library.
pub const ADDED_COLOUR: u32 = 0x96ff00;

pub const EMBED_AUTHOR: &str = "Discordarr";

// =============================================================================
// REST
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    pub author: EmbedAuthor,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl Embed {
    /// Movie card used for both offers and completion announcements.
    pub fn for_movie(item: &CatalogItem, color: u32) -> Self {
        let poster = item.poster_display_url();
        Self {
            title: format!("{} [{}]", item.title, item.id),
            url: poster.clone(),
            description: item.overview.clone(),
            color,
            thumbnail: poster.map(|url| EmbedImage { url }),
            author: EmbedAuthor {
                name: EMBED_AUTHOR.to_string(),
            },
            footer: EmbedFooter {
                text: item.id.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateMessage {
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

impl CreateMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embeds: Vec::new(),
        }
    }

    /// Offer message: "<title> (Released: <date>)" with the movie card.
    pub fn offer(item: &CatalogItem) -> Self {
        Self {
            content: format!("{} (Released: {})", item.title, item.release_label()),
            embeds: vec![Embed::for_movie(item, OFFER_COLOUR)],
        }
    }

    /// Completion message: "<title> (Added to Radarr)" with the movie card.
    pub fn added(item: &CatalogItem) -> Self {
        Self {
            content: format!("{} (Added to Radarr)", item.title),
            embeds: vec![Embed::for_movie(item, ADDED_COLOUR)],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub content: String,
    pub author: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

// =============================================================================
// Gateway
// =============================================================================

pub mod opcodes {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

pub mod intents {
    pub const GUILDS: u64 = 1 << 0;
    pub const GUILD_MESSAGES: u64 = 1 << 9;
    pub const GUILD_MESSAGE_REACTIONS: u64 = 1 << 10;
    pub const MESSAGE_CONTENT: u64 = 1 << 15;

    pub const BOT: u64 = GUILDS | GUILD_MESSAGES | GUILD_MESSAGE_REACTIONS | MESSAGE_CONTENT;
}

/// Envelope of every gateway frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    pub fn heartbeat(sequence: Option<u64>) -> Self {
        Self {
            op: opcodes::HEARTBEAT,
            d: serde_json::json!(sequence),
            s: None,
            t: None,
        }
    }

    pub fn identify(token: &str, intents: u64) -> Self {
        Self {
            op: opcodes::IDENTIFY,
            d: serde_json::json!({
                "token": token,
                "intents": intents,
                "properties": {
                    "os": std::env::consts::OS,
                    "browser": "discordarr",
                    "device": "discordarr",
                },
            }),
            s: None,
            t: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactionAdd {
    pub user_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub emoji: ReactionEmoji,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactionEmoji {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Gateway dispatches the bot cares about.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Ready { user: User },
    MessageCreated(Message),
    ReactionAdded(ReactionAdd),
}

impl ChatEvent {
    /// Decode a dispatch frame; `None` for event types the bot ignores.
    pub fn from_dispatch(event_type: &str, data: JsonValue) -> Result<Option<Self>, serde_json::Error> {
        let event = match event_type {
            "READY" => {
                let ready: Ready = serde_json::from_value(data)?;
                ChatEvent::Ready { user: ready.user }
            }
            "MESSAGE_CREATE" => ChatEvent::MessageCreated(serde_json::from_value(data)?),
            "MESSAGE_REACTION_ADD" => ChatEvent::ReactionAdded(serde_json::from_value(data)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}
