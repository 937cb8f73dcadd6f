//! Discord adapter
//!
//! REST client for posting, gateway client for receiving events, and the
//! [`crate::notifications::Notifier`] implementation tying them to one channel.

mod gateway;
mod models;
mod notifier;
mod rest;

pub use gateway::{DiscordGateway, DEFAULT_GATEWAY_URL};
pub use models::*;
pub use notifier::DiscordNotifier;
pub use rest::{DiscordRest, DEFAULT_API_BASE};
