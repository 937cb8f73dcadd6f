//! Discord REST client.

use anyhow::{Context, Result};
use std::time::Duration;

use super::models::{CreateMessage, Message};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Minimal Discord REST client authenticated as a bot.
pub struct DiscordRest {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl DiscordRest {
    pub fn new(base_url: String, token: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .user_agent(concat!(
                "DiscordBot (discordarr, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Post a message to a channel.
    pub async fn create_message(&self, channel_id: &str, message: &CreateMessage) -> Result<Message> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(message)
            .send()
            .await
            .context("Failed to connect to Discord")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to post message: status {} {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse created message")
    }

    /// Add a unicode emoji reaction as the bot.
    pub async fn add_reaction(&self, channel_id: &str, message_id: &str, emoji: &str) -> Result<()> {
        let url = self.reaction_url(channel_id, message_id, emoji);
        let response = self
            .client
            .put(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .context("Failed to connect to Discord")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to add reaction to message {}: status {}",
                message_id,
                response.status()
            );
        }

        Ok(())
    }

    fn reaction_url(&self, channel_id: &str, message_id: &str, emoji: &str) -> String {
        format!(
            "{}/channels/{}/messages/{}/reactions/{}/@me",
            self.base_url,
            channel_id,
            message_id,
            urlencoding::encode(emoji)
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
