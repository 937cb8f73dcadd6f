use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub log_file: Option<String>,

    // Service sections
    pub tmdb: Option<TmdbConfig>,
    pub radarr: Option<RadarrConfig>,
    pub bot: Option<BotConfig>,
    pub reconcile: Option<ReconcileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub language: Option<String>,
    pub base_url: Option<String>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RadarrConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub root_folder_path: Option<String>,
    pub quality_profile_id: Option<u32>,
    pub monitored: Option<bool>,
    pub search_on_add: Option<bool>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BotConfig {
    pub token: Option<String>,
    pub prefix: Option<String>,
    pub channel_id: Option<String>,
    pub confirm_emoji: Option<String>,
    pub api_base_url: Option<String>,
    pub gateway_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Enables the same-month release filter.
    pub months_ahead: Option<u32>,
    /// Minutes between scheduled passes; 0 disables them.
    pub interval_minutes: Option<u64>,
    /// Listing used by scheduled passes.
    pub category: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
