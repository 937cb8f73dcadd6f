mod file_config;

pub use file_config::{BotConfig, FileConfig, RadarrConfig, ReconcileConfig, TmdbConfig};

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

use crate::catalog::MovieCategory;
use crate::discord::{DEFAULT_API_BASE, DEFAULT_GATEWAY_URL};
use crate::library::AcquisitionDefaults;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_CONFIRM_EMOJI: &str = "\u{1F44D}";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub log_file: Option<PathBuf>,
    pub radarr_url: Option<String>,
    pub root_folder_path: Option<String>,
    pub months_ahead: Option<u32>,
    pub reconcile_interval_minutes: u64,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_file: Option<PathBuf>,
    pub tmdb: TmdbSettings,
    pub radarr: RadarrSettings,
    pub acquisition: AcquisitionDefaults,
    pub bot: BotSettings,
    pub reconcile: ReconcileSettings,
}

#[derive(Debug, Clone)]
pub struct TmdbSettings {
    pub api_key: String,
    pub language: String,
    pub base_url: String,
    pub timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct RadarrSettings {
    pub url: String,
    pub api_key: String,
    pub timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub token: String,
    pub prefix: String,
    pub channel_id: String,
    pub confirm_emoji: String,
    pub api_base_url: String,
    pub gateway_url: String,
}

#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    pub months_ahead: Option<u32>,
    pub interval_minutes: u64,
    pub category: MovieCategory,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            months_ahead: None,
            interval_minutes: 0,
            category: MovieCategory::Upcoming,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let log_file = file
            .log_file
            .map(PathBuf::from)
            .or_else(|| cli.log_file.clone());

        // TMDB
        let tmdb_file = file.tmdb.unwrap_or_default();
        let tmdb = TmdbSettings {
            api_key: required(tmdb_file.api_key, "tmdb.api_key")?,
            language: tmdb_file.language.unwrap_or_else(|| "en-US".to_string()),
            base_url: tmdb_file
                .base_url
                .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string()),
            timeout_sec: tmdb_file.timeout_sec.unwrap_or(30),
        };

        // Radarr
        let radarr_file = file.radarr.unwrap_or_default();
        let radarr_url = radarr_file
            .url
            .or_else(|| cli.radarr_url.clone())
            .ok_or_else(|| {
                anyhow!("radarr.url must be specified via --radarr-url or in config file")
            })?;
        if !radarr_url.starts_with("http://") && !radarr_url.starts_with("https://") {
            bail!("radarr.url must be an http(s) URL: {}", radarr_url);
        }
        let radarr = RadarrSettings {
            url: radarr_url,
            api_key: required(radarr_file.api_key, "radarr.api_key")?,
            timeout_sec: radarr_file.timeout_sec.unwrap_or(30),
        };

        let defaults = AcquisitionDefaults::default();
        let acquisition = AcquisitionDefaults {
            quality_profile_id: radarr_file
                .quality_profile_id
                .unwrap_or(defaults.quality_profile_id),
            root_folder_path: radarr_file
                .root_folder_path
                .or_else(|| cli.root_folder_path.clone())
                .unwrap_or(defaults.root_folder_path),
            monitored: radarr_file.monitored.unwrap_or(defaults.monitored),
            search_on_add: radarr_file.search_on_add.unwrap_or(defaults.search_on_add),
        };

        // Discord bot
        let bot_file = file.bot.unwrap_or_default();
        let channel_id = required(bot_file.channel_id, "bot.channel_id")?;
        if !channel_id.chars().all(|c| c.is_ascii_digit()) {
            bail!("bot.channel_id must be a numeric channel id: {}", channel_id);
        }
        let prefix = bot_file.prefix.unwrap_or_else(|| "!".to_string());
        if prefix.trim().is_empty() {
            bail!("bot.prefix must not be empty");
        }
        let bot = BotSettings {
            token: required(bot_file.token, "bot.token")?,
            prefix,
            channel_id,
            confirm_emoji: bot_file
                .confirm_emoji
                .unwrap_or_else(|| DEFAULT_CONFIRM_EMOJI.to_string()),
            api_base_url: bot_file
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            gateway_url: bot_file
                .gateway_url
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
        };

        // Reconciliation
        let reconcile_file = file.reconcile.unwrap_or_default();
        let category_name = reconcile_file.category.or_else(|| cli.category.clone());
        let category = match category_name {
            Some(name) => MovieCategory::from_str(&name)
                .ok_or_else(|| anyhow!("Unknown reconcile category: {}", name))?,
            None => MovieCategory::Upcoming,
        };
        let reconcile = ReconcileSettings {
            months_ahead: reconcile_file.months_ahead.or(cli.months_ahead),
            interval_minutes: reconcile_file
                .interval_minutes
                .unwrap_or(cli.reconcile_interval_minutes),
            category,
        };

        Ok(Self {
            log_file,
            tmdb,
            radarr,
            acquisition,
            bot,
            reconcile,
        })
    }
}

/// Secrets and ids that have no sensible default.
fn required(value: Option<String>, key: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("{} must be specified in config file", key),
    }
}
