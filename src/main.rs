use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;
use std::{fmt::Debug, path::PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use discordarr::bot::{spawn_reconcile_ticker, EventRouter, RouterSettings};
use discordarr::bridge::Bridge;
use discordarr::catalog::{CatalogGateway, TmdbClient};
use discordarr::config;
use discordarr::discord::{DiscordGateway, DiscordNotifier, DiscordRest};
use discordarr::library::{LibraryGateway, RadarrClient};
use discordarr::notifications::Notifier;

/// Chat events buffered between the gateway and the router.
const EVENT_BUFFER: usize = 256;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[clap(version, about = "Offers missing TMDB movies on Discord and adds confirmed ones to Radarr")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path, default_value = "discordarr.toml")]
    pub config: PathBuf,

    /// Also write logs to this file.
    #[clap(long, value_parser = parse_path)]
    pub log_file: Option<PathBuf>,

    /// Base URL of the Radarr instance.
    #[clap(long)]
    pub radarr_url: Option<String>,

    /// Radarr root folder new movies are stored in.
    #[clap(long)]
    pub root_folder_path: Option<String>,

    /// Only offer movies released in the current month.
    #[clap(long)]
    pub months_ahead: Option<u32>,

    /// Minutes between scheduled reconciliation passes. Set to 0 to disable them.
    #[clap(long, default_value_t = 0)]
    pub reconcile_interval_minutes: u64,

    /// Listing checked by scheduled passes (upcoming, popular, now_playing, top_rated).
    #[clap(long)]
    pub category: Option<String>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            log_file: args.log_file.clone(),
            radarr_url: args.radarr_url.clone(),
            root_folder_path: args.root_folder_path.clone(),
            months_ahead: args.months_ahead,
            reconcile_interval_minutes: args.reconcile_interval_minutes,
            category: args.category.clone(),
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let file_config = config::FileConfig::load(&cli_args.config)?;
    let app_config = config::AppConfig::resolve(&(&cli_args).into(), Some(file_config))?;

    init_logging(app_config.log_file.as_ref())?;
    info!("Loaded configuration from {:?}", cli_args.config);

    let tmdb = TmdbClient::new(
        app_config.tmdb.base_url.clone(),
        app_config.tmdb.api_key.clone(),
        app_config.tmdb.language.clone(),
        app_config.tmdb.timeout_sec,
    )?;
    info!("TMDB configured at {}", tmdb.base_url());
    let catalog: Arc<dyn CatalogGateway> = Arc::new(tmdb);

    let radarr = RadarrClient::new(
        app_config.radarr.url.clone(),
        app_config.radarr.api_key.clone(),
        app_config.radarr.timeout_sec,
    )?;
    info!("Radarr configured at {}", radarr.base_url());
    let library: Arc<dyn LibraryGateway> = Arc::new(radarr);

    let rest = Arc::new(DiscordRest::new(
        app_config.bot.api_base_url.clone(),
        app_config.bot.token.clone(),
        30,
    )?);
    let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(
        rest,
        app_config.bot.channel_id.clone(),
        app_config.bot.confirm_emoji.clone(),
    ));

    if let Some(months) = app_config.reconcile.months_ahead {
        info!(
            "Release month filter enabled (months_ahead = {}): only movies released this month are offered",
            months
        );
    }

    let bridge = Arc::new(Bridge::new(
        catalog,
        library,
        notifier,
        app_config.acquisition.clone(),
        app_config.reconcile.months_ahead,
    ));

    let shutdown_token = CancellationToken::new();

    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
    let (confirm_tx, confirm_rx) = mpsc::channel(EVENT_BUFFER);

    let gateway = Arc::new(DiscordGateway::new(
        app_config.bot.gateway_url.clone(),
        app_config.bot.token.clone(),
        event_tx,
    ));
    let gateway_handle = {
        let gateway = gateway.clone();
        let shutdown = shutdown_token.child_token();
        tokio::spawn(async move { gateway.run(shutdown).await })
    };

    let confirmations_handle = {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.run_confirmations(confirm_rx).await })
    };

    let router = EventRouter::new(
        bridge.clone(),
        RouterSettings {
            channel_id: app_config.bot.channel_id.clone(),
            prefix: app_config.bot.prefix.clone(),
            confirm_emoji: app_config.bot.confirm_emoji.clone(),
        },
        confirm_tx,
    );
    let router_handle = tokio::spawn(router.run(event_rx, shutdown_token.child_token()));

    let ticker_handle = if app_config.reconcile.interval_minutes > 0 {
        Some(spawn_reconcile_ticker(
            bridge.clone(),
            app_config.reconcile.category,
            Duration::from_secs(app_config.reconcile.interval_minutes * 60),
            shutdown_token.child_token(),
        ))
    } else {
        info!("Periodic reconciliation disabled");
        None
    };

    info!("Discordarr is running, press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Received Ctrl+C, initiating graceful shutdown");
    shutdown_token.cancel();

    let _ = gateway_handle.await;
    // The router owns the confirmation sender; once it stops the consumer drains and exits.
    let _ = router_handle.await;
    let _ = confirmations_handle.await;
    if let Some(handle) = ticker_handle {
        let _ = handle.await;
    }

    info!("Discordarr stopped");
    Ok(())
}
