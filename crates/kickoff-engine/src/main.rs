//! Kickoff coordinator binary.
//!
//! Wires configuration, logging, the coordinator service, the
//! notification dispatcher, and the HTTP command API together, then serves
//! until the process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$KICKOFF_CONFIG` or `kickoff-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the admin capability check and the coordinator service
//! 4. Spawn the notification dispatcher
//! 5. Serve the command API

mod error;
mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use kickoff_api::AppState;
use kickoff_core::CoordinatorService;
use kickoff_core::capability::StaticAdmins;
use kickoff_core::config::{KickoffConfig, LogFormat, LoggingConfig};
use kickoff_core::notify;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::sink::TracingSink;

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "kickoff-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the roster cannot be
/// built, or the server fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("kickoff-engine starting");
    match config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        capacity = config.roster.capacity,
        close_before_minutes = config.voting.close_before_minutes,
        no_show_ban_days = config.moderation.no_show_ban_days,
        evict_on_ban = config.moderation.evict_on_ban,
        admins = config.admins.admin_ids.len(),
        "Coordinator configured"
    );

    // 3. Build the service.
    let admins = Arc::new(StaticAdmins::from_config(&config.admins));
    let (outbox, inbox) = notify::outbox();
    let service = Arc::new(CoordinatorService::new(&config, admins, outbox)?);
    if let Some(event) = service.event().await {
        info!(title = event.title, starts_at = %event.starts_at, "Event scheduled from config");
    }

    // 4. Spawn the notification dispatcher.
    let _dispatcher = tokio::spawn(notify::dispatch(
        inbox,
        TracingSink,
        config.notifications.clone(),
    ));
    info!(
        max_attempts = config.notifications.max_attempts,
        retry_backoff_ms = config.notifications.retry_backoff_ms,
        "Notification dispatcher started"
    );

    // 5. Serve the command API.
    let state = Arc::new(AppState::new(service));
    kickoff_api::start_server(&config.server, state).await?;

    info!("kickoff-engine shutdown complete");
    Ok(())
}

/// Load configuration from `$KICKOFF_CONFIG`, falling back to
/// `kickoff-config.yaml`, falling back to defaults.
///
/// An explicitly named file that does not exist is an error.
fn load_config() -> Result<(KickoffConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = std::env::var_os("KICKOFF_CONFIG").map(PathBuf::from) {
        let config = KickoffConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = KickoffConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = KickoffConfig::default();
        config.server.apply_env_overrides();
        Ok((config, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}
