//! Configuration loading and typed config structures for Kickoff.
//!
//! The canonical configuration lives in `kickoff-config.yaml`. Every field
//! has a default, so an empty file (or no file at all) yields a working
//! coordinator with a 20-seat roster and voting that closes one hour
//! before kick-off.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use kickoff_types::ParticipantId;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The file parsed but a value is out of range.
    #[error("invalid config: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level coordinator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KickoffConfig {
    /// Roster sizing.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Voting window.
    #[serde(default)]
    pub voting: VotingConfig,

    /// Ban durations and eviction policy.
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Who may run admin commands.
    #[serde(default)]
    pub admins: AdminsConfig,

    /// Event published at startup, if any.
    #[serde(default)]
    pub event: EventConfig,

    /// Notification delivery.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// HTTP command API.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KickoffConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `KICKOFF_HOST` and `KICKOFF_PORT` override the server section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.server.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roster.capacity == 0 {
            return Err(ConfigError::Invalid {
                reason: "roster.capacity must be at least 1".to_owned(),
            });
        }
        if self.notifications.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                reason: "notifications.max_attempts must be at least 1".to_owned(),
            });
        }
        if self.moderation.no_show_ban_days == 0 {
            return Err(ConfigError::Invalid {
                reason: "moderation.no_show_ban_days must be at least 1".to_owned(),
            });
        }
        if self.moderation.ban_presets_days.contains(&0) {
            return Err(ConfigError::Invalid {
                reason: "moderation.ban_presets_days entries must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Roster sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Number of seats; overflow goes to the waitlist.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Voting window configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VotingConfig {
    /// Minutes before kick-off at which votes stop being accepted.
    #[serde(default = "default_close_before_minutes")]
    pub close_before_minutes: u32,
}

impl VotingConfig {
    /// The close offset as a [`TimeDelta`].
    pub fn close_before(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.close_before_minutes))
    }
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            close_before_minutes: default_close_before_minutes(),
        }
    }
}

/// Moderation policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModerationConfig {
    /// Length of the automatic ban written by a no-show.
    #[serde(default = "default_no_show_ban_days")]
    pub no_show_ban_days: u32,

    /// Durations offered in the admin ban menu.
    #[serde(default = "default_ban_presets_days")]
    pub ban_presets_days: Vec<u32>,

    /// Whether an admin ban also removes the participant from the roster
    /// or waitlist. Off by default: a ban only restricts future votes.
    #[serde(default)]
    pub evict_on_ban: bool,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            no_show_ban_days: default_no_show_ban_days(),
            ban_presets_days: default_ban_presets_days(),
            evict_on_ban: false,
        }
    }
}

/// Admin identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdminsConfig {
    /// The bot owner; always an admin.
    #[serde(default)]
    pub owner_id: Option<ParticipantId>,

    /// Group admins.
    #[serde(default)]
    pub admin_ids: Vec<ParticipantId>,
}

/// Event published at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventConfig {
    /// Headline. The event is only published when `starts_at` is also set.
    #[serde(default = "default_event_title")]
    pub title: String,

    /// Free-form details.
    #[serde(default)]
    pub description: String,

    /// Kick-off time (RFC 3339).
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            title: default_event_title(),
            description: String::new(),
            starts_at: None,
        }
    }
}

/// Notification delivery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationConfig {
    /// Delivery attempts per notification before it is dropped.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt; grows linearly.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// HTTP command API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Override host and port with `KICKOFF_HOST` / `KICKOFF_PORT` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KICKOFF_HOST") {
            self.host = val;
        }
        if let Some(port) = std::env::var("KICKOFF_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.port = port;
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_capacity() -> usize {
    kickoff_roster::DEFAULT_CAPACITY
}

const fn default_close_before_minutes() -> u32 {
    60
}

const fn default_no_show_ban_days() -> u32 {
    7
}

fn default_ban_presets_days() -> Vec<u32> {
    vec![7, 14, 30]
}

fn default_event_title() -> String {
    "Saturday Social Soccer".to_owned()
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
