//! Error types for the coordinator binary.
//!
//! [`EngineError`] wraps every failure mode during startup and serving so
//! `main` can propagate with `?`.

/// Top-level error for the coordinator binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: kickoff_core::config::ConfigError,
    },

    /// The roster could not be created.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: kickoff_roster::RosterError,
    },

    /// The command API server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: kickoff_api::ServerError,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
