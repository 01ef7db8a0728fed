//! Error types for the Pterodactyl exporter.
//!
//! This module defines custom error types using `thiserror` for structured
//! error handling throughout the application, plus the per-stage failure
//! policy that decides whether a failed fetch aborts the pass.

use std::fmt;
use thiserror::Error;

/// Main error type for exporter operations.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Transport-level error talking to the panel
    #[error("Panel API error: {0}")]
    Api(#[from] reqwest::Error),

    /// Panel answered with a non-200 status
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Error parsing a panel API response
    #[error("Failed to parse panel API response: {0}")]
    ParseError(String),

    /// A fatal stage failed for a reason other than its HTTP status
    #[error("Error fetching {stage}{}: {source}", for_server(.server))]
    StageFailed {
        stage: Stage,
        server: Option<String>,
        source: Box<PanelError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Metrics error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// HTTP server error
    #[error("HTTP server error: {0}")]
    Server(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for exporter operations.
pub type Result<T> = std::result::Result<T, PanelError>;

impl PanelError {
    /// Attach the failing stage and server to an error that lacks them.
    pub fn in_stage(self, stage: Stage, server: Option<&str>) -> Self {
        match self {
            PanelError::Fetch(_) | PanelError::StageFailed { .. } => self,
            other => PanelError::StageFailed {
                stage,
                server: server.map(str::to_string),
                source: Box::new(other),
            },
        }
    }
}

fn for_server(server: &Option<String>) -> String {
    server
        .as_deref()
        .map(|name| format!(" for {}", name))
        .unwrap_or_default()
}

/// A fetch that returned something other than HTTP 200.
#[derive(Debug, Error)]
pub struct FetchError {
    /// Which part of the pass issued the request
    pub stage: Stage,
    /// Name of the affected server, when known
    pub server: Option<String>,
    /// HTTP status code returned by the panel
    pub status: u16,
    /// Response body, kept as diagnostic text
    pub detail: String,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error fetching {}", self.stage)?;
        if let Some(server) = &self.server {
            write!(f, " for {}", server)?;
        }
        write!(f, " (HTTP {}): {}", self.status, self.detail)
    }
}

/// The fetch stages of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ServerList,
    Resources,
    Backups,
    GameStatus,
}

/// What a failed stage does to the surrounding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the error and abandon the pass
    Abort,
    /// Swallow the error and fall back to a default value
    Degrade,
}

impl Stage {
    /// Failure policy for this stage.
    pub const fn failure_policy(self) -> FailurePolicy {
        match self {
            Stage::GameStatus => FailurePolicy::Degrade,
            Stage::ServerList | Stage::Resources | Stage::Backups => FailurePolicy::Abort,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::ServerList => "server list",
            Stage::Resources => "resources",
            Stage::Backups => "backups",
            Stage::GameStatus => "game status",
        };
        f.write_str(label)
    }
}
