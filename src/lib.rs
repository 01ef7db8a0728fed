//! # Pterodactyl Exporter
//!
//! A Prometheus metrics exporter for Pterodactyl game-server panels.
//!
//! ## Overview
//!
//! Each scrape runs one *pass* against the panel client API and produces a
//! [`report::MetricsReport`] with one record per active server:
//!
//! - Static limits (memory, swap, disk, IO weight, CPU)
//! - Live resource usage (memory, CPU, disk, network, uptime)
//! - Timestamp of the most recent successful backup
//! - Game status (players online/max, version) where the panel exposes it
//!
//! ## Quick Start
//!
//! ```no_run
//! use pterodactyl_exporter::{config::Settings, client::PanelClient, metrics::MetricsCollector, server::start_server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load(Some("config/default.toml"))?;
//!     let client = PanelClient::new(settings.panel)?;
//!     let metrics = MetricsCollector::new(std::sync::Arc::new(client))?;
//!
//!     start_server(&settings.exporter.listen_address, metrics).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! The exporter can be configured via:
//! - TOML configuration file
//! - Environment variables (with `PTERODACTYL_EXPORTER_` prefix)
//! - Command-line arguments
//!
//! See [`config::Settings`] for details.
//!
//! ## Modules
//!
//! - [`client`] - Panel API gateway and wire types
//! - [`config`] - Configuration management
//! - [`error`] - Error types and failure policies
//! - [`metrics`] - Prometheus rendering of a report
//! - [`poller`] - Server enumeration and per-server enrichment
//! - [`report`] - The per-pass metrics report
//! - [`server`] - HTTP server for exposing metrics
//! - [`units`] - Unit conversion helpers

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod poller;
pub mod report;
pub mod server;
pub mod units;

pub use error::{PanelError, Result};
