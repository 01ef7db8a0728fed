//! Prometheus metrics definitions and collection logic.
//!
//! This module defines all Prometheus metrics exposed by the exporter and
//! renders them from the [`MetricsReport`] of a fresh polling pass.

use crate::client::PanelClient;
use crate::error::{PanelError, Result};
use crate::poller::Poller;
use crate::report::{MetricsReport, ServerMetrics};
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

const SERVER_LABELS: &[&str] = &["server_name", "server_id"];

/// Metrics collector for the exporter.
#[derive(Clone)]
pub struct MetricsCollector {
    poller: Poller,
    registry: Registry,

    // Exporter metrics
    up: Gauge,
    servers: Gauge,
    scrape_duration_seconds: Gauge,

    // Resource usage
    memory_mebibytes: GaugeVec,
    cpu_percent: GaugeVec,
    disk_mebibytes: GaugeVec,
    network_rx_mebibytes: GaugeVec,
    network_tx_mebibytes: GaugeVec,
    uptime_milliseconds: GaugeVec,

    // Limits
    memory_limit: GaugeVec,
    swap_limit: GaugeVec,
    disk_limit: GaugeVec,
    io_weight: GaugeVec,
    cpu_limit: GaugeVec,

    // Backups
    last_backup_timestamp_seconds: GaugeVec,

    // Game status
    players_online: GaugeVec,
    players_max: GaugeVec,
    version_protocol: GaugeVec,
}

fn register_gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge> {
    let gauge =
        Gauge::with_opts(Opts::new(name, help)).map_err(|e| PanelError::Metrics(e.to_string()))?;
    registry
        .register(Box::new(gauge.clone()))
        .map_err(|e| PanelError::Metrics(e.to_string()))?;
    Ok(gauge)
}

fn register_gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec> {
    let gauge = GaugeVec::new(Opts::new(name, help), labels)
        .map_err(|e| PanelError::Metrics(e.to_string()))?;
    registry
        .register(Box::new(gauge.clone()))
        .map_err(|e| PanelError::Metrics(e.to_string()))?;
    Ok(gauge)
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(client: Arc<PanelClient>) -> Result<Self> {
        let registry = Registry::new();

        let up = register_gauge(
            &registry,
            "pterodactyl_up",
            "Whether the last poll of the panel was successful (1 = success, 0 = failure)",
        )?;
        let servers = register_gauge(
            &registry,
            "pterodactyl_servers",
            "Number of active servers in the last successful poll",
        )?;
        let scrape_duration_seconds = register_gauge(
            &registry,
            "pterodactyl_scrape_duration_seconds",
            "Duration of the last poll of the panel in seconds",
        )?;

        let memory_mebibytes = register_gauge_vec(
            &registry,
            "pterodactyl_server_memory_mebibytes",
            "Memory used by the server in MiB",
            SERVER_LABELS,
        )?;
        let cpu_percent = register_gauge_vec(
            &registry,
            "pterodactyl_server_cpu_percent",
            "CPU usage of the server in percent of one core",
            SERVER_LABELS,
        )?;
        let disk_mebibytes = register_gauge_vec(
            &registry,
            "pterodactyl_server_disk_mebibytes",
            "Disk space used by the server in MiB",
            SERVER_LABELS,
        )?;
        let network_rx_mebibytes = register_gauge_vec(
            &registry,
            "pterodactyl_server_network_rx_mebibytes",
            "Data received by the server in MiB",
            SERVER_LABELS,
        )?;
        let network_tx_mebibytes = register_gauge_vec(
            &registry,
            "pterodactyl_server_network_tx_mebibytes",
            "Data sent by the server in MiB",
            SERVER_LABELS,
        )?;
        let uptime_milliseconds = register_gauge_vec(
            &registry,
            "pterodactyl_server_uptime_milliseconds",
            "Uptime of the server in milliseconds",
            SERVER_LABELS,
        )?;

        let memory_limit = register_gauge_vec(
            &registry,
            "pterodactyl_server_memory_limit",
            "Configured memory limit in MiB (0 = unlimited)",
            SERVER_LABELS,
        )?;
        let swap_limit = register_gauge_vec(
            &registry,
            "pterodactyl_server_swap_limit",
            "Configured swap in MiB (-1 = unlimited)",
            SERVER_LABELS,
        )?;
        let disk_limit = register_gauge_vec(
            &registry,
            "pterodactyl_server_disk_limit",
            "Configured disk limit in MiB (0 = unlimited)",
            SERVER_LABELS,
        )?;
        let io_weight = register_gauge_vec(
            &registry,
            "pterodactyl_server_io_weight",
            "Configured block IO weight",
            SERVER_LABELS,
        )?;
        let cpu_limit = register_gauge_vec(
            &registry,
            "pterodactyl_server_cpu_limit",
            "Configured CPU limit in percent of one core (0 = unlimited)",
            SERVER_LABELS,
        )?;

        let last_backup_timestamp_seconds = register_gauge_vec(
            &registry,
            "pterodactyl_server_last_backup_timestamp_seconds",
            "Unix timestamp of the latest successful backup (0 = none)",
            SERVER_LABELS,
        )?;

        let players_online = register_gauge_vec(
            &registry,
            "pterodactyl_server_players_online",
            "Players currently online",
            SERVER_LABELS,
        )?;
        let players_max = register_gauge_vec(
            &registry,
            "pterodactyl_server_players_max",
            "Player slots available",
            SERVER_LABELS,
        )?;
        let version_protocol = register_gauge_vec(
            &registry,
            "pterodactyl_server_version_protocol",
            "Game protocol version, labelled with the version name",
            &["server_name", "server_id", "version"],
        )?;

        Ok(Self {
            poller: Poller::new(client),
            registry,
            up,
            servers,
            scrape_duration_seconds,
            memory_mebibytes,
            cpu_percent,
            disk_mebibytes,
            network_rx_mebibytes,
            network_tx_mebibytes,
            uptime_milliseconds,
            memory_limit,
            swap_limit,
            disk_limit,
            io_weight,
            cpu_limit,
            last_backup_timestamp_seconds,
            players_online,
            players_max,
            version_protocol,
        })
    }

    /// Run one polling pass and refresh all metrics from its report.
    pub async fn collect(&self) -> Result<()> {
        info!("Collecting metrics from panel");
        self.reset();

        let started = Instant::now();
        let result = self.poller.poll().await;
        self.scrape_duration_seconds
            .set(started.elapsed().as_secs_f64());

        match result {
            Ok(report) => {
                self.update(&report);
                self.up.set(1.0);
                info!("Successfully collected metrics");
                Ok(())
            }
            Err(e) => {
                error!("Failed to collect metrics: {}", e);
                self.up.set(0.0);
                Err(e)
            }
        }
    }

    // Servers can disappear between passes; drop every labelled series first.
    fn reset(&self) {
        self.up.set(0.0);
        self.servers.set(0.0);

        for gauge in [
            &self.memory_mebibytes,
            &self.cpu_percent,
            &self.disk_mebibytes,
            &self.network_rx_mebibytes,
            &self.network_tx_mebibytes,
            &self.uptime_milliseconds,
            &self.memory_limit,
            &self.swap_limit,
            &self.disk_limit,
            &self.io_weight,
            &self.cpu_limit,
            &self.last_backup_timestamp_seconds,
            &self.players_online,
            &self.players_max,
            &self.version_protocol,
        ] {
            gauge.reset();
        }
    }

    fn update(&self, report: &MetricsReport) {
        debug!("Updating metrics for {} servers", report.len());
        self.servers.set(report.len() as f64);

        for server in report {
            self.update_server(server);
        }
    }

    fn update_server(&self, server: &ServerMetrics) {
        let labels = [server.name.as_str(), server.id.as_str()];

        let usage = &server.resources;
        self.memory_mebibytes
            .with_label_values(&labels)
            .set(usage.memory_mib);
        self.cpu_percent
            .with_label_values(&labels)
            .set(usage.cpu_percent);
        self.disk_mebibytes
            .with_label_values(&labels)
            .set(usage.disk_mib);
        self.network_rx_mebibytes
            .with_label_values(&labels)
            .set(usage.rx_mib);
        self.network_tx_mebibytes
            .with_label_values(&labels)
            .set(usage.tx_mib);
        self.uptime_milliseconds
            .with_label_values(&labels)
            .set(usage.uptime_ms as f64);

        let limits = &server.limits;
        self.memory_limit
            .with_label_values(&labels)
            .set(limits.max_memory as f64);
        self.swap_limit
            .with_label_values(&labels)
            .set(limits.max_swap as f64);
        self.disk_limit
            .with_label_values(&labels)
            .set(limits.max_disk as f64);
        self.io_weight
            .with_label_values(&labels)
            .set(limits.max_io as f64);
        self.cpu_limit
            .with_label_values(&labels)
            .set(limits.max_cpu as f64);

        self.last_backup_timestamp_seconds
            .with_label_values(&labels)
            .set(server.last_backup_epoch_seconds);

        let game = &server.game;
        self.players_online
            .with_label_values(&labels)
            .set(game.players_online as f64);
        self.players_max
            .with_label_values(&labels)
            .set(game.players_max as f64);
        self.version_protocol
            .with_label_values(&[
                server.name.as_str(),
                server.id.as_str(),
                game.version_name.as_str(),
            ])
            .set(game.version_protocol as f64);
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::with_capacity(8192);
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| PanelError::Metrics(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| PanelError::Metrics(e.to_string()))
    }
}
