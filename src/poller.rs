//! Polling pass over the panel.
//!
//! A pass enumerates every active server from the paginated server list,
//! then enriches each one with its live resource usage, the time of its
//! latest successful backup and its game status, strictly in that order and
//! one request at a time.

use crate::client::{
    BackupListResponse, BackupObject, GameInfoResponse, PanelClient, ResourcesResponse,
    ServerAttributes, ServerListResponse, ServerObject,
};
use crate::error::{FailurePolicy, PanelError, Result, Stage};
use crate::report::{
    GameStatus, MetricsReport, ReportBuilder, ResourceUsage, ServerLimits, ServerSummary,
};
use crate::units::bytes_to_mebibytes;
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const SERVER_LIST_PATH: &str = "/api/client/";

/// Most recent backups inspected per server.
const BACKUP_PAGE_SIZE: u32 = 50;

/// Runs polling passes against one panel.
#[derive(Clone)]
pub struct Poller {
    client: Arc<PanelClient>,
    server_list_type: String,
}

impl Poller {
    /// Create a poller using the server list filter from the client's config.
    pub fn new(client: Arc<PanelClient>) -> Self {
        let server_list_type = client.config().server_list_type.clone();
        Self {
            client,
            server_list_type,
        }
    }

    /// Run one complete pass and return its report.
    ///
    /// The first fatal error ends the pass; no partial report is returned.
    pub async fn poll(&self) -> Result<MetricsReport> {
        let started = Instant::now();
        info!("Polling panel at {}", self.client.base_url());

        let servers = self.list_servers(&self.server_list_type).await?;
        let mut builder = ReportBuilder::with_capacity(servers.len());

        for server in servers {
            let resources = self.fetch_resource_usage(&server).await?;
            let last_backup = self.last_successful_backup(&server).await?;
            let game = self.probe_game_status(&server).await;
            builder.push(server, resources, last_backup, game);
        }

        let report = builder.build();
        info!(
            "Polled {} servers in {:.3}s",
            report.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Enumerate active servers across every page of the server list.
    ///
    /// Suspended and installing servers are left out entirely.
    pub async fn list_servers(&self, filter: &str) -> Result<Vec<ServerSummary>> {
        let result = self.enumerate_servers(filter).await;
        settle(Stage::ServerList, None, result)
    }

    async fn enumerate_servers(&self, filter: &str) -> Result<Vec<ServerSummary>> {
        let first = self.fetch_server_page(filter, 1).await?;
        let total_pages = first.meta.pagination.total_pages;
        debug!("Server list has {} pages", total_pages);

        let mut servers = Vec::new();
        if total_pages == 0 {
            return Ok(servers);
        }

        collect_active(first.data, &mut servers);
        for page in 2..=total_pages {
            let response = self.fetch_server_page(filter, page).await?;
            collect_active(response.data, &mut servers);
        }

        Ok(servers)
    }

    async fn fetch_server_page(&self, filter: &str, page: u32) -> Result<ServerListResponse> {
        self.client
            .fetch(
                Stage::ServerList,
                None,
                SERVER_LIST_PATH,
                &[("type", filter.to_string()), ("page", page.to_string())],
            )
            .await
    }

    /// Fetch live resource usage for a server, converting byte counters to MiB.
    pub async fn fetch_resource_usage(&self, server: &ServerSummary) -> Result<ResourceUsage> {
        let path = format!("/api/client/servers/{}/resources", server.id);
        let result = self
            .client
            .fetch::<ResourcesResponse>(Stage::Resources, Some(&server.name), &path, &[])
            .await
            .map(|response| {
                let raw = response.attributes.resources;
                ResourceUsage {
                    memory_mib: bytes_to_mebibytes(raw.memory_bytes),
                    cpu_percent: raw.cpu_absolute,
                    disk_mib: bytes_to_mebibytes(raw.disk_bytes),
                    rx_mib: bytes_to_mebibytes(raw.network_rx_bytes),
                    tx_mib: bytes_to_mebibytes(raw.network_tx_bytes),
                    uptime_ms: raw.uptime,
                }
            });

        settle(Stage::Resources, Some(&server.name), result)
    }

    /// Epoch seconds of the server's most recent successful backup, or 0.
    pub async fn last_successful_backup(&self, server: &ServerSummary) -> Result<f64> {
        let path = format!("/api/client/servers/{}/backups", server.id);
        let result = self
            .client
            .fetch::<BackupListResponse>(
                Stage::Backups,
                Some(&server.name),
                &path,
                &[
                    ("per_page", BACKUP_PAGE_SIZE.to_string()),
                    ("page", "1".to_string()),
                ],
            )
            .await
            .and_then(|response| latest_successful_backup(&response.data));

        settle(Stage::Backups, Some(&server.name), result)
    }

    /// Probe game-specific status. Never fails; any problem yields defaults.
    pub async fn probe_game_status(&self, server: &ServerSummary) -> GameStatus {
        let path = format!("/api/client/servers/{}/minecraft-info", server.id);
        let result = self
            .client
            .fetch::<GameInfoResponse>(Stage::GameStatus, Some(&server.name), &path, &[])
            .await
            .map(game_status_from);

        settle(Stage::GameStatus, Some(&server.name), result).unwrap_or_default()
    }
}

/// Apply a stage's failure policy to its result.
fn settle<T: Default>(stage: Stage, server: Option<&str>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => match stage.failure_policy() {
            FailurePolicy::Abort => Err(e.in_stage(stage, server)),
            FailurePolicy::Degrade => {
                warn!(
                    "Error fetching {} for {}: {}",
                    stage,
                    server.unwrap_or("panel"),
                    e
                );
                Ok(T::default())
            }
        },
    }
}

fn collect_active(entries: Vec<ServerObject>, out: &mut Vec<ServerSummary>) {
    for entry in entries {
        let attrs = entry.attributes;
        if attrs.is_suspended || attrs.is_installing {
            debug!(
                "Skipping {} (suspended: {}, installing: {})",
                attrs.identifier, attrs.is_suspended, attrs.is_installing
            );
            continue;
        }
        out.push(summarize(attrs));
    }
}

fn summarize(attrs: ServerAttributes) -> ServerSummary {
    ServerSummary {
        name: attrs.name,
        id: attrs.identifier,
        limits: ServerLimits {
            max_memory: attrs.limits.memory,
            max_swap: attrs.limits.swap,
            max_disk: attrs.limits.disk,
            max_io: attrs.limits.io,
            max_cpu: attrs.limits.cpu,
        },
    }
}

/// Latest completion time among successful backups, 0 if there is none.
pub fn latest_successful_backup(backups: &[BackupObject]) -> Result<f64> {
    let mut latest: Option<f64> = None;

    for backup in backups.iter().map(|b| &b.attributes) {
        if !backup.is_successful {
            continue;
        }
        let Some(completed_at) = backup.completed_at.as_deref() else {
            continue;
        };
        let ts = parse_epoch_seconds(completed_at)?;
        latest = Some(latest.map_or(ts, |current| current.max(ts)));
    }

    Ok(latest.unwrap_or(0.0))
}

/// Parse an ISO-8601 timestamp into fractional epoch seconds.
///
/// Timestamps without an offset are read as UTC.
fn parse_epoch_seconds(value: &str) -> Result<f64> {
    let (secs, nanos) = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => (dt.timestamp(), dt.timestamp_subsec_nanos()),
        Err(e) => {
            let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map_err(
                |_| {
                    PanelError::ParseError(format!(
                        "Invalid backup completion time {:?}: {}",
                        value, e
                    ))
                },
            )?;
            let utc = naive.and_utc();
            (utc.timestamp(), utc.timestamp_subsec_nanos())
        }
    };
    Ok(secs as f64 + f64::from(nanos) / 1_000_000_000.0)
}

fn game_status_from(info: GameInfoResponse) -> GameStatus {
    if info.success != Value::Bool(true) {
        return GameStatus::default();
    }

    let version = info.data.get("version");
    let players = info.data.get("players");

    GameStatus {
        players_online: coerce_int(field(players, "online")),
        players_max: coerce_int(field(players, "max")),
        version_name: coerce_name(field(version, "name")),
        version_protocol: coerce_int(field(version, "protocol")),
    }
}

fn field<'a>(section: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    section.and_then(|value| value.get(key))
}

fn coerce_name(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => GameStatus::default().version_name,
    }
}

/// Best-effort integer coercion; anything unusable becomes 0.
fn coerce_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}
