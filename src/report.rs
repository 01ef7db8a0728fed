//! The metrics report produced by one polling pass.
//!
//! A [`ReportBuilder`] is created empty at the start of every pass and each
//! server record is appended only once all of its fields are known, so every
//! index of the finished [`MetricsReport`] describes one server completely.

use serde::Serialize;

const UNKNOWN_VERSION: &str = "unknown";

/// Identity and static limits of a server, as discovered from the server list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerSummary {
    pub name: String,
    /// Stable key used by every per-server fetch
    pub id: String,
    pub limits: ServerLimits,
}

/// Static limits, in panel-defined units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerLimits {
    pub max_memory: i64,
    pub max_swap: i64,
    pub max_disk: i64,
    pub max_io: i64,
    pub max_cpu: i64,
}

/// Live resource usage after unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResourceUsage {
    pub memory_mib: f64,
    pub cpu_percent: f64,
    pub disk_mib: f64,
    pub rx_mib: f64,
    pub tx_mib: f64,
    pub uptime_ms: u64,
}

/// Game-specific status; [`GameStatus::default`] is the "probe failed" value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStatus {
    pub players_online: i64,
    pub players_max: i64,
    pub version_name: String,
    pub version_protocol: i64,
}

impl Default for GameStatus {
    fn default() -> Self {
        Self {
            players_online: 0,
            players_max: 0,
            version_name: UNKNOWN_VERSION.to_string(),
            version_protocol: 0,
        }
    }
}

/// Everything known about one server after a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerMetrics {
    pub name: String,
    pub id: String,
    pub limits: ServerLimits,
    pub resources: ResourceUsage,
    /// Unix epoch seconds of the latest successful backup, 0 if none
    pub last_backup_epoch_seconds: f64,
    pub game: GameStatus,
}

/// Result of one complete pass, ordered by discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsReport {
    servers: Vec<ServerMetrics>,
}

impl MetricsReport {
    /// Number of servers in the report.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Server at discovery index `index`.
    pub fn get(&self, index: usize) -> Option<&ServerMetrics> {
        self.servers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServerMetrics> {
        self.servers.iter()
    }

    pub fn servers(&self) -> &[ServerMetrics] {
        &self.servers
    }
}

impl<'a> IntoIterator for &'a MetricsReport {
    type Item = &'a ServerMetrics;
    type IntoIter = std::slice::Iter<'a, ServerMetrics>;

    fn into_iter(self) -> Self::IntoIter {
        self.servers.iter()
    }
}

/// Accumulates server records during a pass.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    servers: Vec<ServerMetrics>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder sized for `capacity` servers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            servers: Vec::with_capacity(capacity),
        }
    }

    /// Append a fully enriched server and return its index.
    pub fn push(
        &mut self,
        summary: ServerSummary,
        resources: ResourceUsage,
        last_backup_epoch_seconds: f64,
        game: GameStatus,
    ) -> usize {
        let ServerSummary { name, id, limits } = summary;
        self.servers.push(ServerMetrics {
            name,
            id,
            limits,
            resources,
            last_backup_epoch_seconds,
            game,
        });
        self.servers.len() - 1
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn build(self) -> MetricsReport {
        MetricsReport {
            servers: self.servers,
        }
    }
}
