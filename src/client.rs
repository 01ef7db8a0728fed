//! Panel API client for communicating with a Pterodactyl panel.
//!
//! This module provides the gateway used by every fetch of a pass, together
//! with the wire types of the client API endpoints the exporter consumes.

use crate::config::PanelConfig;
use crate::error::{FetchError, PanelError, Result, Stage};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Panel API client.
#[derive(Clone)]
pub struct PanelClient {
    client: Client,
    config: PanelConfig,
    base_url: String,
    auth_header: String,
}

impl PanelClient {
    /// Create a new panel API client.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pterodactyl_exporter::client::PanelClient;
    /// use pterodactyl_exporter::config::PanelConfig;
    ///
    /// let config = PanelConfig {
    ///     host: "panel.example.com".to_string(),
    ///     port: None,
    ///     https: true,
    ///     ignore_ssl: false,
    ///     api_key: "ptlc_xxxxxxxx".to_string(),
    ///     server_list_type: "owner".to_string(),
    ///     timeout_seconds: None,
    /// };
    /// let client = PanelClient::new(config).unwrap();
    /// ```
    pub fn new(config: PanelConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(config.ignore_ssl);
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        if config.ignore_ssl {
            warn!("TLS certificate verification is disabled for {}", config.host);
        }

        let base_url = config.base_url();
        let auth_header = format!("Bearer {}", config.api_key);

        Ok(Self {
            client,
            config,
            base_url,
            auth_header,
        })
    }

    /// Panel configuration this client was built from.
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a panel path and decode its JSON body.
    ///
    /// Anything but HTTP 200 fails with a [`FetchError`] carrying the
    /// response body. `server` names the affected server in that error.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        stage: Stage,
        server: Option<&str>,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Fetching {} from: {} {:?}", stage, url, query);

        let mut request = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            debug!("Panel returned {} for {}: {}", status, url, body);
            return Err(FetchError {
                stage,
                server: server.map(str::to_string),
                status: status.as_u16(),
                detail: body,
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|e| {
            PanelError::ParseError(format!(
                "Failed to parse {}: {}. Body preview: {}...",
                stage,
                e,
                preview(&body)
            ))
        })
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Paginated server list envelope (`GET /api/client`).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerListResponse {
    #[serde(default)]
    pub data: Vec<ServerObject>,
    pub meta: ListMeta,
}

/// List metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ListMeta {
    pub pagination: Pagination,
}

/// Pagination block of a list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub total_pages: u32,
}

/// One entry of the server list.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerObject {
    pub attributes: ServerAttributes,
}

/// Server attributes as returned by the panel.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerAttributes {
    #[serde(default)]
    pub name: String,
    /// Short identifier used in per-server client API paths
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub is_installing: bool,
    pub limits: Limits,
}

/// Limits configured for a server, in panel units.
#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    /// Memory limit in MiB (0 = unlimited)
    pub memory: i64,
    /// Swap in MiB (-1 = unlimited)
    pub swap: i64,
    /// Disk limit in MiB (0 = unlimited)
    pub disk: i64,
    /// Block IO weight
    pub io: i64,
    /// CPU limit in percent of one core (0 = unlimited)
    pub cpu: i64,
}

/// Resource usage envelope (`GET /api/client/servers/{id}/resources`).
#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesResponse {
    pub attributes: ResourcesAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesAttributes {
    pub resources: RawResources,
}

/// Raw resource counters, bytes and milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResources {
    pub memory_bytes: u64,
    pub cpu_absolute: f64,
    pub disk_bytes: u64,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    /// Uptime in milliseconds
    pub uptime: u64,
}

/// Backup list envelope (`GET /api/client/servers/{id}/backups`).
#[derive(Debug, Clone, Deserialize)]
pub struct BackupListResponse {
    #[serde(default)]
    pub data: Vec<BackupObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackupObject {
    pub attributes: BackupAttributes,
}

/// Backup state as far as the exporter cares.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupAttributes {
    #[serde(default)]
    pub is_successful: bool,
    /// ISO-8601 completion time; null while the backup is still running
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Game info envelope (`GET /api/client/servers/{id}/minecraft-info`).
///
/// `data` is kept as raw JSON so the prober can default each field on its own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameInfoResponse {
    #[serde(default)]
    pub success: serde_json::Value,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), 200);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_server_attributes_defaults() {
        let attrs: ServerAttributes = serde_json::from_str(
            r#"{"limits": {"memory": 1024, "swap": -1, "disk": 0, "io": 500, "cpu": 200}}"#,
        )
        .unwrap();
        assert_eq!(attrs.name, "");
        assert_eq!(attrs.identifier, "");
        assert!(!attrs.is_suspended);
        assert!(!attrs.is_installing);
        assert_eq!(attrs.limits.swap, -1);
    }

    #[test]
    fn test_game_info_tolerates_missing_data() {
        let info: GameInfoResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(info.success, serde_json::Value::Bool(false));
        assert!(info.data.is_null());
    }
}
