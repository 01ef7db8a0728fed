//! HTTP server for exposing Prometheus metrics.
//!
//! This module provides an Axum-based HTTP server that serves the `/metrics`
//! endpoint for Prometheus scraping and a `/health` endpoint for health checks.

use crate::error::{PanelError, Result};
use crate::metrics::MetricsCollector;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::TEXT_FORMAT;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared application state.
#[derive(Clone)]
struct AppState {
    metrics: Arc<MetricsCollector>,
    // One pass at a time; concurrent scrapes would interleave gauge updates.
    scrape_lock: Arc<Mutex<()>>,
}

/// Start the HTTP server.
///
/// # Arguments
///
/// * `listen_address` - Address to bind to (e.g., "0.0.0.0:9531")
/// * `metrics` - Metrics collector instance
///
/// # Examples
///
/// ```no_run
/// use pterodactyl_exporter::server::start_server;
/// use pterodactyl_exporter::metrics::MetricsCollector;
/// use pterodactyl_exporter::client::PanelClient;
/// use pterodactyl_exporter::config::Settings;
///
/// #[tokio::main]
/// async fn main() {
///     let mut settings = Settings::default();
///     settings.panel.host = "panel.example.com".to_string();
///     settings.panel.api_key = "ptlc_xxxxxxxx".to_string();
///     let client = PanelClient::new(settings.panel).unwrap();
///     let metrics = MetricsCollector::new(std::sync::Arc::new(client)).unwrap();
///     start_server("0.0.0.0:9531", metrics).await.unwrap();
/// }
/// ```
pub async fn start_server(listen_address: &str, metrics: MetricsCollector) -> Result<()> {
    info!("Starting HTTP server on {}", listen_address);

    let listener = TcpListener::bind(listen_address).await?;
    serve(listener, metrics).await
}

/// Serve the exporter endpoints on an already bound listener.
pub async fn serve(listener: TcpListener, metrics: MetricsCollector) -> Result<()> {
    let state = AppState {
        metrics: Arc::new(metrics),
        scrape_lock: Arc::new(Mutex::new(())),
    };

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    axum::serve(listener, app)
        .await
        .map_err(|e| PanelError::Server(e.to_string()))?;

    Ok(())
}

const INDEX_HTML: &str = r#"<html>
<head><title>Pterodactyl Exporter</title></head>
<body>
<h1>Pterodactyl Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>
"#;

/// Run a fresh pass and render it.
///
/// A failed pass is still rendered; `pterodactyl_up` reports the failure.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let _guard = state.scrape_lock.lock().await;

    if state.metrics.collect().await.is_err() {
        debug!("Serving metrics from a failed pass");
    }

    match state.metrics.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn root_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
