use anyhow::Result;
use clap::Parser;
use pterodactyl_exporter::{
    client::PanelClient, config::Settings, metrics::MetricsCollector, poller::Poller,
    server::start_server,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pterodactyl Exporter - Prometheus metrics exporter for Pterodactyl panels
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Poll the panel once, print the report as JSON and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?;

    init_logging(&settings.exporter.log_level, &settings.exporter.log_format)?;

    info!("Starting Pterodactyl Exporter");
    info!("Panel: {}", settings.panel.base_url());

    let client = Arc::new(PanelClient::new(settings.panel.clone())?);
    info!("Panel client initialized");

    if args.once {
        let report = Poller::new(client).poll().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let metrics = MetricsCollector::new(client)?;
    info!("Metrics collector initialized");
    info!("Listen address: {}", settings.exporter.listen_address);

    if let Err(e) = start_server(&settings.exporter.listen_address, metrics).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Initialize structured logging with tracing.
///
/// Logs go to stderr so `--once` output on stdout stays parseable.
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
