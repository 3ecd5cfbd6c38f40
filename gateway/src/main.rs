//! Event intake gateway hosting the Skai tracking component.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;
mod intake;

use tracker::dispatch::HttpTransport;
use tracker::pipeline::Pipeline;

#[derive(Parser)]
#[command(about = "Event intake gateway for the Skai tracking component")]
struct Cli {
    /// Path to the yaml config file
    #[arg(long, default_value = "gateway.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match config::Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    if let Some(metrics_config) = &config.metrics
        && let Err(e) = install_statsd(metrics_config)
    {
        eprintln!("Failed to install statsd exporter: {e}");
        process::exit(1);
    }

    let pipeline = Pipeline::new(config.component.clone(), Arc::new(HttpTransport::new()));
    tracing::info!(subscriptions = ?pipeline.subscriptions(), "component initialized");

    let service = intake::IntakeService::new(pipeline);
    if let Err(e) = intake::run(&config.listener.host, config.listener.port, service).await {
        tracing::error!(error = %e, "intake listener failed");
        process::exit(1);
    }
}

fn install_statsd(config: &config::MetricsConfig) -> Result<(), String> {
    let recorder = metrics_exporter_statsd::StatsdBuilder::from(
        config.statsd_host.as_str(),
        config.statsd_port,
    )
    .build(Some("skai_gateway"))
    .map_err(|e| e.to_string())?;

    metrics::set_global_recorder(recorder).map_err(|e| e.to_string())?;
    Ok(())
}
