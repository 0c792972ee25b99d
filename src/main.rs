//! Product API (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ request id ─▶ server span ─▶ timeout ─▶ router
//!                                                              │
//!                      ┌───────────────┬───────────────────────┼──────────────┐
//!                      ▼               ▼                       ▼              ▼
//!                     GET /     GET /api/products   GET /api/products/{id}  GET /health
//!                   (counter)   span get-products    span get-product-by-id
//!                               sleep 100ms          sleep 50ms
//!                               counter+histogram    child span call-user-service ──▶ user service
//!                                                    counter+histogram
//!
//!     spans ──▶ tracing-opentelemetry ──▶ OTLP batch exporter ──▶ collector
//!     metrics ─▶ OTLP periodic reader ───────────────────────────▶ collector
//!             └▶ Prometheus endpoint (optional)
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use product_api::config::load_config;
use product_api::lifecycle::{signals, Shutdown};
use product_api::observability::{self, resource::ResourceDescriptor};
use product_api::HttpServer;

#[derive(Parser)]
#[command(name = "product-api")]
#[command(about = "Product catalog demo service with OpenTelemetry", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    let resource = ResourceDescriptor::from(&config.service);
    let telemetry = observability::init(&config, &resource)?;

    tracing::info!(
        service = %resource.service_name(),
        version = %resource.service_version(),
        bind_address = %config.listener.bind_address,
        otlp_export = telemetry.exporting(),
        "product-api starting"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, telemetry.metrics());
    let result = server.run(listener, shutdown.subscribe()).await;

    telemetry.shutdown();
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}
