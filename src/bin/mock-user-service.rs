//! Stand-in for the downstream user service.
//!
//! Serves `GET /api/users/{id}` after a short simulated query so the product
//! API can be exercised locally without the real dependency.

use axum::{extract::Path, routing::get, Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mock-user-service")]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Artificial latency per request, in milliseconds.
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_user_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let delay = Duration::from_millis(cli.delay_ms);

    let app = Router::new()
        .route(
            "/api/users/{id}",
            get(move |Path(id): Path<String>| async move {
                tokio::time::sleep(delay).await;
                tracing::info!(user_id = %id, "Serving user");
                Json(user(&id))
            }),
        )
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }));

    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Mock user service listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn user(id: &str) -> Value {
    json!({ "id": id, "name": format!("User {}", id) })
}
