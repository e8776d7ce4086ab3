//! Standalone noughts server.
//!
//! Listens on `$NOUGHTS_BIND_HOST:$PORT` (default `0.0.0.0:8080`). Log
//! filtering follows `RUST_LOG`, defaulting to `info`.

use noughts::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: &str = "8080";
const DEFAULT_HOST: &str = "0.0.0.0";

fn bind_addr() -> String {
    let host = std::env::var("NOUGHTS_BIND_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    format!("{host}:{port}")
}

#[tokio::main]
async fn main() -> Result<(), NoughtsError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let addr = bind_addr();
    let server = NoughtsServer::builder()
        .bind(&addr)
        .config(OrchestratorConfig::default())
        .build()
        .await?;

    tracing::info!(%addr, "starting noughts server");
    server.run().await
}
