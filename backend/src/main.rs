use std::env;
use std::time::Duration;

use anyhow::Result;
use inkpost_backend::{routes, state};
use inkpost_shared::BlobStore;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let session_ttl = env::var("SESSION_TTL_SECONDS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);

    tracing::info!("Starting inkpost backend server");

    let blob = BlobStore::from_env()?;
    let app_state = state::AppState::new(blob, Duration::from_secs(session_ttl));

    let app = routes::create_router(app_state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
    let addr = format!("{}:{}", bind_addr, port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
