use anyhow::Result;
use review_lens::config::Settings;
use review_lens::server::{create_router, spawn_session_sweeper, AppState};
use review_lens::tools::HttpBackend;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("review_lens=debug,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env();
    let backend = HttpBackend::new(&settings.backend_url)?;
    info!("Forwarding analysis requests to {}", backend.endpoint());

    let ttl = i64::try_from(settings.session_ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| anyhow::anyhow!("Session TTL {}s is out of range", settings.session_ttl_secs))?;
    let state = AppState::new(Arc::new(backend)).with_session_ttl(ttl);
    spawn_session_sweeper(
        state.clone(),
        Duration::from_secs((settings.session_ttl_secs / 4).max(1)),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("Review analysis front end running on http://{}", settings.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
