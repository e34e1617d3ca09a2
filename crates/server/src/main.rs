use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use threads_feed_server::config::ServerConfig;
use threads_feed_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialise tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = ServerConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", cfg.bind, cfg.port)
        .parse()
        .expect("invalid bind address");

    if cfg.feed.upstream.api_key.is_none() {
        tracing::warn!("THREADS_API_KEY is not set; live fetches will fail and fall back to cached/sample data");
    }
    tracing::info!(
        cache = %cfg.feed.cache.path.display(),
        ephemeral = cfg.feed.cache.ephemeral,
        entities = cfg.feed.catalog.len(),
        "feed configured"
    );

    let state = AppState::new(cfg);
    let app = threads_feed_server::app(state);

    tracing::info!("threads feed listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, gracefully stopping…");
}
