use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weddingops_web::cache::start_cache_warmer;
use weddingops_web::config::Config;
use weddingops_web::contracts::complete_past_events;
use weddingops_web::store::{PgStore, Store};
use weddingops_web::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weddingops_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = Config::from_env().context("loading configuration")?;
    tracing::info!(host = %config.host, port = config.port, "Loaded configuration");

    // --- Database ---
    let store = PgStore::connect(&config.database_url, config.database_max_connections)
        .await
        .context("connecting to database")?;
    store.health_check().await.context("database health check")?;
    store.run_migrations().await.context("running migrations")?;
    tracing::info!("Database ready");

    let store: Arc<dyn Store> = Arc::new(store);
    let state = AppState::new(store.clone(), config.policy.clone(), config.catalog_cache_ttl);

    // --- Background jobs ---
    tokio::spawn(start_cache_warmer(
        state.cache.clone(),
        store,
        config.catalog_cache_ttl,
    ));
    tokio::spawn(run_status_sweep(state.clone(), config.status_sweep_interval));

    // --- Router ---
    let app = router(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // --- Start server ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid HOST/PORT")?;
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding listener")?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Daily booked -> completed sweep
async fn run_status_sweep(state: AppState, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let today = Utc::now().date_naive();
        if let Err(e) = complete_past_events(&state, today).await {
            tracing::error!(error = %e, "status sweep failed");
        }
    }
}
