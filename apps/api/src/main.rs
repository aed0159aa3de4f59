mod config;
mod db;
mod errors;
mod listings;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::listings::cache::RedisListingCache;
use crate::listings::orchestrator::ListingsOrchestrator;
use crate::listings::preferences::{PgPreferenceStore, PreferenceStore};
use crate::listings::scraper::{HttpJobBoard, ScrapeClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interndeck API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (backs the ranked listings cache)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize the job-board scrape client
    let provider = HttpJobBoard::new(config.scraper_url.clone());
    let scraper = ScrapeClient::new(Arc::new(provider));
    info!(
        "Scrape client initialized ({} active portals)",
        config.job_portal_count
    );

    // Wire the listings core
    let prefs: Arc<dyn PreferenceStore> = Arc::new(PgPreferenceStore::new(db.clone()));
    let listings = Arc::new(ListingsOrchestrator::new(
        Arc::clone(&prefs),
        Arc::new(RedisListingCache::new(redis)),
        Arc::new(scraper),
    ));

    // Build app state
    let state = AppState {
        listings,
        prefs,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
