mod config;
mod db;
mod documents;
mod errors;
mod jobs;
mod matching;
mod models;
mod routes;
mod state;
mod sync;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::documents::DocumentTextExtractor;
use crate::jobs::repository::PgJobStore;
use crate::matching::extractor::KeywordExtractor;
use crate::matching::taxonomy::Taxonomy;
use crate::routes::build_router;
use crate::state::AppState;
use crate::sync::client::ListingsClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Compile the skill taxonomy once; every request shares it
    let extractor = KeywordExtractor::new(Arc::new(Taxonomy::builtin()?));
    info!(
        "Skill taxonomy loaded ({} terms)",
        extractor.taxonomy().term_count()
    );

    let listings = ListingsClient::new(&config.listings_url)?;
    info!("Listings client initialized ({})", listings.url());

    // Build app state
    let state = AppState {
        config: config.clone(),
        extractor,
        documents: Arc::new(DocumentTextExtractor),
        jobs: Arc::new(PgJobStore::new(db)),
        listings,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web client's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
