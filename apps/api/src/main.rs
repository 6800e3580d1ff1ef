mod ai_client;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod jobs;
mod models;
mod resumes;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_client::HttpAiClient;
use crate::config::{Config, StorageBackend};
use crate::db::create_pool;
use crate::jobs::store::PgJobStore;
use crate::resumes::store::PgResumeStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{LocalStore, ObjectStore, S3Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize upload storage
    let storage: Arc<dyn ObjectStore> = match &config.storage {
        StorageBackend::Local { upload_dir } => {
            info!("Storing uploads on local disk under {upload_dir}");
            Arc::new(LocalStore::new(upload_dir.clone()))
        }
        StorageBackend::S3(settings) => {
            let store = S3Store::connect(settings).await;
            info!("S3 client initialized (bucket: {})", settings.bucket);
            Arc::new(store)
        }
    };

    // Initialize AI service client
    let ai = HttpAiClient::new(
        config.ai_service_url.clone(),
        Duration::from_secs(config.ai_timeout_secs),
    )
    .context("failed to build AI service client")?;
    info!("AI service client initialized ({})", ai.base_url());

    // Build app state
    let state = AppState {
        resumes: Arc::new(PgResumeStore::new(db.clone())),
        jobs: Arc::new(PgJobStore::new(db)),
        storage,
        ai: Arc::new(ai),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allowed_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Allowlist when `CORS_ALLOWED_ORIGINS` is set, permissive otherwise.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS not set; allowing any origin");
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
