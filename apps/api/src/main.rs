mod ai_client;
mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod extractors;
mod jobs;
mod models;
mod routes;
mod state;
mod users;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_client::AiServiceClient;
use crate::auth::SessionVerifier;
use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::search::JobSearchClient;
use crate::jobs::JobCatalog;
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::repository::PgUserRepository;

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

    info!("Starting SkillBridge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Static job catalog
    let jobs = JobCatalog::load(&config.jobs_file)?;
    if jobs.is_empty() {
        warn!("Job catalog at {} is empty", config.jobs_file);
    }

    // Downstream clients
    let ai = AiServiceClient::new(
        config.ai_service_url.clone(),
        config.match_service_url.clone(),
    )?;
    info!(
        "AI service client initialized (analysis: {}, match: {})",
        config.ai_service_url, config.match_service_url
    );

    let job_search = match &config.serpapi_key {
        Some(key) => {
            info!("Live job search enabled");
            Some(JobSearchClient::new(config.serpapi_url.clone(), key.clone())?)
        }
        None => {
            warn!("SERPAPI_KEY not set; job search uses the static catalog only");
            None
        }
    };

    let cors = build_cors(&config.cors_allowed_origins);

    // Build app state
    let state = AppState {
        users: Arc::new(PgUserRepository::new(db)),
        ai,
        jobs: Arc::new(jobs),
        job_search,
        sessions: SessionVerifier::new(&config.auth_secret),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// An empty origin list means permissive CORS.
fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
