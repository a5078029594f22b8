use std::sync::Arc;

use crate::ai_client::AiServiceClient;
use crate::auth::SessionVerifier;
use crate::config::Config;
use crate::jobs::search::JobSearchClient;
use crate::jobs::JobCatalog;
use crate::users::repository::UserRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable user store. Default: PgUserRepository.
    pub users: Arc<dyn UserRepository>,
    pub ai: AiServiceClient,
    /// Static catalog loaded from `jobs.json` at startup.
    pub jobs: Arc<JobCatalog>,
    /// Live search; `None` when no SERPAPI_KEY is configured.
    pub job_search: Option<JobSearchClient>,
    pub sessions: SessionVerifier,
    pub config: Config,
}
