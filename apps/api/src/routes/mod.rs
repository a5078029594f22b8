pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api", get(health::hello_handler))
        // Analysis API (forwarded to the AI service)
        .route("/api/analysis/text", post(analysis::handle_analyze_text))
        .route(
            "/api/analysis/file-upload",
            post(analysis::handle_file_upload),
        )
        .route("/api/match", post(analysis::handle_match))
        // Jobs API
        .route("/api/jobs", get(jobs::handle_list_jobs))
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        // User API
        .route("/api/set-role", post(users::handle_set_role))
        .route(
            "/api/user",
            get(users::handle_get_profile).patch(users::handle_update_profile),
        )
        // Session API
        .route("/api/auth/session", get(auth::handle_get_session))
        .route(
            "/api/auth/*rest",
            get(auth::handle_auth_fallback).post(auth::handle_auth_fallback),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
