use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::jobs::Job;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    pub q: Option<String>,
}

/// GET /api/jobs
///
/// Without `q`: the static catalog. With `q`: the live search when configured,
/// falling back to filtering the static catalog.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    let Some(query) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(Json(state.jobs.all().to_vec()));
    };

    if let Some(search) = &state.job_search {
        match search.search(query).await {
            Ok(jobs) => return Ok(Json(jobs)),
            Err(e) => warn!("Live job search failed, using static catalog: {e}"),
        }
    }

    Ok(Json(state.jobs.search(query)))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    state
        .jobs
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job with ID \"{id}\" not found.")))
}
