//! Axum route handlers for the Analysis and Match APIs.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::ai_client::UploadedFile;
use crate::analysis::upload::{is_allowed, resolve_mime};
use crate::auth::AuthSession;
use crate::errors::AppError;
use crate::extractors::JsonBody;
use crate::state::AppState;
use crate::users::record_extracted_skills;

const FILE_FIELD: &str = "file";
const DEFAULT_FILENAME: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub jobs: Vec<Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analysis/text
///
/// Forwards the profile text unchanged and returns the AI service's result verbatim.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    session: AuthSession,
    JsonBody(request): JsonBody<AnalyzeTextRequest>,
) -> Result<Json<Value>, AppError> {
    info!("Received request for text analysis");
    let content = match request.content {
        Some(c) if !c.trim().is_empty() => c,
        _ => {
            warn!("Text analysis request: content is empty");
            return Err(AppError::Validation("Content cannot be empty".to_string()));
        }
    };

    let result = state.ai.analyze_profile(&content).await?;
    record_extracted_skills(state.users.as_ref(), &session, &result).await;

    info!("Text analysis successful, returning results");
    Ok(Json(result))
}

/// POST /api/analysis/file-upload
///
/// Accepts a multipart body with a PDF or DOCX in the `file` field.
pub async fn handle_file_upload(
    State(state): State<AppState>,
    session: AuthSession,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    info!("Received request for file upload analysis");

    let mut upload: Option<UploadedFile> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let declared = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        let content_type = resolve_mime(declared.as_deref(), &filename).ok_or_else(|| {
            AppError::UnsupportedMediaType(declared.clone().unwrap_or_default())
        })?;
        upload = Some(UploadedFile {
            filename,
            content_type,
            bytes,
        });
        break;
    }

    let file = match upload {
        Some(f) if !f.bytes.is_empty() => f,
        _ => {
            warn!("File upload request: no file provided");
            return Err(AppError::Validation("No file uploaded".to_string()));
        }
    };

    if !is_allowed(&file.content_type) {
        warn!(
            "File upload request: unsupported file type - {}",
            file.content_type
        );
        return Err(AppError::UnsupportedMediaType(file.content_type));
    }

    let result = state.ai.upload_resume_file(file).await?;
    record_extracted_skills(state.users.as_ref(), &session, &result).await;

    info!("File upload analysis successful, returning results");
    Ok(Json(result))
}

/// POST /api/match
///
/// Ranks jobs against the caller's stored skills summary.
pub async fn handle_match(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<MatchResponse>, AppError> {
    let user = state.users.find_by_email(&session.email).await?;
    let profile = user
        .as_ref()
        .and_then(|u| u.skills_summary())
        .ok_or_else(|| AppError::Validation("User skills not found".to_string()))?;

    let jobs = state.ai.match_profile(profile).await?;
    info!("Match engine returned {} jobs for user {}", jobs.len(), session.user_id);

    Ok(Json(MatchResponse { jobs }))
}
