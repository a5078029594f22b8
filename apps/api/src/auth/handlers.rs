use axum::{extract::Path, Json};
use serde::Serialize;

use crate::auth::AuthSession;
use crate::errors::AppError;

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub expires: String,
}

/// GET /api/auth/session
pub async fn handle_get_session(session: AuthSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: SessionUser {
            id: session.user_id,
            email: session.email,
            name: session.name,
        },
        access_token: session.access_token,
        expires: session.expires_at.to_rfc3339(),
    })
}

/// GET/POST /api/auth/*
///
/// Sign-in, callback and sign-out belong to the identity provider flow, not to this service.
pub async fn handle_auth_fallback(Path(rest): Path<String>) -> Result<(), AppError> {
    Err(AppError::NotFound(format!(
        "Auth route '/api/auth/{rest}' is handled by the sign-in provider"
    )))
}
