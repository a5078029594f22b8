use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthSession;
use crate::errors::AppError;
use crate::extractors::JsonBody;
use crate::models::user::{Role, User};
use crate::state::AppState;
use crate::users::repository::ProfileUpdate;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub name: Option<String>,
    pub email: String,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub role: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
            bio: user.bio,
            skills: user.skills,
            role: user.role,
        }
    }
}

/// POST /api/set-role
pub async fn handle_set_role(
    State(state): State<AppState>,
    session: AuthSession,
    JsonBody(req): JsonBody<SetRoleRequest>,
) -> Result<Json<Value>, AppError> {
    let role: Role = req
        .role
        .as_deref()
        .ok_or_else(|| AppError::Validation("role is required".to_string()))?
        .parse()
        .map_err(AppError::Validation)?;

    state
        .users
        .upsert_by_email(&session.email, session.name.as_deref())
        .await?;
    state.users.update_role(&session.email, role).await?;
    info!("Set role {role} for user {}", session.user_id);

    Ok(Json(json!({ "success": true })))
}

/// GET /api/user
pub async fn handle_get_profile(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&session.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

/// PATCH /api/user
pub async fn handle_update_profile(
    State(state): State<AppState>,
    session: AuthSession,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let update = ProfileUpdate {
        name: req.name,
        bio: req.bio,
        skills: req.skills,
    };
    if update.is_empty() {
        return Err(AppError::Validation(
            "At least one of name, bio or skills must be provided".to_string(),
        ));
    }

    state
        .users
        .upsert_by_email(&session.email, session.name.as_deref())
        .await?;
    let user = state.users.update_profile(&session.email, &update).await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_role_requires_session() {
        let app = TestApp::new("http://127.0.0.1:9").await;
        let res = app
            .post_json("/api/set-role", None, json!({"role": "JUNIOR"}))
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_set_role_creates_user_and_stores_role() {
        let app = TestApp::new("http://127.0.0.1:9").await;
        let token = app.token("grace@example.com");

        let res = app
            .post_json("/api/set-role", Some(&token), json!({"role": "mentor"}))
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json, json!({"success": true}));

        let user = app.users.get("grace@example.com").unwrap();
        assert_eq!(user.role.as_deref(), Some("MENTOR"));
        assert_eq!(user.name.as_deref(), Some("Test User"));
    }

    #[tokio::test]
    async fn test_set_role_rejects_unknown_or_missing_role() {
        let app = TestApp::new("http://127.0.0.1:9").await;
        let token = app.token("grace@example.com");

        let res = app
            .post_json("/api/set-role", Some(&token), json!({"role": "ADMIN"}))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = app.post_json("/api/set-role", Some(&token), json!({})).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json["error"]["message"], "role is required");
    }

    #[tokio::test]
    async fn test_wrongly_typed_bodies_are_400() {
        let app = TestApp::new("http://127.0.0.1:9").await;
        let token = app.token("grace@example.com");

        let res = app
            .post_json("/api/set-role", Some(&token), json!({"role": 5}))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json["error"]["code"], "VALIDATION_ERROR");

        let res = app
            .patch_json("/api/user", Some(&token), json!({"skills": ["Rust"]}))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json["error"]["code"], "VALIDATION_ERROR");
        assert!(app.users.get("grace@example.com").is_none());
    }

    #[tokio::test]
    async fn test_get_profile_not_found() {
        let app = TestApp::new("http://127.0.0.1:9").await;
        let token = app.token("nobody@example.com");

        let res = app.get("/api/user", Some(&token)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.json["error"]["message"], "User not found");
    }

    #[tokio::test]
    async fn test_update_then_get_profile() {
        let app = TestApp::new("http://127.0.0.1:9").await;
        let token = app.token("grace@example.com");

        let res = app
            .patch_json(
                "/api/user",
                Some(&token),
                json!({"bio": "Compiler engineer", "skills": "COBOL, Rust"}),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json["bio"], "Compiler engineer");

        let res = app.get("/api/user", Some(&token)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json["email"], "grace@example.com");
        assert_eq!(res.json["skills"], "COBOL, Rust");
        assert!(res.json["role"].is_null());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_empty_body() {
        let app = TestApp::new("http://127.0.0.1:9").await;
        let token = app.token("grace@example.com");

        let res = app.patch_json("/api/user", Some(&token), json!({})).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }
}
