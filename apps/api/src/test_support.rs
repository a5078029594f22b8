//! Shared fixtures for router and client tests: a stub downstream server,
//! an in-memory user store and a request helper around `build_router`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::ai_client::AiServiceClient;
use crate::auth::{SessionClaims, SessionVerifier};
use crate::config::Config;
use crate::errors::AppError;
use crate::jobs::{Job, JobCatalog};
use crate::models::user::{Role, User};
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::repository::{ProfileUpdate, UserRepository};

/// Serves `app` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Records what a stub received.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<String>>>);

impl Captured {
    pub fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn get(&self, email: &str) -> Option<User> {
        self.users.lock().unwrap().get(email).cloned()
    }

    pub fn seed(&self, email: &str, skills: Option<&str>) {
        let mut user = User::new(email, None);
        user.skills = skills.map(String::from);
        self.users.lock().unwrap().insert(email.to_string(), user);
    }

    fn modify(&self, email: &str, f: impl FnOnce(&mut User)) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(email)
            .ok_or_else(|| AppError::NotFound(format!("User {email} not found")))?;
        f(user);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.get(email))
    }

    async fn upsert_by_email(&self, email: &str, name: Option<&str>) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .entry(email.to_string())
            .or_insert_with(|| User::new(email, name));
        if let Some(name) = name {
            user.name = Some(name.to_string());
        }
        Ok(user.clone())
    }

    async fn update_role(&self, email: &str, role: Role) -> Result<User, AppError> {
        self.modify(email, |u| u.role = Some(role.as_str().to_string()))
    }

    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<User, AppError> {
        self.modify(email, |u| {
            if let Some(name) = &update.name {
                u.name = Some(name.clone());
            }
            if let Some(bio) = &update.bio {
                u.bio = Some(bio.clone());
            }
            if let Some(skills) = &update.skills {
                u.skills = Some(skills.clone());
            }
        })
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON body, or the raw text as a JSON string when it is not JSON.
    pub json: Value,
}

pub struct TestApp {
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
}

fn sample_catalog() -> JobCatalog {
    let jobs: Vec<Job> = serde_json::from_value(json!([
        {"id": "job_001", "title": "Backend Developer",
         "description": "Experience with Node.js, PostgreSQL, Docker, and REST APIs.",
         "company": "Acme Corp", "location": "Remote"},
        {"id": "job_002", "title": "Frontend Developer",
         "description": "Looking for React, CSS, HTML, and JavaScript skills.",
         "company": "Pixel Labs"},
        {"id": "job_003", "title": "DevOps Engineer",
         "description": "Familiar with AWS, Docker, Kubernetes, and CI/CD pipelines."}
    ]))
    .unwrap();
    JobCatalog::new(jobs)
}

impl TestApp {
    /// An app whose AI service and match engine live at `downstream`.
    pub async fn new(downstream: &str) -> Self {
        let config = Config::for_tests(downstream);
        let users = Arc::new(InMemoryUserRepository::default());
        let state = AppState {
            users: users.clone(),
            ai: AiServiceClient::new(
                config.ai_service_url.clone(),
                config.match_service_url.clone(),
            )
            .unwrap(),
            jobs: Arc::new(sample_catalog()),
            job_search: None,
            sessions: SessionVerifier::new(&config.auth_secret),
            config,
        };
        Self { state, users }
    }

    pub fn token(&self, email: &str) -> String {
        let now = Utc::now().timestamp();
        self.state.sessions.sign(&SessionClaims {
            sub: Some(format!("id-{email}")),
            id: None,
            email: Some(email.to_string()),
            name: Some("Test User".to_string()),
            access_token: Some("provider-access-token".to_string()),
            exp: now + 3600,
            iat: Some(now),
        })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let req = request(Method::GET, uri, token).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send_json(Method::POST, uri, token, body).await
    }

    pub async fn patch_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send_json(Method::PATCH, uri, token, body).await
    }

    /// Sends `body` as-is, with an optional Content-Type.
    pub async fn post_raw(
        &self,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> TestResponse {
        let mut builder = request(Method::POST, uri, token);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.send(req).await
    }

    pub async fn post_file(
        &self,
        uri: &str,
        token: Option<&str>,
        field: &str,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> TestResponse {
        const BOUNDARY: &str = "----skillbridge-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = request(Method::POST, uri, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let req = request(method, uri, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = build_router(self.state.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        TestResponse { status, json }
    }
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {t}")),
        None => builder,
    }
}
