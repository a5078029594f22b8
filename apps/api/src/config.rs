use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MATCH_SERVICE_URL: &str = "http://localhost:5001";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub auth_secret: String,
    pub ai_service_url: String,
    pub match_service_url: String,
    pub serpapi_key: Option<String>,
    pub serpapi_url: String,
    pub jobs_file: String,
    /// Empty means permissive CORS.
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let auth_secret = require_any(&["AUTH_SECRET", "NEXTAUTH_SECRET"])?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            auth_secret,
            ai_service_url: base_url(optional_env("AI_SERVICE_URL"), "http://localhost:8001"),
            match_service_url: base_url(
                optional_env("MATCH_SERVICE_URL"),
                DEFAULT_MATCH_SERVICE_URL,
            ),
            serpapi_key: optional_env("SERPAPI_KEY"),
            serpapi_url: optional_env("SERPAPI_URL")
                .unwrap_or_else(|| "https://serpapi.com/search.json".to_string()),
            jobs_file: optional_env("JOBS_FILE").unwrap_or_else(|| "data/jobs.json".to_string()),
            cors_allowed_origins: parse_origins(
                &optional_env("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|| "http://localhost:3000".to_string()),
            ),
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: match optional_env("PORT") {
                Some(v) => v.parse::<u16>().context("PORT must be a valid port number")?,
                None => DEFAULT_PORT,
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration pointing every downstream at `base`, for router tests.
    #[cfg(test)]
    pub fn for_tests(base: &str) -> Self {
        Config {
            database_url: "postgres://unused".to_string(),
            auth_secret: "test-secret".to_string(),
            ai_service_url: base.to_string(),
            match_service_url: base.to_string(),
            serpapi_key: None,
            serpapi_url: format!("{base}/search.json"),
            jobs_file: "data/jobs.json".to_string(),
            cors_allowed_origins: Vec::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

/// Blank values count as unset.
fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// The first of `keys` with a non-blank value.
fn require_any(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| optional_env(key))
        .with_context(|| format!("One of {} must be set", keys.join(", ")))
}

/// Returns `None` for unset or blank variables.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// `*` yields an empty list, which the router treats as "allow any origin".
fn parse_origins(raw: &str) -> Vec<String> {
    if raw.trim() == "*" {
        return Vec::new();
    }
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
