//! AI service client: the single point of entry for every call to the external
//! analysis service and the match engine.
//!
//! No other module may call the AI service directly. Payloads are forwarded
//! unchanged and responses come back verbatim as `serde_json::Value`; the
//! shape of the analysis result belongs to the AI service, not to us.

use bytes::Bytes;
use reqwest::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

const ANALYZE_PROFILE_PATH: &str = "/analyze-profile/";
const UPLOAD_RESUME_PATH: &str = "/upload-resume-file/";
const MATCH_PATH: &str = "/match";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AiError {
    /// The message surfaced to API callers: the downstream `detail` when the
    /// service produced one, otherwise the transport error text.
    pub fn downstream_message(&self) -> String {
        match self {
            AiError::Http(e) => e.to_string(),
            AiError::Api { message, .. } => message.clone(),
            AiError::InvalidResponse(msg) => msg.clone(),
        }
    }
}

/// A resume file received from a client, forwarded byte-for-byte.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
struct AnalyzeProfileRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    profile: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

#[derive(Clone)]
pub struct AiServiceClient {
    client: Client,
    base_url: String,
    match_base_url: String,
}

impl AiServiceClient {
    pub fn new(base_url: String, match_base_url: String) -> Result<Self, AiError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url,
            match_base_url,
        })
    }

    /// POST {base}/analyze-profile/ with `{"content": ...}`.
    pub async fn analyze_profile(&self, content: &str) -> Result<Value, AiError> {
        let url = format!("{}{}", self.base_url, ANALYZE_PROFILE_PATH);
        info!("Calling AI service for text analysis: {url}");

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeProfileRequest { content })
            .send()
            .await?;

        let data = read_json(response).await?;
        info!("AI service text analysis successful");
        Ok(data)
    }

    /// POST {base}/upload-resume-file/ as multipart with a single `file` part.
    pub async fn upload_resume_file(&self, file: UploadedFile) -> Result<Value, AiError> {
        let url = format!("{}{}", self.base_url, UPLOAD_RESUME_PATH);
        info!(
            "Calling AI service for file upload: {url} ({}, {} bytes)",
            file.filename,
            file.bytes.len()
        );

        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.filename)
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        let data = read_json(response).await?;
        info!("AI service file analysis successful");
        Ok(data)
    }

    /// POST {match_base}/match with `{"profile": ...}`; the engine must answer with a JSON array.
    pub async fn match_profile(&self, profile: &str) -> Result<Vec<Value>, AiError> {
        let url = format!("{}{}", self.match_base_url, MATCH_PATH);
        debug!("Calling match engine: {url}");

        let response = self
            .client
            .post(&url)
            .json(&MatchRequest { profile })
            .send()
            .await?;

        match read_json(response).await? {
            Value::Array(jobs) => {
                debug!("Match engine returned {} jobs", jobs.len());
                Ok(jobs)
            }
            other => Err(AiError::InvalidResponse(format!(
                "Invalid response format from match engine: expected array, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Maps non-2xx statuses to `AiError::Api`, preferring the service's `detail` field.
async fn read_json(response: Response) -> Result<Value, AiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("AI service returned {}: {}", status, body);
        return Err(AiError::Api {
            status: status.as_u16(),
            message: extract_detail(&body),
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body)
        .map_err(|e| AiError::InvalidResponse(format!("AI service returned invalid JSON: {e}")))
}

fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(Value::String(s)),
        }) => s,
        Ok(ErrorBody {
            detail: Some(other),
        }) => other.to_string(),
        _ => body.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
