//! Live job search through SerpAPI's `google_jobs` engine.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Map;
use thiserror::Error;
use tracing::{debug, warn};

use crate::jobs::Job;

const ENGINE: &str = "google_jobs";
const DESCRIPTION_LIMIT: usize = 300;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs_results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    job_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
}

impl SearchResult {
    /// Results without an id or title cannot be addressed and are skipped.
    fn into_job(self) -> Option<Job> {
        Some(Job {
            id: self.job_id?,
            title: self.title?,
            description: truncate_chars(&self.description.unwrap_or_default(), DESCRIPTION_LIMIT),
            company: self.company_name,
            location: self.location,
            extra: Map::new(),
        })
    }
}

#[derive(Clone)]
pub struct JobSearchClient {
    client: Client,
    url: String,
    api_key: String,
}

impl JobSearchClient {
    pub fn new(url: String, api_key: String) -> Result<Self, JobSearchError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            url,
            api_key,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Job>, JobSearchError> {
        debug!("Searching jobs for {query:?}");

        let response = self
            .client
            .get(&self.url)
            .query(&[("engine", ENGINE), ("q", query), ("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Job search API returned {}: {}", status, message);
            return Err(JobSearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        let jobs: Vec<Job> = body
            .jobs_results
            .into_iter()
            .filter_map(SearchResult::into_job)
            .collect();
        debug!("Job search returned {} results", jobs.len());
        Ok(jobs)
    }
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
