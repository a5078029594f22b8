//! Job listings: the static `jobs.json` catalog plus the optional live search.

pub mod handlers;
pub mod search;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

/// A single job listing. Keys beyond the known ones are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    /// Case-insensitive substring match over title, description and company.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .company
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(needle))
    }
}

/// Read-only job catalog, loaded once at startup.
#[derive(Debug, Default)]
pub struct JobCatalog {
    jobs: Vec<Job>,
}

impl JobCatalog {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("jobs file not found at {}", path.display()))?;
        let jobs: Vec<Job> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse job data in {}", path.display()))?;
        info!("Loaded {} jobs from {}", jobs.len(), path.display());
        Ok(Self::new(jobs))
    }

    pub fn all(&self) -> &[Job] {
        &self.jobs
    }

    pub fn find(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn search(&self, query: &str) -> Vec<Job> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.jobs.clone();
        }
        self.jobs
            .iter()
            .filter(|j| j.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
