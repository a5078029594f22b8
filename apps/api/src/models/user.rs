use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    /// Free-text skills / profile summary fed to the match engine.
    pub skills: Option<String>,
    /// Stored as `JUNIOR` / `MENTOR`; see [`Role`].
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[cfg(test)]
    pub fn new(email: &str, name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(String::from),
            bio: None,
            skills: None,
            role: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The skills summary, if it has any non-whitespace content.
    pub fn skills_summary(&self) -> Option<&str> {
        self.skills.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Junior,
    Mentor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Junior => "JUNIOR",
            Role::Mentor => "MENTOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Case-insensitive: the dashboard compares lower-case role names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JUNIOR" => Ok(Role::Junior),
            "MENTOR" => Ok(Role::Mentor),
            _ => Err(format!("Unknown role '{s}'. Expected JUNIOR or MENTOR")),
        }
    }
}
