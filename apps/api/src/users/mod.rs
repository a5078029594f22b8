pub mod handlers;
pub mod repository;

use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::AuthSession;
use crate::users::repository::UserRepository;

/// Saves the `extracted_skills` of an AI analysis result as the caller's
/// skills summary. Best effort: failures are logged, never returned.
pub async fn record_extracted_skills(
    users: &dyn UserRepository,
    session: &AuthSession,
    analysis: &Value,
) {
    let Some(summary) = skills_summary(analysis) else {
        debug!("Analysis result carries no extracted_skills; profile left unchanged");
        return;
    };

    let saved = match users
        .upsert_by_email(&session.email, session.name.as_deref())
        .await
    {
        Ok(_) => users.update_skills(&session.email, &summary).await.map(|_| ()),
        Err(e) => Err(e),
    };

    if let Err(e) = saved {
        warn!(
            "Failed to save extracted skills for user {}: {e}",
            session.user_id
        );
    }
}

/// Comma-joined `extracted_skills`, or `None` when absent or empty.
fn skills_summary(analysis: &Value) -> Option<String> {
    let skills: Vec<&str> = analysis
        .get("extracted_skills")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if skills.is_empty() {
        None
    } else {
        Some(skills.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skills_summary_joins_strings() {
        let analysis = json!({"extracted_skills": ["Python", " SQL ", 3, ""]});
        assert_eq!(skills_summary(&analysis).as_deref(), Some("Python, SQL"));
    }

    #[test]
    fn test_skills_summary_absent() {
        assert_eq!(skills_summary(&json!({"matched_jobs": []})), None);
        assert_eq!(skills_summary(&json!({"extracted_skills": []})), None);
        assert_eq!(skills_summary(&json!({"extracted_skills": "Python"})), None);
        assert_eq!(skills_summary(&json!([1, 2])), None);
    }
}
