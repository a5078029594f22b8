//! User persistence: a pluggable, trait-based store keyed by email.
//!
//! `AppState` holds an `Arc<dyn UserRepository>`; production uses
//! `PgUserRepository`, router tests swap in an in-memory store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, User};

/// Partial profile update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.skills.is_none()
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Inserts the user, or refreshes `name` (when given) on an existing row.
    async fn upsert_by_email(&self, email: &str, name: Option<&str>) -> Result<User, AppError>;

    async fn update_role(&self, email: &str, role: Role) -> Result<User, AppError>;

    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<User, AppError>;

    async fn update_skills(&self, email: &str, skills: &str) -> Result<User, AppError> {
        self.update_profile(
            email,
            &ProfileUpdate {
                skills: Some(skills.to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(email: &str) -> AppError {
    AppError::NotFound(format!("User {email} not found"))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn upsert_by_email(&self, email: &str, name: Option<&str>) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
                SET name = COALESCE(EXCLUDED.name, users.name),
                    updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_role(&self, email: &str, role: Role) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE email = $1 RETURNING *",
        )
        .bind(email)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(email))
    }

    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                skills = COALESCE($4, skills),
                updated_at = NOW()
            WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(update.name.as_deref())
        .bind(update.bio.as_deref())
        .bind(update.skills.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(email))
    }
}
