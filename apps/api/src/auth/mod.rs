//! Session verification.
//!
//! The sign-in flow lives outside this service; it hands the browser an HS256
//! session token carrying the user id, email and the provider access token.
//! Here we only verify that token, from the `Authorization: Bearer` header or
//! the session cookie, and expose it to handlers as [`AuthSession`].

pub mod handlers;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

const SESSION_COOKIES: [&str; 2] = [
    "__Secure-next-auth.session-token",
    "next-auth.session-token",
];

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session token presented")]
    MissingToken,

    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("session token carries no {0}")]
    MissingClaim(&'static str),
}

/// Claims as written by the sign-in flow. The user id arrives as either `sub` or `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "accessToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// An authenticated caller. Extracting it from a request without a valid
/// session rejects the request with 401.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub access_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<SessionClaims> for AuthSession {
    type Error = AuthError;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        let user_id = claims
            .id
            .or(claims.sub)
            .ok_or(AuthError::MissingClaim("user id"))?;
        let email = claims
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or(AuthError::MissingClaim("email"))?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AuthError::MissingClaim("valid expiry"))?;

        Ok(AuthSession {
            user_id,
            email,
            name: claims.name,
            access_token: claims.access_token,
            expires_at,
        })
    }
}

#[derive(Clone)]
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    #[cfg(test)]
    secret: String,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            #[cfg(test)]
            secret: secret.to_string(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthSession, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        AuthSession::try_from(data.claims)
    }

    #[cfg(test)]
    pub fn sign(&self, claims: &SessionClaims) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .unwrap()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        extract_token(parts)
            .ok_or(AuthError::MissingToken)
            .and_then(|token| state.sessions.verify(token))
            .map_err(|e| {
            debug!("Rejected session: {e}");
            AppError::Unauthorized
        })
    }
}

/// Bearer header first, then the session cookie. Non-Bearer schemes are ignored.
fn extract_token(parts: &Parts) -> Option<&str> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| SESSION_COOKIES.contains(&name))
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}
