//! Request body extractors.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::AppError;

/// `axum::Json` whose rejections (wrong content type, malformed JSON, wrong
/// field types) surface as `AppError::Validation` instead of axum's plain-text 4xx.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|e| {
                debug!("Rejected JSON body: {e}");
                AppError::Validation(e.body_text())
            })?;
        Ok(JsonBody(value))
    }
}
