//! JSON body extraction for Web API DTOs.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::i18n::Localizer;
use crate::web::error::ApiError;

/// A JSON extractor whose rejection is a `ValidationFailed` envelope.
///
/// Field rules are applied by the services, so this only guarantees the
/// body is well-formed JSON of the expected shape.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let localizer = req.extensions().get::<Arc<dyn Localizer>>().cloned();

        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Rejected request body: {}", e);
            ApiError::bad_request(localizer.as_deref())
        })?;

        Ok(JsonBody(value))
    }
}
