use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::Error;

/// JSON extractor that enforces the request schema before any handler
/// logic runs. Malformed or missing fields reject with a 400
/// `InvalidArgument`; field-level rule failures reject with a 422
/// carrying structured per-field errors.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::InvalidArgument(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
