//! Query string extractor with validation.

use super::rejection::{RequestPart, ValidationRejection};
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query string extractor with automatic validation.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ValidationRejection::malformed(RequestPart::Query, e.body_text()))?;

        data.validate()
            .map_err(|e| ValidationRejection::from_errors(RequestPart::Query, &e))?;

        Ok(ValidatedQuery(data))
    }
}
