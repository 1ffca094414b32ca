//! Path parameter extractor with validation.

use super::rejection::{RequestPart, ValidationRejection};
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Path parameters extractor with automatic validation.
///
/// Failures are reported under the `Params` request part.
pub struct ValidatedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(data) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ValidationRejection::malformed(RequestPart::Params, e.body_text()))?;

        data.validate()
            .map_err(|e| ValidationRejection::from_errors(RequestPart::Params, &e))?;

        Ok(ValidatedPath(data))
    }
}
