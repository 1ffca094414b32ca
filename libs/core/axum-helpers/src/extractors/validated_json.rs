//! JSON body extractor with validation.

use super::rejection::{RequestPart, ValidationRejection};
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use serde_path_to_error::{Path, Segment};
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// A body that is not JSON is reported with an empty path; a value of the
/// wrong type is reported at the field that holds it.
///
/// ```ignore
/// use axum_helpers::extractors::ValidatedJson;
///
/// async fn create_user(ValidatedJson(body): ValidatedJson<CreateUserBody>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(|e| ValidationRejection::malformed(RequestPart::Body, e.body_text()))?;

        let data: T = serde_path_to_error::deserialize(value).map_err(|e| {
            let path = field_path(e.path());
            ValidationRejection::invalid_type(RequestPart::Body, path, e.inner().to_string())
        })?;

        data.validate()
            .map_err(|e| ValidationRejection::from_errors(RequestPart::Body, &e))?;

        Ok(ValidatedJson(data))
    }
}

fn field_path(path: &Path) -> Vec<String> {
    path.iter()
        .filter_map(|segment| match segment {
            Segment::Seq { index } => Some(index.to_string()),
            Segment::Map { key } => Some(key.clone()),
            Segment::Enum { variant } => Some(variant.clone()),
            Segment::Unknown => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct SignupBody {
        #[validate(length(min = 1))]
        email: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    async fn extract(body: &str) -> Result<ValidatedJson<SignupBody>, ValidationRejection> {
        let request = http::Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        ValidatedJson::<SignupBody>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(body) = extract(r#"{"email":"a@b.com"}"#).await.unwrap();
        assert_eq!(body.email, "a@b.com");
        assert!(body.tags.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_reports_field_path() {
        let rejection = extract(r#"{"email":5}"#).await.err().unwrap();
        let issue = &rejection.failures()[0].errors.issues[0];
        assert_eq!(issue.code, "invalid_type");
        assert_eq!(issue.path, vec!["email"]);
        assert!(issue.message.contains("expected a string"));
    }

    #[tokio::test]
    async fn test_nested_wrong_type_reports_index() {
        let rejection = extract(r#"{"email":"a@b.com","tags":["ok",1]}"#)
            .await
            .err()
            .unwrap();
        assert_eq!(
            rejection.failures()[0].errors.issues[0].path,
            vec!["tags", "1"]
        );
    }

    #[tokio::test]
    async fn test_invalid_json_has_empty_path() {
        let rejection = extract("{not json").await.err().unwrap();
        let failure = &rejection.failures()[0];
        assert_eq!(failure.part, RequestPart::Body);
        assert!(failure.errors.issues[0].path.is_empty());
    }

    #[tokio::test]
    async fn test_rules_run_after_deserialization() {
        let rejection = extract(r#"{"email":""}"#).await.err().unwrap();
        let issue = &rejection.failures()[0].errors.issues[0];
        assert_eq!(issue.code, "length");
        assert_eq!(issue.path, vec!["email"]);
    }
}
