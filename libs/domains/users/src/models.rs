use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_OFFSET: u64 = 0;

/// User record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new user; id and timestamps come from the datastore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: String,
}

/// Partial update. `None` leaves a column alone; `Some(None)` clears `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<Option<String>>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

/// `GET /users` query string.
///
/// Values stay raw strings so a non-numeric value is reported as a
/// validation issue on its own field instead of a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Maximum number of users to return (default 10)
    #[param(value_type = Option<u64>)]
    pub limit: Option<String>,
    /// Number of users to skip (default 0)
    #[param(value_type = Option<u64>)]
    pub offset: Option<String>,
}

impl PaginationQuery {
    /// Resolved values; call after validation.
    pub fn pagination(&self) -> Pagination {
        Pagination {
            limit: parse_count(self.limit.as_deref())
                .ok()
                .flatten()
                .unwrap_or(DEFAULT_LIMIT),
            offset: parse_count(self.offset.as_deref())
                .ok()
                .flatten()
                .unwrap_or(DEFAULT_OFFSET),
        }
    }
}

impl Validate for PaginationQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = parse_count(self.limit.as_deref()) {
            errors.add("limit", err);
        }
        if let Err(err) = parse_count(self.offset.as_deref()) {
            errors.add("offset", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Blank counts as absent
fn parse_count(raw: Option<&str>) -> Result<Option<u64>, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<i64>() {
        Ok(value) if value < 0 => Err(ValidationError::new("too_small")
            .with_message(Cow::Borrowed("Number must be greater than or equal to 0"))),
        Ok(value) => Ok(Some(value as u64)),
        Err(_) => Err(ValidationError::new("invalid_type")
            .with_message(Cow::Owned(format!("Expected number, received '{}'", raw)))),
    }
}

/// `POST /users` body.
///
/// A missing `email` deserializes as empty and fails the `required` rule.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateUserBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, code = "required", message = "Required"))]
    #[schema(required = true)]
    pub email: String,
}

impl From<CreateUserBody> for CreateUser {
    fn from(body: CreateUserBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
        }
    }
}

/// `PATCH /users/{id}` path
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserIdPath {
    #[validate(length(min = 1))]
    pub id: String,
}

/// `PATCH /users/{id}` body.
///
/// An omitted `name` is null, so every update rewrites it.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[validate(schema(function = "validate_name_or_email"))]
pub struct UpdateUserBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<UpdateUserBody> for UserChanges {
    fn from(body: UpdateUserBody) -> Self {
        Self {
            name: Some(body.name),
            email: body.email,
        }
    }
}

fn validate_name_or_email(body: &UpdateUserBody) -> Result<(), ValidationError> {
    let provided = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
    if provided(&body.email) || provided(&body.name) {
        return Ok(());
    }

    let mut error = ValidationError::new("custom")
        .with_message(Cow::Borrowed("name or email must be provided"));
    error.add_param(Cow::Borrowed("path"), &["name", "email"]);
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>, offset: Option<&str>) -> PaginationQuery {
        PaginationQuery {
            limit: limit.map(String::from),
            offset: offset.map(String::from),
        }
    }

    #[test]
    fn test_pagination_defaults() {
        let q = query(None, None);
        assert!(q.validate().is_ok());
        assert_eq!(q.pagination(), Pagination { limit: 10, offset: 0 });
    }

    #[test]
    fn test_pagination_parses_values() {
        let q = query(Some("25"), Some("50"));
        assert!(q.validate().is_ok());
        assert_eq!(q.pagination(), Pagination { limit: 25, offset: 50 });
    }

    #[test]
    fn test_pagination_rejects_non_numeric_limit() {
        let errors = query(Some("invalid"), None).validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["limit"][0].code, "invalid_type");
        assert!(!fields.contains_key("offset"));
    }

    #[test]
    fn test_pagination_rejects_negative_offset() {
        let errors = query(None, Some("-1")).validate().unwrap_err();
        assert_eq!(errors.field_errors()["offset"][0].code, "too_small");
    }

    #[test]
    fn test_pagination_blank_is_default() {
        let q = query(Some(""), Some(" "));
        assert!(q.validate().is_ok());
        assert_eq!(q.pagination(), Pagination::default());
    }

    #[test]
    fn test_create_body_requires_email() {
        let body: CreateUserBody = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        let errors = body.validate().unwrap_err();
        let error = &errors.field_errors()["email"][0];
        assert_eq!(error.code, "required");
        assert_eq!(error.message.as_deref(), Some("Required"));

        let body: CreateUserBody = serde_json::from_str(r#"{"email":""}"#).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_create_body_name_defaults_to_null() {
        let body: CreateUserBody = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert!(body.validate().is_ok());

        let input = CreateUser::from(body);
        assert_eq!(input.name, None);
        assert_eq!(input.email, "a@b.com");
    }

    #[test]
    fn test_update_body_needs_name_or_email() {
        let body: UpdateUserBody = serde_json::from_str("{}").unwrap();
        assert!(body.validate().is_err());

        let body: UpdateUserBody = serde_json::from_str(r#"{"email":""}"#).unwrap();
        assert!(body.validate().is_err());

        let body: UpdateUserBody = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_update_body_without_name_clears_it() {
        let body: UpdateUserBody = serde_json::from_str(r#"{"email":"new@b.com"}"#).unwrap();
        let changes = UserChanges::from(body);

        assert_eq!(changes.name, Some(None));
        assert_eq!(changes.email.as_deref(), Some("new@b.com"));
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_user_id_path_rejects_empty() {
        let path = UserIdPath { id: String::new() };
        assert!(path.validate().is_err());
    }
}
