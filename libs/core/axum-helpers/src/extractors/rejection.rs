//! The itemized 400 body shared by all validating extractors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Name carried by every issue set
pub const VALIDATION_ERROR_NAME: &str = "ValidationError";

/// Key `validator` uses for struct-level (schema) errors
const SCHEMA_ERRORS_KEY: &str = "__all__";

/// Part of the request an issue set refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RequestPart {
    Body,
    Query,
    Params,
}

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationIssue {
    /// Rule identifier, e.g. `required`, `custom`, `invalid_type`
    pub code: String,
    /// Field path inside the request part; empty for the part as a whole
    pub path: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationIssues {
    pub issues: Vec<ValidationIssue>,
    pub name: String,
}

/// All issues found in one request part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationFailure {
    #[serde(rename = "type")]
    pub part: RequestPart,
    pub errors: ValidationIssues,
}

/// Rejection returned by the validating extractors.
///
/// Responds `400 Bad Request` with a JSON array of [`ValidationFailure`].
#[derive(Debug)]
pub struct ValidationRejection(pub Vec<ValidationFailure>);

impl ValidationRejection {
    pub fn new(part: RequestPart, issues: Vec<ValidationIssue>) -> Self {
        Self(vec![ValidationFailure {
            part,
            errors: ValidationIssues {
                issues,
                name: VALIDATION_ERROR_NAME.to_string(),
            },
        }])
    }

    /// Flatten `validator` errors into issues.
    ///
    /// A struct-level error may carry a `path` param (array of strings) naming
    /// the fields it concerns; otherwise its path is the enclosing struct.
    pub fn from_errors(part: RequestPart, errors: &ValidationErrors) -> Self {
        let mut issues = Vec::new();
        collect_issues(errors, &mut Vec::new(), &mut issues);
        // validator keeps fields in a HashMap
        issues.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.code.cmp(&b.code)));
        Self::new(part, issues)
    }

    /// The request part could not be deserialized at all.
    pub fn malformed(part: RequestPart, message: impl Into<String>) -> Self {
        Self::invalid_type(part, Vec::new(), message)
    }

    /// A value inside the request part has the wrong type.
    pub fn invalid_type(part: RequestPart, path: Vec<String>, message: impl Into<String>) -> Self {
        Self::new(
            part,
            vec![ValidationIssue {
                code: "invalid_type".to_string(),
                path,
                message: message.into(),
            }],
        )
    }

    /// Merge the failures of several request parts into one response.
    pub fn combine(rejections: impl IntoIterator<Item = ValidationRejection>) -> Self {
        Self(rejections.into_iter().flat_map(|rejection| rejection.0).collect())
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.0
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        tracing::info!(failures = ?self.0, "Request validation failed");
        (StatusCode::BAD_REQUEST, Json(self.0)).into_response()
    }
}

fn collect_issues(errors: &ValidationErrors, prefix: &mut Vec<String>, out: &mut Vec<ValidationIssue>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|error| to_issue(prefix, field, error)));
            }
            ValidationErrorsKind::Struct(nested) => {
                prefix.push(field.to_string());
                collect_issues(nested, prefix, out);
                prefix.pop();
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    prefix.push(field.to_string());
                    prefix.push(index.to_string());
                    collect_issues(nested, prefix, out);
                    prefix.truncate(prefix.len() - 2);
                }
            }
        }
    }
}

fn to_issue(prefix: &[String], field: &str, error: &ValidationError) -> ValidationIssue {
    let mut path = prefix.to_vec();
    match error.params.get("path").and_then(|value| value.as_array()) {
        Some(fields) => path.extend(
            fields
                .iter()
                .filter_map(|field| field.as_str().map(str::to_string)),
        ),
        None if field == SCHEMA_ERRORS_KEY => {}
        None => path.push(field.to_string()),
    }

    let message = error
        .message
        .as_ref()
        .map(|message| message.to_string())
        .unwrap_or_else(|| default_message(&error.code));

    ValidationIssue {
        code: error.code.to_string(),
        path,
        message,
    }
}

fn default_message(code: &str) -> String {
    match code {
        "required" => "Required".to_string(),
        "length" => "Invalid length".to_string(),
        "email" => "Invalid email".to_string(),
        "range" => "Number out of range".to_string(),
        other => format!("Invalid value ({})", other),
    }
}
