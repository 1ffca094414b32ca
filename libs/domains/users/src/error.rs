use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::ValidationRejection;
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::{ToResponse, ToSchema};

/// Repository operation an error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Find,
    Create,
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Find => "find",
            Operation::Create => "create",
            Operation::Update => "update",
        })
    }
}

/// Coarse classification callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unknown,
}

#[derive(Debug, Error)]
pub enum UserError {
    /// No record matched, including ids that are not UUIDs
    #[error("Could not {op} user: {cause}")]
    NotFound { op: Operation, cause: String },

    /// Unique or foreign-key constraint violation
    #[error("Could not {op} user: {cause}")]
    Conflict { op: Operation, cause: String },

    /// The datastore refused the statement for another reason
    #[error("Could not {op} user: {cause}")]
    Rejected { op: Operation, cause: String },

    /// Connection, pool and driver failures, passed through untouched
    #[error(transparent)]
    Database(DbErr),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn not_found(op: Operation, cause: impl Into<String>) -> Self {
        UserError::NotFound {
            op,
            cause: cause.into(),
        }
    }

    /// Classify a sea-orm error raised while running `op`.
    pub fn from_db(op: Operation, err: DbErr) -> Self {
        if matches!(err, DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) {
            return UserError::NotFound {
                op,
                cause: err.to_string(),
            };
        }

        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(cause))
            | Some(SqlErr::ForeignKeyConstraintViolation(cause)) => {
                return UserError::Conflict { op, cause };
            }
            _ => {}
        }

        match err {
            DbErr::Query(_)
            | DbErr::Exec(_)
            | DbErr::Type(_)
            | DbErr::Json(_)
            | DbErr::RecordNotInserted => UserError::Rejected {
                op,
                cause: err.to_string(),
            },
            other => UserError::Database(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UserError::NotFound { .. } => ErrorKind::NotFound,
            UserError::Conflict { .. } => ErrorKind::Conflict,
            UserError::Rejected { .. } | UserError::Database(_) => ErrorKind::Unknown,
        }
    }
}

/// Body of the generic 500 answered by the user endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error - repository detail is only logged",
    content_type = "application/json"
)]
pub struct InternalErrorResponse(pub ErrorBody);

/// Failure responses of the user endpoints
#[derive(Debug)]
pub enum ApiError {
    /// One or more request parts failed validation
    Invalid(ValidationRejection),
    /// Repository failure, answered with a fixed message
    Internal(&'static str),
}

impl From<ValidationRejection> for ApiError {
    fn from(rejection: ValidationRejection) -> Self {
        ApiError::Invalid(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(rejection) => rejection.into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: message.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
