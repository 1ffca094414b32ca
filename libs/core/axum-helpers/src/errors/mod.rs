pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Standard error response structure.
///
/// ```json
/// {
///   "code": 1007,
///   "error": "FORBIDDEN",
///   "message": "Insufficient scope"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

/// Errors raised by the shared middleware.
///
/// The message is sent to the client as-is, so it must not carry internal
/// detail.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let message = match self {
            AppError::Unauthorized(message) | AppError::Forbidden(message) => message,
        };
        tracing::info!(error_code = code.code(), "{}: {}", code, message);

        error_response(status, message, code)
    }
}

/// Build an error response with the standard body.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
    });

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_auth_errors_map_to_401_and_403() {
        let unauthorized = AppError::Unauthorized("No authorization token was found".into());
        assert_eq!(unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);

        let forbidden = AppError::Forbidden("Insufficient scope".into()).into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_of(forbidden).await.error, "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_unauthorized_body_shape() {
        let response = AppError::Unauthorized("Invalid token".into()).into_response();
        let body = body_of(response).await;
        assert_eq!(body.code, 1006);
        assert_eq!(body.error, "UNAUTHORIZED");
        assert_eq!(body.message, "Invalid token");
    }
}
