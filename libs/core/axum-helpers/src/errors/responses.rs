//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
use crate::extractors::ValidationFailure;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Bad Request - one entry per invalid request part",
    content_type = "application/json",
    example = json!([{
        "type": "Body",
        "errors": {
            "issues": [{
                "code": "custom",
                "path": ["name", "email"],
                "message": "name or email must be provided"
            }],
            "name": "ValidationError"
        }
    }])
)]
pub struct BadRequestValidationResponse(pub Vec<ValidationFailure>);

#[derive(ToResponse)]
#[response(
    description = "Unauthorized - missing or invalid bearer token",
    content_type = "application/json",
    example = json!({
        "code": 1006,
        "error": "UNAUTHORIZED",
        "message": "No authorization token was found"
    })
)]
pub struct UnauthorizedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Forbidden - token lacks every required scope",
    content_type = "application/json",
    example = json!({
        "code": 1007,
        "error": "FORBIDDEN",
        "message": "Insufficient scope"
    })
)]
pub struct ForbiddenResponse(pub ErrorResponse);
