//! Validating extractors for Axum handlers.
//!
//! Each extractor deserializes one part of the request, runs the `validator`
//! checks on it, and on failure rejects with HTTP 400 and a list of
//! [`ValidationFailure`] entries before the handler runs.

pub mod rejection;
pub mod validated_json;
pub mod validated_path;
pub mod validated_query;

pub use rejection::{
    RequestPart, ValidationFailure, ValidationIssue, ValidationIssues, ValidationRejection,
};
pub use validated_json::ValidatedJson;
pub use validated_path::ValidatedPath;
pub use validated_query::ValidatedQuery;
