//! Authentication and authorization module.
//!
//! This module provides:
//! - A JWKS key cache with TTL and a fetch rate limit
//! - RS256 access token verification against an Auth0-style issuer
//! - Middleware that requires a valid bearer token and one of a set of scopes
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{Auth0Config, RequiredScopes, TokenVerifier, require_auth, require_scope};
//! use core_config::FromEnv;
//!
//! let verifier = TokenVerifier::from_config(&Auth0Config::from_env()?)?;
//!
//! let create = post(create_user)
//!     .layer(from_fn_with_state(RequiredScopes::any(["admin:root", "users:create"]), require_scope))
//!     .layer(from_fn_with_state(verifier, require_auth));
//! ```

pub mod config;
pub mod jwks;
pub mod middleware;
pub mod verifier;

// Re-export commonly used types
pub use config::Auth0Config;
pub use jwks::JwksCache;
pub use middleware::{RequiredScopes, bearer_token, require_auth, require_scope};
pub use verifier::{Audience, AuthError, Claims, ScopeClaim, TokenVerifier};
