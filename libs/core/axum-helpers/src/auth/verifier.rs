//! Access token verification.

use super::config::Auth0Config;
use super::jwks::JwksCache;
use crate::errors::AppError;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Token header has no key id")]
    MissingKeyId,

    #[error("Unsupported token algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("No signing key matches the token key id")]
    KeyNotFound,

    #[error("Signing key fetch rate limited")]
    RateLimited,

    #[error("Failed to fetch signing keys: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => AppError::Unauthorized(err.to_string()),
            AuthError::Http(_) | AuthError::RateLimited => {
                tracing::warn!(error = %err, "Token rejected, signing keys unavailable");
                AppError::Unauthorized("Invalid token".to_string())
            }
            _ => {
                tracing::debug!(error = %err, "Token rejected");
                AppError::Unauthorized("Invalid token".to_string())
            }
        }
    }
}

/// `aud` may be a single string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// `scope` is normally space-separated, some issuers send a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeClaim {
    Text(String),
    List(Vec<String>),
}

impl ScopeClaim {
    pub fn contains(&self, scope: &str) -> bool {
        match self {
            ScopeClaim::Text(text) => text.split_whitespace().any(|s| s == scope),
            ScopeClaim::List(list) => list.iter().any(|s| s == scope),
        }
    }
}

/// Verified access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub iss: String,
    pub aud: Audience,
    pub exp: u64,
    pub iat: Option<u64>,
    pub scope: Option<ScopeClaim>,
}

impl Claims {
    /// True when at least one of `required` is granted
    pub fn has_any_scope<S: AsRef<str>>(&self, required: &[S]) -> bool {
        self.scope
            .as_ref()
            .is_some_and(|granted| required.iter().any(|s| granted.contains(s.as_ref())))
    }
}

/// Verifies RS256 access tokens against the issuer's published keys.
#[derive(Clone, Debug)]
pub struct TokenVerifier {
    keys: Arc<JwksCache>,
    audience: String,
    issuer: String,
}

impl TokenVerifier {
    pub fn new(keys: Arc<JwksCache>, audience: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            keys,
            audience: audience.into(),
            issuer: issuer.into(),
        }
    }

    pub fn from_config(config: &Auth0Config) -> Result<Self, AuthError> {
        let keys = JwksCache::from_config(config)?;
        tracing::info!(issuer = %config.issuer(), audience = %config.audience, "Token verifier initialized");
        Ok(Self::new(Arc::new(keys), &config.audience, config.issuer()))
    }

    /// Check signature, expiry, audience and issuer.
    #[tracing::instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let jwk = self.keys.key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let data = decode::<Claims>(token, &key, &validation)?;
        Ok(data.claims)
    }
}
