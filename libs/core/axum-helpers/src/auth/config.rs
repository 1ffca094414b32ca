//! Identity provider configuration.

use core_config::{ConfigError, FromEnv, env_parse, env_required};
use std::num::NonZeroU32;
use std::time::Duration;

const DEFAULT_JWKS_REQUESTS_PER_MINUTE: u32 = 5;
const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 600;

/// Auth0 tenant settings.
///
/// Loaded from environment variables:
/// - `AUTH0_DOMAIN` (required) - tenant domain, e.g. `tenant.eu.auth0.com`
/// - `AUTH0_AUDIENCE` (required) - API identifier expected in `aud`
/// - `JWKS_REQUESTS_PER_MINUTE` (default: 5)
/// - `JWKS_CACHE_TTL_SECS` (default: 600)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Auth0Config {
    pub domain: String,
    pub audience: String,
    pub jwks_requests_per_minute: NonZeroU32,
    pub jwks_cache_ttl: Duration,
}

impl Auth0Config {
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
            jwks_requests_per_minute: NonZeroU32::new(DEFAULT_JWKS_REQUESTS_PER_MINUTE)
                .unwrap_or(NonZeroU32::MIN),
            jwks_cache_ttl: Duration::from_secs(DEFAULT_JWKS_CACHE_TTL_SECS),
        }
    }

    /// Expected `iss` claim
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_uri(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.domain)
    }
}

impl FromEnv for Auth0Config {
    fn from_env() -> Result<Self, ConfigError> {
        let domain = env_required("AUTH0_DOMAIN")?;
        let audience = env_required("AUTH0_AUDIENCE")?;

        let jwks_requests_per_minute = env_parse(
            "JWKS_REQUESTS_PER_MINUTE",
            &DEFAULT_JWKS_REQUESTS_PER_MINUTE.to_string(),
        )?;
        let ttl_secs: u64 = env_parse(
            "JWKS_CACHE_TTL_SECS",
            &DEFAULT_JWKS_CACHE_TTL_SECS.to_string(),
        )?;

        Ok(Self {
            domain: domain.trim().trim_end_matches('/').to_string(),
            audience,
            jwks_requests_per_minute,
            jwks_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}
