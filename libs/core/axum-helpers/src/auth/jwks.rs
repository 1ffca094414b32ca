//! Signing key cache for the identity provider's JWKS endpoint.

use super::config::Auth0Config;
use super::verifier::AuthError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use jsonwebtoken::jwk::{Jwk, JwkSet};
use std::fmt;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

struct CachedKeys {
    set: JwkSet,
    fetched_at: Instant,
}

/// Cached JWKS with a time-to-live and a fetch rate limit.
///
/// Lookups are served from the cache while it is fresh. A stale or missing
/// entry triggers a fetch when the limiter allows one; otherwise, and when the
/// fetch fails, a stale key is still accepted.
pub struct JwksCache {
    jwks_uri: String,
    client: reqwest::Client,
    ttl: Duration,
    limiter: DefaultDirectRateLimiter,
    keys: RwLock<Option<CachedKeys>>,
}

impl JwksCache {
    pub fn new(
        jwks_uri: impl Into<String>,
        requests_per_minute: NonZeroU32,
        ttl: Duration,
    ) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;

        Ok(Self {
            jwks_uri: jwks_uri.into(),
            client,
            ttl,
            limiter: RateLimiter::direct(Quota::per_minute(requests_per_minute)),
            keys: RwLock::new(None),
        })
    }

    pub fn from_config(config: &Auth0Config) -> Result<Self, AuthError> {
        Self::new(
            config.jwks_uri(),
            config.jwks_requests_per_minute,
            config.jwks_cache_ttl,
        )
    }

    /// Seed the cache with a known key set, counted as freshly fetched.
    pub fn with_keys(mut self, set: JwkSet) -> Self {
        self.keys = RwLock::new(Some(CachedKeys {
            set,
            fetched_at: Instant::now(),
        }));
        self
    }

    /// Find the signing key for `kid`.
    pub async fn key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let stale = {
            let guard = self.keys.read().await;
            match guard.as_ref() {
                Some(cached) if cached.fetched_at.elapsed() < self.ttl => {
                    if let Some(jwk) = cached.set.find(kid) {
                        return Ok(jwk.clone());
                    }
                    // unknown kid: the provider may have rotated keys
                    None
                }
                Some(cached) => cached.set.find(kid).cloned(),
                None => None,
            }
        };

        if self.limiter.check().is_err() {
            tracing::warn!(kid, "JWKS fetch rate limited");
            return stale.ok_or(AuthError::RateLimited);
        }

        match self.fetch().await {
            Ok(set) => {
                let jwk = set.find(kid).cloned();
                *self.keys.write().await = Some(CachedKeys {
                    set,
                    fetched_at: Instant::now(),
                });
                jwk.ok_or(AuthError::KeyNotFound)
            }
            Err(e) => match stale {
                Some(jwk) => {
                    tracing::warn!(kid, error = %e, "JWKS refresh failed, using stale key");
                    Ok(jwk)
                }
                None => Err(e),
            },
        }
    }

    #[tracing::instrument(skip(self), fields(uri = %self.jwks_uri))]
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let set = self
            .client
            .get(&self.jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;

        tracing::debug!(keys = set.keys.len(), "Fetched JWKS");
        Ok(set)
    }
}

impl fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwksCache")
            .field("jwks_uri", &self.jwks_uri)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use test_utils::auth::{TEST_KID, jwks};

    const JWKS_PATH: &str = "/.well-known/jwks.json";

    fn per_minute(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn test_key_set() -> JwkSet {
        serde_json::from_value(jwks()).unwrap()
    }

    #[tokio::test]
    async fn test_fetches_once_then_serves_from_cache() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(JWKS_PATH);
                then.status(200).json_body(jwks());
            })
            .await;

        let cache = JwksCache::new(server.url(JWKS_PATH), per_minute(5), Duration::from_secs(600))
            .unwrap();

        let first = cache.key(TEST_KID).await.unwrap();
        let second = cache.key(TEST_KID).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_kid_is_key_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(JWKS_PATH);
                then.status(200).json_body(jwks());
            })
            .await;

        let cache = JwksCache::new(server.url(JWKS_PATH), per_minute(5), Duration::from_secs(600))
            .unwrap();

        assert!(matches!(
            cache.key("rotated-away").await,
            Err(AuthError::KeyNotFound)
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_without_cached_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(JWKS_PATH);
                then.status(200).json_body(jwks());
            })
            .await;

        let cache = JwksCache::new(server.url(JWKS_PATH), per_minute(1), Duration::from_secs(600))
            .unwrap();

        assert!(matches!(cache.key("missing").await, Err(AuthError::KeyNotFound)));
        assert!(matches!(cache.key("missing").await, Err(AuthError::RateLimited)));
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_stale_key_used_when_refresh_fails() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(JWKS_PATH);
                then.status(503);
            })
            .await;

        let cache = JwksCache::new(server.url(JWKS_PATH), per_minute(5), Duration::ZERO)
            .unwrap()
            .with_keys(test_key_set());

        let jwk = cache.key(TEST_KID).await.unwrap();
        assert_eq!(jwk.common.key_id.as_deref(), Some(TEST_KID));
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_error_without_cache() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(JWKS_PATH);
                then.status(500);
            })
            .await;

        let cache = JwksCache::new(server.url(JWKS_PATH), per_minute(5), Duration::from_secs(600))
            .unwrap();

        assert!(matches!(cache.key(TEST_KID).await, Err(AuthError::Http(_))));
    }

    #[tokio::test]
    async fn test_seeded_cache_needs_no_network() {
        let cache = JwksCache::new("http://127.0.0.1:9/jwks.json", per_minute(1), Duration::from_secs(600))
            .unwrap()
            .with_keys(test_key_set());

        assert!(cache.key(TEST_KID).await.is_ok());
    }
}
