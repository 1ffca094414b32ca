use super::verifier::{AuthError, Claims, TokenVerifier};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Bearer token authentication middleware
///
/// Verifies the token and inserts its [`Claims`] into request extensions.
/// Any failure responds `401 Unauthorized`.
///
/// # Example
///
/// ```ignore
/// let protected = post(create_user)
///     .layer(axum::middleware::from_fn_with_state(verifier, require_auth));
/// ```
pub async fn require_auth(
    State(verifier): State<TokenVerifier>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .map(str::to_owned)
        .ok_or(AuthError::MissingToken)?;
    let claims = verifier.verify(&token).await?;

    tracing::debug!(sub = ?claims.sub, "Token verified");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Scopes a route accepts; holding any one of them is enough.
#[derive(Clone, Debug)]
pub struct RequiredScopes(Arc<[String]>);

impl RequiredScopes {
    pub fn any<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(scopes.into_iter().map(Into::into).collect())
    }

    pub fn scopes(&self) -> &[String] {
        &self.0
    }
}

/// Scope check middleware
///
/// Must run after [`require_auth`]. Responds `403 Forbidden` when the request
/// carries no claims or none of the required scopes.
pub async fn require_scope(
    State(required): State<RequiredScopes>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let allowed = request
        .extensions()
        .get::<Claims>()
        .is_some_and(|claims| claims.has_any_scope(required.scopes()));

    if !allowed {
        tracing::info!(required = ?required.scopes(), "Insufficient scope");
        return Err(AppError::Forbidden("Insufficient scope".to_string()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwksCache;
    use axum::{
        Router,
        body::Body,
        http::{HeaderValue, Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::post,
    };
    use jsonwebtoken::jwk::JwkSet;
    use std::num::NonZeroU32;
    use std::time::Duration;
    use test_utils::auth::{TEST_AUDIENCE, bearer, claims_with_scope, issuer, jwks, sign};
    use tower::ServiceExt;

    fn app() -> Router {
        let set: JwkSet = serde_json::from_value(jwks()).unwrap();
        let cache = JwksCache::new(
            "http://127.0.0.1:9/jwks.json",
            NonZeroU32::new(1).unwrap(),
            Duration::from_secs(600),
        )
        .unwrap()
        .with_keys(set);
        let verifier = TokenVerifier::new(Arc::new(cache), TEST_AUDIENCE, issuer());

        let protected = post(|| async { "created" })
            .layer(from_fn_with_state(
                RequiredScopes::any(["admin:root", "users:create"]),
                require_scope,
            ))
            .layer(from_fn_with_state(verifier, require_auth));

        Router::new().route("/users", protected)
    }

    async fn status_with(authorization: Option<String>) -> StatusCode {
        let mut request = HttpRequest::post("/users");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        assert_eq!(status_with(None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        assert_eq!(
            status_with(Some("Bearer nonsense".into())).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_any_matching_scope_passes() {
        assert_eq!(status_with(Some(bearer("users:create"))).await, StatusCode::OK);
        assert_eq!(status_with(Some(bearer("read admin:root"))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_insufficient_scope_is_forbidden() {
        assert_eq!(
            status_with(Some(bearer("users:update"))).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_token_without_scope_claim_is_forbidden() {
        let mut claims = claims_with_scope("");
        claims.as_object_mut().unwrap().remove("scope");
        let token = format!("Bearer {}", sign(&claims));

        assert_eq!(status_with(Some(token)).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_scope_without_auth_layer_is_forbidden() {
        let app = Router::new().route(
            "/users",
            post(|| async { "created" }).layer(from_fn_with_state(
                RequiredScopes::any(["admin:root"]),
                require_scope,
            )),
        );

        let response = app
            .oneshot(HttpRequest::post("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
