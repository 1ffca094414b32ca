use axum::{
    Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use axum_helpers::{
    RequiredScopes, TokenVerifier, ValidatedJson, ValidatedPath, ValidatedQuery,
    ValidationRejection,
    errors::responses::{BadRequestValidationResponse, ForbiddenResponse, UnauthorizedResponse},
    require_auth, require_scope,
};
use std::sync::Arc;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::error::{ApiError, ErrorBody, InternalErrorResponse};
use crate::models::{
    CreateUser, CreateUserBody, PaginationQuery, UpdateUserBody, UserChanges, UserIdPath,
};
use crate::repository::UserRepository;
use crate::serializer::{UserEnvelope, UserResponse, UsersResponse, serialize_user};

pub const TAG: &str = "users";

/// Scopes accepted by `POST /users`
pub const CREATE_SCOPES: [&str; 2] = ["admin:root", "users:create"];
/// Scopes accepted by `PATCH /users/{id}`
pub const UPDATE_SCOPES: [&str; 2] = ["admin:root", "users:update"];

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, update_user),
    components(
        schemas(
            UserResponse,
            UsersResponse,
            UserEnvelope,
            CreateUserBody,
            UpdateUserBody,
            ErrorBody
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalErrorResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = TAG, description = "User management endpoints")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Create the users router.
///
/// Listing is public; creating and updating require a verified bearer token
/// carrying one of [`CREATE_SCOPES`] / [`UPDATE_SCOPES`].
pub fn router<R: UserRepository + 'static>(repository: R, verifier: TokenVerifier) -> Router {
    let create = post(create_user::<R>)
        .layer(from_fn_with_state(
            RequiredScopes::any(CREATE_SCOPES),
            require_scope,
        ))
        .layer(from_fn_with_state(verifier.clone(), require_auth));

    let update = patch(update_user::<R>)
        .layer(from_fn_with_state(
            RequiredScopes::any(UPDATE_SCOPES),
            require_scope,
        ))
        .layer(from_fn_with_state(verifier, require_auth));

    Router::new()
        .route("/", get(list_users::<R>).merge(create))
        .route("/{id}", update)
        .with_state(Arc::new(repository))
}

/// List users, oldest first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of users", body = UsersResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(repository): State<Arc<R>>,
    ValidatedQuery(query): ValidatedQuery<PaginationQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    let pagination = query.pagination();
    tracing::info!(?query, ?pagination, "Listing users");

    match repository.list_paginated(pagination).await {
        Ok(users) => {
            tracing::info!(count = users.len(), "Users successfully retrieved");
            Ok(Json(UsersResponse {
                users: users.into_iter().map(serialize_user).collect(),
            }))
        }
        Err(err) => {
            tracing::error!(error = %err, kind = ?err.kind(), ?pagination, "Error getting users");
            Err(ApiError::Internal("Error getting users"))
        }
    }
}

/// Create a user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUserBody,
    security(("bearer_auth" = ["admin:root", "users:create"])),
    responses(
        (status = 200, description = "User created", body = UserEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(repository): State<Arc<R>>,
    ValidatedJson(body): ValidatedJson<CreateUserBody>,
) -> Result<Json<UserEnvelope>, ApiError> {
    tracing::info!(?body, "Starting to create a user");

    match repository.create(CreateUser::from(body.clone())).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User successfully created");
            Ok(Json(UserEnvelope {
                user: serialize_user(user),
            }))
        }
        Err(err) => {
            tracing::error!(error = %err, kind = ?err.kind(), ?body, "Error creating user");
            Err(ApiError::Internal("Error creating user"))
        }
    }
}

/// Update a user's name and/or email
///
/// An omitted `name` is stored as null.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserBody,
    security(("bearer_auth" = ["admin:root", "users:update"])),
    responses(
        (status = 200, description = "User updated", body = UserEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(repository): State<Arc<R>>,
    path: Result<ValidatedPath<UserIdPath>, ValidationRejection>,
    body: Result<ValidatedJson<UpdateUserBody>, ValidationRejection>,
) -> Result<Json<UserEnvelope>, ApiError> {
    // Params and Body failures are reported together
    let (ValidatedPath(UserIdPath { id }), ValidatedJson(body)) = match (path, body) {
        (Ok(path), Ok(body)) => (path, body),
        (path, body) => {
            let rejections = path.err().into_iter().chain(body.err());
            return Err(ValidationRejection::combine(rejections).into());
        }
    };

    tracing::info!(%id, ?body, "Starting to update a user");

    match repository
        .update_by_id(&id, UserChanges::from(body.clone()))
        .await
    {
        Ok(user) => {
            tracing::info!(%id, "User successfully updated");
            Ok(Json(UserEnvelope {
                user: serialize_user(user),
            }))
        }
        Err(err) => {
            tracing::error!(error = %err, kind = ?err.kind(), %id, ?body, "Error updating user");
            Err(ApiError::Internal("Error updating user"))
        }
    }
}
