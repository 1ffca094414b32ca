use utoipa::OpenApi;

/// Combined API documentation served by the docs UIs
#[derive(OpenApi)]
#[openapi(
    info(title = "Users API", description = "Paginated listing, creation and update of users"),
    nest(
        (path = "/api/v0/users", api = domain_users::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
