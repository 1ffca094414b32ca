use axum::Router;
use domain_users::{PgUserRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgUserRepository::new(state.db.clone());
    handlers::router(repository, state.verifier.clone())
}
