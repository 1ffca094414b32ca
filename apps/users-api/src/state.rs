use axum_helpers::TokenVerifier;
use sea_orm::DatabaseConnection;

use crate::config::Config;

/// Shared handles built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
    pub verifier: TokenVerifier,
}
