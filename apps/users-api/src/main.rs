use axum_helpers::{
    TokenVerifier,
    server::{create_production_app, health_router},
};
use core_config::tracing::{init_tracing, install_color_eyre};
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.logging);
    info!(
        app = %config.app.name,
        version = %config.app.version,
        environment = %config.environment,
        "Starting users API"
    );

    if let Some(dsn) = &config.error_reporting_dsn {
        info!(dsn = %dsn, "Error reporting DSN configured");
    }

    let db = database::postgres::connect_from_config(config.database.clone())
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<Migrator>(&db, &config.app.name).await?;

    let verifier = TokenVerifier::from_config(&config.auth)
        .map_err(|e| eyre::eyre!("Failed to initialize token verifier: {}", e))?;

    let state = AppState {
        config,
        db,
        verifier,
    };

    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router =
        axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &state.config.server).await?;

    // - /health: liveness check with app name/version
    // - /ready: readiness check against the database
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    let server_config = state.config.server.clone();
    let db = state.db.clone();

    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        info!("Shutting down: closing database connections");
        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
