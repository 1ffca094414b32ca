use axum_helpers::Auth0Config;
use core_config::{
    AppInfo, FromEnv, app_info, env_optional, server::ServerConfig, tracing::LoggingConfig,
};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: Auth0Config,
    pub database: PostgresConfig,
    /// Error reporting endpoint; only logged at startup
    pub error_reporting_dsn: Option<String>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let logging = LoggingConfig::from_env()?;
        let auth = Auth0Config::from_env()?; // AUTH0_DOMAIN / AUTH0_AUDIENCE required
        let database = PostgresConfig::from_env()?; // DATABASE_URL required

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            logging,
            auth,
            database,
            error_reporting_dsn: env_optional("ERROR_REPORTING_DSN"),
        })
    }
}
