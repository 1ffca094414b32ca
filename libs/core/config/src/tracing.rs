use crate::{env_parse, ConfigError, Environment, FromEnv};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations. Safe to call
/// multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Log output settings.
///
/// Environment variables:
/// - `LOG_LEVEL`: filter directive used when `RUST_LOG` is unset (default: "debug")
/// - `LOG_AS_JSON`: emit JSON lines (default: true in production, false otherwise)
/// - `LOG_CONSOLE_ENABLED`: write events to stdout at all (default: true)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub console: bool,
}

impl LoggingConfig {
    pub fn for_environment(environment: &Environment) -> Self {
        Self {
            level: "debug".to_string(),
            json: environment.is_production(),
            console: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(&Environment::Development)
    }
}

impl FromEnv for LoggingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::for_environment(&Environment::from_env());

        Ok(Self {
            level: env_parse("LOG_LEVEL", &defaults.level)?,
            json: env_parse("LOG_AS_JSON", &defaults.json.to_string())?,
            console: env_parse("LOG_CONSOLE_ENABLED", &defaults.console.to_string())?,
        })
    }
}

/// Initialize tracing with error span capture.
///
/// - JSON mode: flattened JSON events without module targets, for log shippers
/// - Pretty mode: human-readable multi-line events
/// - Console disabled: filter and `ErrorLayer` only, nothing is written
///
/// `RUST_LOG` overrides `LoggingConfig::level` when set.
///
/// Safe to call multiple times; later calls are no-ops (common in tests).
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if !config.console {
        tracing_subscriber::registry()
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else if config.json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => {
            info!(
                level = %config.level,
                json = config.json,
                "Tracing initialized with ErrorLayer"
            );
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }
}
