use crate::error::ConfigError;
use chrono::NaiveDate;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, Engine, Logging, Portfolio, Provider, ProviderKind};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix of environment variables that override file settings,
/// e.g. `TICKERPNL__PORTFOLIO__START_DATE=2023-01-01`.
pub const ENV_PREFIX: &str = "TICKERPNL";

/// Loads the application configuration.
///
/// With `path` set, that file must exist. Without it, `config.toml` is read if
/// present and built-in defaults are used otherwise. Environment variables are
/// applied on top, then the result is validated against `today`.
pub fn load_config(path: Option<&Path>, today: NaiveDate) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("portfolio.tickers")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate(today)?;

    tracing::debug!(
        tickers = config.portfolio.tickers.len(),
        start_date = %config.portfolio.start_date,
        "Configuration loaded."
    );

    Ok(config)
}
