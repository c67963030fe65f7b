use thiserror::Error;

/// Failures while building the application `Config`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file or environment: {0}")]
    LoadError(#[from] config::ConfigError),

    /// Settings that parse but break a rule, such as too many tickers.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}
