use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build or send the HTTP request: {0}")]
    RequestBuild(#[from] reqwest::Error),

    #[error("The API request returned an error: {0}")]
    ApiError(String),

    #[error("Symbol '{0}' is not known to the price source")]
    SymbolNotFound(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("Failed to read or write price CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Price file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Received prices do not form a valid table: {0}")]
    Table(#[from] CoreError),
}
