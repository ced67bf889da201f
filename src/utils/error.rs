// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 403 Forbidden

    #[error("Portal answered with a login page instead of JSON - session likely expired")]
    SessionExpired,

    #[error("Failed to parse portal response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch failed for {entity} ({kind}): {source}")]
    FetchFailed {
        entity: String,
        kind: String,
        #[source]
        source: PortalError,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Portal interaction failed: {0}")]
    Portal(#[from] PortalError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Report output failed: {0}")]
    Report(#[from] csv::Error),
}
