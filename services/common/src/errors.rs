//! Common error types for services

use thiserror::Error;

/// Service error types
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Connection failed error
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Service unavailable error
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Invalid request error
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Malformed or stale snapshot data
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Contract symbol could not be parsed
    #[error("Symbol parse error: {0}")]
    SymbolParse(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Rate limited error
    #[error("Rate limited: {0}")]
    RateLimited(String),
}
