//! Shared error types.
//!
//! The weather and chart crates wrap these where they touch the network or
//! the cache database; the binary reports failures through [`AppError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Cache error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// One-line hint for the operator, without internals.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Database(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "Could not write the chart output.",
            AppError::Other(_) => "Chart generation failed.",
        }
    }
}

/// Failures talking to the forecast provider.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Forecast request timed out")]
    Timeout,

    #[error("Provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unreadable response body: {0}")]
    BadBody(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::Unreachable(_) => "The forecast provider could not be reached.",
            NetworkError::Timeout => "The forecast provider did not answer in time.",
            NetworkError::HttpStatus { status, .. } if *status >= 500 => {
                "The forecast provider is having problems."
            }
            NetworkError::HttpStatus { .. } => "The forecast provider rejected the request.",
            NetworkError::BadBody(_) => "The forecast provider sent a response that could not be read.",
        }
    }

    /// Worth retrying on the next cycle
    pub fn is_transient(&self) -> bool {
        match self {
            NetworkError::Unreachable(_) | NetworkError::Timeout => true,
            NetworkError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            NetworkError::BadBody(_) => false,
        }
    }
}

/// Failures of the SQLite forecast cache.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Cannot open cache: {0}")]
    Open(String),

    #[error("Cache query failed: {0}")]
    Query(String),

    #[error("Cache file is corrupt: {0}")]
    Corrupt(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::Open(_) => "The forecast cache could not be opened.",
            DatabaseError::Query(_) => "Reading or writing the forecast cache failed.",
            DatabaseError::Corrupt(_) => "The forecast cache is damaged; delete it to start fresh.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Cannot read configuration: {0}")]
    Unreadable(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "config.toml has invalid values.",
            ConfigError::Unreadable(_) => "config.toml could not be read or parsed.",
        }
    }
}

/// Map reqwest failures onto [`NetworkError`].
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            return NetworkError::Timeout;
        }
        match self.status() {
            Some(status) => NetworkError::HttpStatus {
                status: status.as_u16(),
                body: self.to_string(),
            },
            None if self.is_decode() || self.is_body() => NetworkError::BadBody(self.to_string()),
            None => NetworkError::Unreachable(self.to_string()),
        }
    }
}

/// Map rusqlite failures onto [`DatabaseError`].
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        use rusqlite::ErrorCode;

        match self.sqlite_error_code() {
            Some(ErrorCode::CannotOpen | ErrorCode::PermissionDenied) => {
                DatabaseError::Open(self.to_string())
            }
            Some(ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase) => {
                DatabaseError::Corrupt(self.to_string())
            }
            _ => DatabaseError::Query(self.to_string()),
        }
    }
}
