use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Category of a failed sync, as exposed on a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorKind {
    /// The read API could not be reached or answered with an error status.
    Network,
    /// The snapshot broke a pool invariant and was rejected.
    InconsistentData,
    /// The response could not be decoded.
    Parse,
}

impl std::fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Network => "network",
            Self::InconsistentData => "inconsistent data",
            Self::Parse => "parse",
        })
    }
}

/// Cloneable record of the most recent failure for one cache key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct SyncError {
    pub kind: SyncErrorKind,
    pub message: String,
}

impl SyncError {
    pub fn new(kind: SyncErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&Error> for SyncError {
    fn from(err: &Error) -> Self {
        let kind = match err {
            Error::Domain(DomainError::InconsistentData { .. }) => SyncErrorKind::InconsistentData,
            Error::Domain(_) | Error::Json(_) | Error::Parse(_) => SyncErrorKind::Parse,
            Error::Http(e) if e.is_decode() => SyncErrorKind::Parse,
            Error::Config(_) | Error::Http(_) | Error::Io(_) | Error::Url(_) | Error::Network(_) => {
                SyncErrorKind::Network
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl From<Error> for SyncError {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

impl From<DomainError> for SyncError {
    fn from(err: DomainError) -> Self {
        Self::from(Error::Domain(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inconsistent_domain_error_maps_to_inconsistent_kind() {
        let err = DomainError::InconsistentData {
            market_id: "m".into(),
            reason: "total mismatch".into(),
        };
        assert_eq!(SyncError::from(err).kind, SyncErrorKind::InconsistentData);
    }

    #[test]
    fn network_error_maps_to_network_kind() {
        let err = SyncError::from(Error::Network("connection refused".into()));
        assert_eq!(err.kind, SyncErrorKind::Network);
        assert!(err.message.contains("connection refused"));
    }

    #[test]
    fn json_error_maps_to_parse_kind() {
        let json = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(SyncError::from(Error::Json(json)).kind, SyncErrorKind::Parse);
    }
}
