//! Error types for geolex.

use thiserror::Error;

/// Result type alias using geolex's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for geolex operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Thesaurus not found or not loaded
    #[error("Thesaurus not found: {0}")]
    ThesaurusNotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Remote catalog response could not be interpreted
    #[error("Catalog protocol error: {0}")]
    Protocol(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("concept urn:c:1".to_string());
        assert_eq!(err.to_string(), "Not found: concept urn:c:1");
    }

    #[test]
    fn test_error_display_thesaurus_not_found() {
        let err = Error::ThesaurusNotFound("urn:geolex:geo".to_string());
        assert_eq!(err.to_string(), "Thesaurus not found: urn:geolex:geo");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing schema name".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing schema name");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("bad schema identifier".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: bad schema identifier"
        );
    }

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("connection refused".to_string());
        assert_eq!(err.to_string(), "Request error: connection refused");
    }

    #[test]
    fn test_error_display_protocol() {
        let err = Error::Protocol("no SearchResults element".to_string());
        assert_eq!(
            err.to_string(),
            "Catalog protocol error: no SearchResults element"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::Internal("unexpected state".to_string());
        assert!(format!("{:?}", err).contains("Internal"));
    }
}
