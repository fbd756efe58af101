//! Error types for FreeIPA operations.
//!
//! Every transport (LDAP and JSON-RPC) reports failures through the single [`Error`] enum so
//! callers can match on the failure class regardless of which path produced it.

use thiserror::Error;

/// FreeIPA error code reported when the requested entry does not exist.
pub const IPA_NOT_FOUND_CODE: i64 = 4001;

/// Main error type for FreeIPA operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bad credentials, rejected login or expired session
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// LDAP search or transport failure
    #[error("Search failed: {0}")]
    Search(String),

    /// A field in a server response had an unexpected shape
    #[error("Failed to decode field `{field}`: {message}")]
    Decoding {
        /// Attribute name of the offending field
        field: String,
        /// Decoder error message
        message: String,
    },

    /// More than one entry matched an identifier expected to be unique
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server returned a JSON-RPC error object
    #[error("RPC error {code} ({name}): {message}")]
    Rpc {
        /// FreeIPA error code
        code: i64,
        /// FreeIPA error class name (e.g. `DuplicateEntry`)
        name: String,
        /// Human-readable message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Server could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Invalid endpoint URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Malformed distinguished name
    #[error("Invalid distinguished name: {0}")]
    InvalidDn(String),
}

/// Specialized result type for FreeIPA operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds a decoding error for the given attribute.
    #[must_use]
    pub fn decoding(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decoding {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(_) => "AUTH_ERROR",
            Self::Search(_) => "SEARCH_ERROR",
            Self::Decoding { .. } => "DECODING_ERROR",
            Self::Integrity(_) => "INTEGRITY_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Rpc { .. } => "RPC_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Http(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidDn(_) => "INVALID_DN",
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Search(_) | Self::Integrity(_) | Self::ServiceUnavailable(_)
        )
    }

    /// Returns true if the caller has to authenticate again before retrying.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::decoding("<response>", err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(err.to_string())
    }
}
