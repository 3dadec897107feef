//! Authentication error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate::ValidationErrors;

/// Why a presented token was rejected.
///
/// Collapsed to a single 401 at the HTTP boundary; the kind is kept for
/// internal observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenErrorKind {
    /// The token could not be decoded or parsed at all
    Malformed,
    /// The signature does not match the signing key
    InvalidSignature,
    /// The token was well-formed and signed, but its expiry has passed
    Expired,
}

impl TokenErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenErrorKind::Malformed => "malformed",
            TokenErrorKind::InvalidSignature => "invalid_signature",
            TokenErrorKind::Expired => "expired",
        }
    }
}

/// Authentication errors
///
/// Every variant is per-request; none is fatal to the process.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    /// Malformed login payload; recoverable by resubmitting
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Unknown user or wrong password, deliberately undifferentiated
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, destroyed, or expired session
    #[error("Not authenticated")]
    Unauthenticated,

    /// Rejected bearer token
    #[error("Token error: {}", .kind.as_str())]
    Token { kind: TokenErrorKind },

    /// No credential was presented where one is required
    #[error("Credential required")]
    MissingCredential,

    /// Configuration errors surfaced at construction time
    #[error("Authentication configuration error: {message}")]
    Configuration { message: String },

    /// Hashing or signing faults
    #[error("Cryptographic error: {message}")]
    Crypto { message: String },

    /// Generic authentication error
    #[error("Authentication error: {message}")]
    Generic { message: String },
}

impl AuthError {
    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_FAILED",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::Token { .. } => "TOKEN_ERROR",
            AuthError::MissingCredential => "CREDENTIAL_REQUIRED",
            AuthError::Configuration { .. } => "CONFIGURATION_ERROR",
            AuthError::Crypto { .. } => "CRYPTOGRAPHIC_ERROR",
            AuthError::Generic { .. } => "AUTHENTICATION_ERROR",
        }
    }

    /// Get the HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 400,
            AuthError::InvalidCredentials => 401,
            AuthError::Unauthenticated => 401,
            AuthError::Token { .. } => 401, // kind retained internally only
            AuthError::MissingCredential => 403,
            AuthError::Configuration { .. } => 500,
            AuthError::Crypto { .. } => 500,
            AuthError::Generic { .. } => 500,
        }
    }

    /// Create a token error of the given kind
    pub fn token_error(kind: TokenErrorKind) -> Self {
        Self::Token { kind }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a cryptographic error
    pub fn crypto_error(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn generic_error(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        let kind = match err.kind() {
            ErrorKind::ExpiredSignature => TokenErrorKind::Expired,
            ErrorKind::InvalidSignature => TokenErrorKind::InvalidSignature,
            _ => TokenErrorKind::Malformed,
        };
        Self::Token { kind }
    }
}

#[cfg(feature = "bcrypt")]
impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::crypto_error(err.to_string())
    }
}
