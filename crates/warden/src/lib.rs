//! # warden: identity-session subsystem
//!
//! Credential validation, session lifecycle, signed bearer tokens, and an
//! authentication gateway composing the cookie/session and bearer-token
//! strategies for an HTTP layer that lives outside this crate.

pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod password;
pub mod session;
pub mod token;
pub mod validate;

// Prelude-style re-exports for core functionality

// Error handling
pub use error::{AuthError, TokenErrorKind};

// Configuration
pub use config::{AuthConfig, JwtConfig, PasswordConfig, SessionConfig};

// Core types and seams
pub use gateway::{AuthGateway, AuthScheme, Strategy};
pub use identity::{Identity, MemoryUserDirectory, UserDirectory, UserRecord};
pub use session::{MemorySessionStore, SessionId, SessionStore};
pub use token::TokenIssuer;
pub use validate::{CredentialValidator, Credentials, LoginPayload, ValidationErrors};

/// Authentication result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Subsystem version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
