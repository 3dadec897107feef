//! Authentication configuration types
//!
//! All collaborator settings are injected here at gateway construction;
//! there are no process-wide secrets or user lists.

use serde::{Deserialize, Serialize};

/// Main authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Token issuance configuration
    pub jwt: JwtConfig,

    /// Session store and cookie configuration
    pub session: SessionConfig,

    /// Password hashing configuration
    pub password: PasswordConfig,
}

/// Token issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for HMAC signing. Opaque, externally supplied; never
    /// logged or persisted by this crate.
    pub secret: String,

    /// Signing algorithm (HS256, HS384, HS512)
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,

    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub ttl_seconds: u64,

    /// Token issuer claim
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
}

/// Session store and cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime in seconds; `None` means sessions live
    /// until destroyed
    #[serde(default)]
    pub ttl_seconds: Option<u64>,

    /// Session cookie name
    #[serde(default = "default_session_cookie_name")]
    pub cookie_name: String,

    /// Session cookie domain
    pub cookie_domain: Option<String>,

    /// Session cookie path
    #[serde(default = "default_session_cookie_path")]
    pub cookie_path: String,

    /// Session cookie secure flag
    #[serde(default = "default_false")]
    pub cookie_secure: bool,

    /// Session cookie HTTP-only flag
    #[serde(default = "default_true")]
    pub cookie_http_only: bool,

    /// Session cookie SameSite policy
    #[serde(default = "default_session_cookie_same_site")]
    pub cookie_same_site: String,
}

/// Password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Password hashing algorithm (argon2, bcrypt)
    #[serde(default = "default_hash_algorithm")]
    pub algorithm: String,

    /// Bcrypt cost factor (if using bcrypt)
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Argon2 memory cost in KB (if using argon2)
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory: u32,

    /// Argon2 time cost (iterations)
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism factor
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// Default value functions
fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}
fn default_token_ttl() -> u64 {
    60 * 60
} // 1 hour
fn default_jwt_issuer() -> String {
    "warden".to_string()
}
fn default_session_cookie_name() -> String {
    "session_id".to_string()
}
fn default_session_cookie_path() -> String {
    "/".to_string()
}
fn default_session_cookie_same_site() -> String {
    "Lax".to_string()
}
fn default_hash_algorithm() -> String {
    "argon2".to_string()
}
fn default_bcrypt_cost() -> u32 {
    12
}
fn default_argon2_memory() -> u32 {
    65536
} // 64MB
fn default_argon2_iterations() -> u32 {
    3
}
fn default_argon2_parallelism() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "default-secret-key-change-in-production-32-chars-long".to_string(),
            algorithm: default_jwt_algorithm(),
            ttl_seconds: default_token_ttl(),
            issuer: default_jwt_issuer(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: None,
            cookie_name: default_session_cookie_name(),
            cookie_domain: None,
            cookie_path: default_session_cookie_path(),
            cookie_secure: default_false(),
            cookie_http_only: default_true(),
            cookie_same_site: default_session_cookie_same_site(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            algorithm: default_hash_algorithm(),
            bcrypt_cost: default_bcrypt_cost(),
            argon2_memory: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl AuthConfig {
    /// Create a development configuration with relaxed settings
    pub fn development() -> Self {
        let mut config = Self::default();
        config.session.cookie_secure = false;
        config.password.argon2_memory = 4096;
        config.password.argon2_iterations = 2;
        config.password.argon2_parallelism = 2;
        config
    }

    /// Create a production configuration with strict security
    pub fn production() -> Self {
        let mut config = Self::default();
        config.session.cookie_secure = true;
        config.session.cookie_same_site = "Strict".to_string();
        config.session.ttl_seconds = Some(24 * 60 * 60);
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters".to_string());
        }

        if !["HS256", "HS384", "HS512"].contains(&self.jwt.algorithm.as_str()) {
            return Err("Invalid JWT algorithm".to_string());
        }

        if self.jwt.ttl_seconds == 0 {
            return Err("Token TTL must be positive".to_string());
        }

        if self.session.ttl_seconds == Some(0) {
            return Err("Session TTL must be positive when set".to_string());
        }

        if !["Strict", "Lax", "None"].contains(&self.session.cookie_same_site.as_str()) {
            return Err("Invalid session cookie SameSite policy".to_string());
        }

        if !["argon2", "bcrypt"].contains(&self.password.algorithm.as_str()) {
            return Err("Invalid password hashing algorithm".to_string());
        }

        Ok(())
    }
}
