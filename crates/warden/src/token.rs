//! Signed, time-bounded bearer tokens
//!
//! Tokens are stateless: no server-side record exists, and validity is
//! decided purely by signature and expiry. The embedded identity is a
//! snapshot from login time; it is not re-checked against the directory on
//! verification, so deleting a user does not recall tokens already issued.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::identity::Identity;
use crate::{AuthError, AuthResult};

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id of the authenticated identity
    pub sub: i64,
    /// Username of the authenticated identity
    pub username: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

/// Issues and verifies signed identity tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Duration,
    issuer: String,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> AuthResult<Self> {
        let algorithm = match config.algorithm.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(AuthError::config_error(format!(
                    "Unsupported signing algorithm: {}",
                    other
                )))
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&config.issuer]);
        // Expiry comparisons are exact; the default 60s leeway would keep
        // freshly expired tokens alive.
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_ref()),
            decoding_key: DecodingKey::from_secret(config.secret.as_ref()),
            header: Header::new(algorithm),
            validation,
            ttl: Duration::seconds(config.ttl_seconds as i64),
            issuer: config.issuer.clone(),
        })
    }

    /// Issue a token for an identity with the configured lifetime.
    pub fn issue(&self, identity: &Identity) -> AuthResult<String> {
        self.issue_with_ttl(identity, self.ttl)
    }

    /// Issue a token with an explicit lifetime.
    pub fn issue_with_ttl(&self, identity: &Identity, ttl: Duration) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.id,
            username: identity.username.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::crypto_error(e.to_string()))
    }

    /// Verify a token and return the identity embedded in it.
    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(Identity {
            id: data.claims.sub,
            username: data.claims.username,
        })
    }
}
