//! The authentication entry point exposed to the HTTP boundary
//!
//! Composes the validator, directory, session store, and token issuer into
//! two strategies behind one login path, so credential validation and the
//! invalid-credentials check are written exactly once.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AuthConfig, SessionConfig};
use crate::identity::{Identity, UserDirectory};
use crate::password::{hasher_from_config, PasswordHasher};
use crate::session::{MemorySessionStore, SessionId, SessionStore};
use crate::token::TokenIssuer;
use crate::validate::{CredentialValidator, LoginPayload};
use crate::{AuthError, AuthResult};

const BEARER_PREFIX: &str = "Bearer ";

/// Which credential a login produces and a request presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Server-side session, transported as an opaque cookie value
    Session,
    /// Self-contained signed token, transported as a bearer header
    Bearer,
}

/// A strategy's credential lifecycle: issue on login, verify per request.
#[async_trait]
pub trait AuthScheme: Send + Sync {
    /// Produce the credential handed to the client.
    async fn issue(&self, identity: &Identity) -> AuthResult<String>;

    /// Resolve a presented credential back to an identity.
    async fn verify(&self, credential: &str) -> AuthResult<Identity>;

    fn name(&self) -> &'static str;
}

/// Cookie/session strategy: stateful, revocable by logout.
pub struct SessionScheme {
    store: Arc<dyn SessionStore>,
}

impl SessionScheme {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthScheme for SessionScheme {
    async fn issue(&self, identity: &Identity) -> AuthResult<String> {
        let id = self.store.create(identity.clone()).await?;
        Ok(id.to_string())
    }

    async fn verify(&self, credential: &str) -> AuthResult<Identity> {
        let id = SessionId::from_string(credential)?;
        self.store.get(&id).await
    }

    fn name(&self) -> &'static str {
        "session"
    }
}

/// Bearer-token strategy: stateless, valid until expiry.
pub struct BearerScheme {
    tokens: TokenIssuer,
}

impl BearerScheme {
    pub fn new(tokens: TokenIssuer) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl AuthScheme for BearerScheme {
    async fn issue(&self, identity: &Identity) -> AuthResult<String> {
        self.tokens.issue(identity)
    }

    async fn verify(&self, credential: &str) -> AuthResult<Identity> {
        self.tokens.verify(credential)
    }

    fn name(&self) -> &'static str {
        "bearer"
    }
}

/// Composed authentication gateway.
///
/// All collaborators are injected at construction; the gateway holds no
/// process-wide state and can be built per test with its own secret,
/// directory, and store.
pub struct AuthGateway<D: UserDirectory> {
    directory: D,
    validator: CredentialValidator,
    hasher: Box<dyn PasswordHasher>,
    sessions: Arc<dyn SessionStore>,
    session_scheme: SessionScheme,
    bearer_scheme: BearerScheme,
    session_config: SessionConfig,
}

impl<D: UserDirectory> AuthGateway<D> {
    /// Build a gateway with an in-memory session store derived from the
    /// configuration.
    pub fn new(config: AuthConfig, directory: D) -> AuthResult<Self> {
        let sessions: Arc<dyn SessionStore> =
            Arc::new(MemorySessionStore::from_config(&config.session));
        Self::with_session_store(config, directory, sessions)
    }

    /// Build a gateway around an externally supplied session store.
    pub fn with_session_store(
        config: AuthConfig,
        directory: D,
        sessions: Arc<dyn SessionStore>,
    ) -> AuthResult<Self> {
        config.validate().map_err(AuthError::config_error)?;

        let hasher = hasher_from_config(&config.password)?;
        let tokens = TokenIssuer::new(&config.jwt)?;

        Ok(Self {
            directory,
            validator: CredentialValidator::new(),
            hasher,
            session_scheme: SessionScheme::new(Arc::clone(&sessions)),
            bearer_scheme: BearerScheme::new(tokens),
            sessions,
            session_config: config.session,
        })
    }

    fn scheme(&self, strategy: Strategy) -> &dyn AuthScheme {
        match strategy {
            Strategy::Session => &self.session_scheme,
            Strategy::Bearer => &self.bearer_scheme,
        }
    }

    /// Authenticate a login payload and issue the strategy's credential:
    /// the session id for [`Strategy::Session`], the signed token for
    /// [`Strategy::Bearer`].
    ///
    /// The directory is only consulted after the payload passes shape
    /// validation. An unknown username and a wrong password produce the
    /// same [`AuthError::InvalidCredentials`], so the caller learns nothing
    /// about which usernames exist.
    pub async fn login(&self, strategy: Strategy, payload: &LoginPayload) -> AuthResult<String> {
        let credentials = self.validator.validate(payload)?;

        let record = self.directory.find_by_username(&credentials.username).await?;
        let verified = match &record {
            Some(record) => self
                .hasher
                .verify_password(&credentials.password, &record.password_hash)?,
            None => false,
        };
        let record = match record {
            Some(record) if verified => record,
            // One exit for both unknown user and wrong password
            _ => {
                tracing::warn!(scheme = self.scheme(strategy).name(), "login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let identity = Identity::from(&record);

        let scheme = self.scheme(strategy);
        let credential = scheme.issue(&identity).await?;
        tracing::debug!(
            username = %identity.username,
            scheme = scheme.name(),
            "login succeeded"
        );
        Ok(credential)
    }

    /// Resolve a presented credential for the given strategy.
    pub async fn authenticate(
        &self,
        strategy: Strategy,
        credential: &str,
    ) -> AuthResult<Identity> {
        self.scheme(strategy).verify(credential).await
    }

    /// Destroy a session. Idempotent; unknown and malformed identifiers
    /// are ignored.
    pub async fn logout(&self, session_id: &str) -> AuthResult<()> {
        match SessionId::from_string(session_id) {
            Ok(id) => self.sessions.destroy(&id).await,
            Err(_) => Ok(()),
        }
    }

    /// Extract a bearer token from an `Authorization` header value.
    ///
    /// A missing header (or a bare prefix with no token) is
    /// [`AuthError::MissingCredential`], which the boundary maps to 403; a
    /// present-but-unusable header is a malformed-token error, mapped to
    /// 401 like any other bad token.
    pub fn extract_bearer(&self, auth_header: Option<&str>) -> AuthResult<String> {
        let header = auth_header.ok_or(AuthError::MissingCredential)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthError::Token {
                kind: crate::TokenErrorKind::Malformed,
            })?
            .trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        Ok(token.to_string())
    }

    /// Extract the session id from a `Cookie` header value.
    pub fn extract_session_id(&self, cookie_header: Option<&str>) -> Option<String> {
        let prefix = format!("{}=", self.session_config.cookie_name);
        for cookie in cookie_header?.split(';') {
            if let Some(value) = cookie.trim().strip_prefix(&prefix) {
                return Some(value.to_string());
            }
        }
        None
    }

    /// Authenticate a request carrying an `Authorization` header.
    pub async fn authenticate_bearer(&self, auth_header: Option<&str>) -> AuthResult<Identity> {
        let token = self.extract_bearer(auth_header)?;
        self.authenticate(Strategy::Bearer, &token).await
    }

    /// Authenticate a request carrying a session cookie.
    pub async fn authenticate_cookie(&self, cookie_header: Option<&str>) -> AuthResult<Identity> {
        let session_id = self
            .extract_session_id(cookie_header)
            .ok_or(AuthError::Unauthenticated)?;
        self.authenticate(Strategy::Session, &session_id).await
    }

    /// `Set-Cookie` value for a freshly issued session id, honoring the
    /// configured cookie flags.
    pub fn session_cookie(&self, session_id: &str) -> String {
        let config = &self.session_config;
        let mut cookie = format!("{}={}", config.cookie_name, session_id);

        if let Some(domain) = &config.cookie_domain {
            cookie.push_str(&format!("; Domain={}", domain));
        }
        cookie.push_str(&format!("; Path={}", config.cookie_path));
        if config.cookie_http_only {
            cookie.push_str("; HttpOnly");
        }
        if config.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", config.cookie_same_site));
        if let Some(ttl) = config.ttl_seconds {
            cookie.push_str(&format!("; Max-Age={}", ttl));
        }

        cookie
    }

    /// `Set-Cookie` value that clears the session cookie on logout.
    pub fn logout_cookie(&self) -> String {
        let config = &self.session_config;
        let mut cookie = format!("{}=", config.cookie_name);
        cookie.push_str(&format!("; Path={}", config.cookie_path));
        if config.cookie_http_only {
            cookie.push_str("; HttpOnly");
        }
        if config.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", config.cookie_same_site));
        cookie.push_str("; Max-Age=0");
        cookie
    }

    /// The session store backing the session strategy.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// The injected user directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryUserDirectory;

    fn gateway() -> AuthGateway<MemoryUserDirectory> {
        let config = AuthConfig::development();
        let hasher = hasher_from_config(&config.password).unwrap();

        let directory = MemoryUserDirectory::new();
        directory.register(1, "john", "123456", hasher.as_ref()).unwrap();

        AuthGateway::new(config, directory).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_payload_is_a_validation_error() {
        let gateway = gateway();
        let result = gateway
            .login(Strategy::Session, &LoginPayload::new("jo", "123456"))
            .await;
        match result {
            Err(AuthError::Validation(errors)) => assert!(errors.has_field_errors("username")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let gateway = gateway();
        let unknown = gateway
            .login(Strategy::Session, &LoginPayload::new("jane", "123456"))
            .await
            .unwrap_err();
        let wrong_password = gateway
            .login(Strategy::Session, &LoginPayload::new("john", "654321"))
            .await
            .unwrap_err();

        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(unknown, wrong_password);
    }

    #[tokio::test]
    async fn test_session_login_round_trip() {
        let gateway = gateway();
        let session_id = gateway
            .login(Strategy::Session, &LoginPayload::new("john", "123456"))
            .await
            .unwrap();

        let identity = gateway
            .authenticate(Strategy::Session, &session_id)
            .await
            .unwrap();
        assert_eq!(identity.id, 1);
        assert_eq!(identity.username, "john");

        gateway.logout(&session_id).await.unwrap();
        assert_eq!(
            gateway.authenticate(Strategy::Session, &session_id).await,
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_logout_is_idempotent_for_unknown_and_malformed_ids() {
        let gateway = gateway();
        gateway.logout(&"a".repeat(32)).await.unwrap();
        gateway.logout("garbage").await.unwrap();
    }

    #[tokio::test]
    async fn test_bearer_login_round_trip() {
        let gateway = gateway();
        let token = gateway
            .login(Strategy::Bearer, &LoginPayload::new("john", "123456"))
            .await
            .unwrap();

        let header = format!("Bearer {}", token);
        let identity = gateway.authenticate_bearer(Some(&header)).await.unwrap();
        assert_eq!(identity.id, 1);
        assert_eq!(identity.username, "john");
    }

    #[tokio::test]
    async fn test_missing_bearer_header_is_distinguishable() {
        let gateway = gateway();

        let missing = gateway.authenticate_bearer(None).await.unwrap_err();
        assert_eq!(missing, AuthError::MissingCredential);
        assert_eq!(missing.status_code(), 403);

        let empty = gateway.authenticate_bearer(Some("Bearer ")).await.unwrap_err();
        assert_eq!(empty, AuthError::MissingCredential);

        let wrong_prefix = gateway.authenticate_bearer(Some("Basic abc")).await.unwrap_err();
        assert_eq!(wrong_prefix.status_code(), 401);
    }

    #[tokio::test]
    async fn test_cookie_extraction() {
        let gateway = gateway();
        let session_id = "a".repeat(32);

        let header = format!("theme=dark; session_id={}; lang=en", session_id);
        assert_eq!(
            gateway.extract_session_id(Some(&header)),
            Some(session_id.clone())
        );

        assert_eq!(gateway.extract_session_id(Some("theme=dark")), None);
        assert_eq!(gateway.extract_session_id(None), None);
    }

    #[tokio::test]
    async fn test_authenticate_cookie_end_to_end() {
        let gateway = gateway();
        let session_id = gateway
            .login(Strategy::Session, &LoginPayload::new("john", "123456"))
            .await
            .unwrap();

        let header = format!("session_id={}", session_id);
        let identity = gateway.authenticate_cookie(Some(&header)).await.unwrap();
        assert_eq!(identity.username, "john");

        assert_eq!(
            gateway.authenticate_cookie(None).await,
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_session_cookie_flags() {
        let hasher_config = AuthConfig::development();
        let hasher = hasher_from_config(&hasher_config.password).unwrap();

        let directory = MemoryUserDirectory::new();
        directory.register(1, "john", "123456", hasher.as_ref()).unwrap();

        let mut config = AuthConfig::production();
        config.password = hasher_config.password.clone();
        let gateway = AuthGateway::new(config, directory).unwrap();

        let cookie = gateway.session_cookie(&"a".repeat(32));
        assert!(cookie.starts_with(&format!("session_id={}", "a".repeat(32))));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));

        let cleared = gateway.logout_cookie();
        assert!(cleared.starts_with("session_id="));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_bad_config_fails_construction() {
        let mut config = AuthConfig::development();
        config.jwt.secret = "short".to_string();
        let result = AuthGateway::new(config, MemoryUserDirectory::new());
        assert!(matches!(result, Err(AuthError::Configuration { .. })));
    }
}
