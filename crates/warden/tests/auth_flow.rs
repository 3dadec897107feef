//! End-to-end authentication flows across both strategies.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use warden::password::hasher_from_config;
use warden::{
    AuthConfig, AuthError, AuthGateway, AuthResult, LoginPayload, MemoryUserDirectory, Strategy,
    UserDirectory, UserRecord,
};

/// Directory double that counts lookups, to observe whether the gateway
/// consulted it at all.
struct CountingDirectory {
    inner: MemoryUserDirectory,
    lookups: AtomicUsize,
}

impl CountingDirectory {
    fn seeded() -> Self {
        let config = AuthConfig::development();
        let hasher = hasher_from_config(&config.password).unwrap();
        let inner = MemoryUserDirectory::new();
        inner.register(1, "john", "123456", hasher.as_ref()).unwrap();
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl UserDirectory for CountingDirectory {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_username(username).await
    }
}

fn gateway() -> AuthGateway<CountingDirectory> {
    AuthGateway::new(AuthConfig::development(), CountingDirectory::seeded()).unwrap()
}

#[tokio::test]
async fn session_strategy_end_to_end() {
    let gateway = gateway();

    let session_id = gateway
        .login(Strategy::Session, &LoginPayload::new("john", "123456"))
        .await
        .unwrap();

    // The HTTP layer sets the cookie from this string and reads it back on
    // the next request.
    let set_cookie = gateway.session_cookie(&session_id);
    assert!(set_cookie.starts_with(&format!("session_id={}", session_id)));

    let cookie_header = format!("session_id={}", session_id);
    let identity = gateway
        .authenticate_cookie(Some(&cookie_header))
        .await
        .unwrap();

    let profile = serde_json::json!({ "profile": identity });
    assert_eq!(
        profile,
        serde_json::json!({ "profile": { "id": 1, "username": "john" } })
    );

    // Logout invalidates the session; a replayed cookie no longer works.
    gateway.logout(&session_id).await.unwrap();
    assert_eq!(
        gateway.authenticate_cookie(Some(&cookie_header)).await,
        Err(AuthError::Unauthenticated)
    );
}

#[tokio::test]
async fn bearer_strategy_end_to_end() {
    let gateway = gateway();

    let token = gateway
        .login(Strategy::Bearer, &LoginPayload::new("john", "123456"))
        .await
        .unwrap();

    let header = format!("Bearer {}", token);
    let identity = gateway.authenticate_bearer(Some(&header)).await.unwrap();

    let profile = serde_json::json!({ "profile": identity });
    assert_eq!(
        profile,
        serde_json::json!({ "profile": { "id": 1, "username": "john" } })
    );
}

#[tokio::test]
async fn both_strategies_agree_on_the_identity() {
    let gateway = gateway();
    let payload = LoginPayload::new("john", "123456");

    let session_id = gateway.login(Strategy::Session, &payload).await.unwrap();
    let token = gateway.login(Strategy::Bearer, &payload).await.unwrap();

    let via_session = gateway
        .authenticate(Strategy::Session, &session_id)
        .await
        .unwrap();
    let via_bearer = gateway.authenticate(Strategy::Bearer, &token).await.unwrap();

    assert_eq!(via_session, via_bearer);
}

#[tokio::test]
async fn rejected_payloads_never_reach_the_directory() {
    let gateway = gateway();

    let cases = [
        LoginPayload::new("jo", "123456"),   // username too short
        LoginPayload::new("john", "123"),    // password too short
        LoginPayload::new("jo hn", "123456"), // non-alphanumeric
        LoginPayload::default(),             // both fields missing
    ];
    for payload in &cases {
        for strategy in [Strategy::Session, Strategy::Bearer] {
            let err = gateway.login(strategy, payload).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{err:?}");
            assert_eq!(err.status_code(), 400);
        }
    }

    assert_eq!(gateway.directory().lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tokens_do_not_cross_gateways_with_different_secrets() {
    let gateway = gateway();
    let token = gateway
        .login(Strategy::Bearer, &LoginPayload::new("john", "123456"))
        .await
        .unwrap();

    let mut other_config = AuthConfig::development();
    other_config.jwt.secret = "an-entirely-different-signing-secret-value".to_string();
    let other = AuthGateway::new(other_config, CountingDirectory::seeded()).unwrap();

    let header = format!("Bearer {}", token);
    let err = other.authenticate_bearer(Some(&header)).await.unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn sessions_are_not_shared_between_stores() {
    let gateway = gateway();
    let session_id = gateway
        .login(Strategy::Session, &LoginPayload::new("john", "123456"))
        .await
        .unwrap();

    let other = AuthGateway::new(AuthConfig::development(), CountingDirectory::seeded()).unwrap();
    assert_eq!(
        other.authenticate(Strategy::Session, &session_id).await,
        Err(AuthError::Unauthenticated)
    );
}
