// ABOUTME: Integration tests for the marketplace token lifecycle
// ABOUTME: Exercises authorization, code exchange, refresh, and expiry against a mock server

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flipscan_auth::{AuthError, MarketplaceAuth, MarketplaceConfig};

const TOKEN_PATH: &str = "/identity/v1/oauth2/token";

fn manager_for(server: &MockServer) -> MarketplaceAuth {
    let mut config = MarketplaceConfig::new(
        "client-id".to_string(),
        "client-secret".to_string(),
        "http://localhost:4800",
    );
    config.token_url = format!("{}{}", server.uri(), TOKEN_PATH);
    config.api_base_url = server.uri();
    MarketplaceAuth::new(config).unwrap()
}

fn token_body(access: &str, refresh: Option<&str>, expires_in: i64) -> serde_json::Value {
    let mut body = json!({
        "access_token": access,
        "expires_in": expires_in,
        "token_type": "Bearer",
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    body
}

async fn mount_exchange(server: &MockServer, response: serde_json::Value, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_refresh(server: &MockServer, response: serde_json::Value, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_exchange_success_authenticates() {
    let server = MockServer::start().await;
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 7200), 1).await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();

    let response = manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();

    assert_eq!(response.access_token, "access-1");
    assert_eq!(response.refresh_token.as_deref(), Some("refresh-1"));
    assert!(manager.is_authenticated().await);
}

#[tokio::test]
async fn test_exchange_sends_verifier_and_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains("code_verifier="))
        .and(body_string_contains("redirect_uri="))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("access-1", None, 3600)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();

    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_exchange_consumes_state() {
    let server = MockServer::start().await;
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 7200), 1).await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();

    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();

    // The consumed state is not valid for a second exchange
    let second = manager.exchange_code("auth-code", &request.state).await;
    assert!(matches!(second, Err(AuthError::InvalidState)));
}

#[tokio::test]
async fn test_exchange_unknown_state_performs_no_http_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("x", None, 3600)))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager_for(&server);
    let result = manager.exchange_code("auth-code", "never-issued").await;

    assert!(matches!(result, Err(AuthError::InvalidState)));
}

#[tokio::test]
async fn test_exchange_failure_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();

    let result = manager.exchange_code("bad-code", &request.state).await;

    match result {
        Err(AuthError::TokenExchangeFailed { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "invalid_grant");
        }
        other => panic!("expected TokenExchangeFailed, got {other:?}"),
    }
    assert!(!manager.is_authenticated().await);
}

#[tokio::test]
async fn test_cached_token_returned_without_network_call() {
    let server = MockServer::start().await;
    // Exactly one call total: the exchange. No refresh may happen.
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 3600), 1).await;
    mount_refresh(&server, token_body("access-2", None, 3600), 0).await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();
    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();

    assert_eq!(manager.valid_access_token().await.unwrap(), "access-1");
    assert_eq!(manager.valid_access_token().await.unwrap(), "access-1");
}

#[tokio::test]
async fn test_expired_token_triggers_exactly_one_refresh() {
    let server = MockServer::start().await;
    // expires_in below the 60s safety margin leaves the token already stale
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 30), 1).await;
    mount_refresh(&server, token_body("access-2", None, 3600), 1).await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();
    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();

    assert!(!manager.is_authenticated().await);
    assert_eq!(manager.valid_access_token().await.unwrap(), "access-2");

    // Refreshed token is now cached; no second refresh
    assert_eq!(manager.valid_access_token().await.unwrap(), "access-2");
    assert!(manager.is_authenticated().await);
}

#[tokio::test]
async fn test_expired_token_without_refresh_token_fails() {
    let server = MockServer::start().await;
    mount_exchange(&server, token_body("access-1", None, 30), 1).await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();
    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();

    let result = manager.valid_access_token().await;
    assert!(matches!(result, Err(AuthError::NoValidToken)));
}

#[tokio::test]
async fn test_refresh_failure_requires_reauthorization() {
    let server = MockServer::start().await;
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 30), 1).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();
    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();

    let result = manager.valid_access_token().await;
    assert!(matches!(result, Err(AuthError::ReauthorizationRequired)));

    // The stale refresh token was dropped: later calls fail fast instead of
    // retrying the same invalid refresh token against the marketplace.
    let result = manager.valid_access_token().await;
    assert!(matches!(result, Err(AuthError::NoValidToken)));
}

#[tokio::test]
async fn test_refresh_without_any_tokens_fails() {
    let server = MockServer::start().await;
    let manager = manager_for(&server);

    let result = manager.refresh_access_token().await;
    assert!(matches!(result, Err(AuthError::NoRefreshToken)));

    let result = manager.valid_access_token().await;
    assert!(matches!(result, Err(AuthError::NoValidToken)));
}

#[tokio::test]
async fn test_refresh_token_kept_across_non_rotating_refresh() {
    let server = MockServer::start().await;
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 30), 1).await;
    // Both refreshes present the original token; responses never rotate it
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-2", None, 30)))
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();
    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();

    // Each refreshed token is itself already stale, so both calls refresh
    assert_eq!(manager.valid_access_token().await.unwrap(), "access-2");
    assert_eq!(manager.valid_access_token().await.unwrap(), "access-2");
}

#[tokio::test]
async fn test_refresh_token_rotation_adopted() {
    let server = MockServer::start().await;
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 30), 1).await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("access-2", Some("refresh-2"), 30)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("refresh_token=refresh-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("access-3", None, 3600)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();
    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();

    assert_eq!(manager.valid_access_token().await.unwrap(), "access-2");
    assert_eq!(manager.valid_access_token().await.unwrap(), "access-3");
}

#[tokio::test]
async fn test_clear_auth_resets_to_unauthenticated() {
    let server = MockServer::start().await;
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 3600), 1).await;

    let manager = manager_for(&server);
    let request = manager.begin_authorization().await.unwrap();
    manager
        .exchange_code("auth-code", &request.state)
        .await
        .unwrap();
    assert!(manager.is_authenticated().await);

    manager.clear_auth().await;

    assert!(!manager.is_authenticated().await);
    let result = manager.valid_access_token().await;
    assert!(matches!(result, Err(AuthError::NoValidToken)));
}

#[tokio::test]
async fn test_auth_status_round_trip() {
    let server = MockServer::start().await;
    mount_exchange(&server, token_body("access-1", Some("refresh-1"), 3600), 1).await;

    let manager = manager_for(&server);

    // Unauthenticated: status mints an authorization URL with a usable state
    let status = manager.auth_status().await.unwrap();
    assert!(!status.authenticated);
    let auth_url = status.auth_url.expect("auth url offered");
    let state = url::Url::parse(&auth_url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("state embedded in auth url");

    manager.exchange_code("auth-code", &state).await.unwrap();

    let status = manager.auth_status().await.unwrap();
    assert!(status.authenticated);
    assert!(status.auth_url.is_none());
}

#[tokio::test]
async fn test_purge_leaves_fresh_states_untouched() {
    let server = MockServer::start().await;
    let manager = manager_for(&server);

    manager.begin_authorization().await.unwrap();
    manager.begin_authorization().await.unwrap();
    manager.begin_authorization().await.unwrap();

    let removed = manager.purge_expired_states().await;

    assert_eq!(removed, 0);
    assert_eq!(manager.pending_authorizations().await, 3);
}
