//! Integration tests for the OAuth flow against a mock token endpoint.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadlink_common::auth::{OAuthClient, OAuthClientError, OAuthConfig, TokenStore};

fn config_for(server: &MockServer) -> OAuthConfig {
    OAuthConfig::new(
        server.uri(),
        "test_client_id".to_string(),
        "test_secret".to_string(),
        "http://localhost:8000/oauth/callback".to_string(),
        vec!["contacts.readonly".to_string(), "conversations.readonly".to_string()],
    )
}

fn token_body() -> serde_json::Value {
    json!({
        "access_token": "at_live_1",
        "refresh_token": "rt_live_1",
        "token_type": "Bearer",
        "expires_in": 86400,
        "scope": "contacts.readonly conversations.readonly",
        "userId": "user_42",
        "locationId": "loc_9"
    })
}

#[tokio::test]
async fn exchange_posts_code_and_verifier() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=test_client_id"))
        .and(body_string_contains("client_secret=test_secret"))
        .and(body_string_contains("code=auth_code_123"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::new(config_for(&server));
    let (_, state) = client.generate_authorization_url().await.unwrap();

    let response = client.exchange_code_for_tokens("auth_code_123", &state).await.unwrap();

    assert_eq!(response.access_token, "at_live_1");
    assert_eq!(response.refresh_token.as_deref(), Some("rt_live_1"));
    assert_eq!(response.user_id.as_deref(), Some("user_42"));
    assert_eq!(response.location_id.as_deref(), Some("loc_9"));
}

#[tokio::test]
async fn exchange_surfaces_token_endpoint_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::new(config_for(&server));
    let (_, state) = client.generate_authorization_url().await.unwrap();

    let result = client.exchange_code_for_tokens("bad_code", &state).await;

    match result {
        Err(OAuthClientError::TokenEndpoint { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("expected TokenEndpoint error, got {other:?}"),
    }
}

#[tokio::test]
async fn state_mismatch_never_reaches_the_network() {
    let server = MockServer::start().await;

    // Zero expected calls: a forged state must fail before any request
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = OAuthClient::new(config_for(&server));
    client.generate_authorization_url().await.unwrap();

    let result = client.exchange_code_for_tokens("auth_code_123", "forged_state").await;
    assert!(matches!(result, Err(OAuthClientError::StateMismatch { .. })));
}

#[tokio::test]
async fn challenge_is_single_use() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::new(config_for(&server));
    let (_, state) = client.generate_authorization_url().await.unwrap();

    client.exchange_code_for_tokens("auth_code_123", &state).await.unwrap();

    // Replaying the same callback finds no pending challenge
    let replay = client.exchange_code_for_tokens("auth_code_123", &state).await;
    assert!(matches!(replay, Err(OAuthClientError::VerifierMissing)));
}

#[tokio::test]
async fn refresh_posts_refresh_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=rt_old"))
        .and(body_string_contains("client_secret=test_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at_live_2",
            "expires_in": 86400
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::new(config_for(&server));
    let response = client.refresh_access_token("rt_old").await.unwrap();

    assert_eq!(response.access_token, "at_live_2");
    assert_eq!(response.token_type, "Bearer");
    assert!(response.refresh_token.is_none());
}

#[tokio::test]
async fn authorization_url_round_trips_through_a_parser() {
    let server = MockServer::start().await;
    let client = OAuthClient::new(config_for(&server));

    let (url, state) = client.generate_authorization_url().await.unwrap();
    let parsed = Url::parse(&url).unwrap();

    assert_eq!(parsed.path(), "/oauth/authorize");

    let params: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();
    assert_eq!(params.get("response_type").map(String::as_str), Some("code"));
    assert_eq!(params.get("client_id").map(String::as_str), Some("test_client_id"));
    assert_eq!(
        params.get("redirect_uri").map(String::as_str),
        Some("http://localhost:8000/oauth/callback")
    );
    assert_eq!(
        params.get("scope").map(String::as_str),
        Some("contacts.readonly conversations.readonly")
    );
    assert_eq!(params.get("state").map(String::as_str), Some(state.as_str()));
    assert_eq!(params.get("code_challenge_method").map(String::as_str), Some("S256"));
    assert!(params.get("code_challenge").is_some_and(|c| c.len() == 43));
}

#[tokio::test]
async fn store_completes_authorization_and_serves_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(OAuthClient::new(config_for(&server)));
    let store = TokenStore::new(client);

    let (_, state) = store.begin_authorization().await.unwrap();
    let credential = store.complete_authorization("auth_code_123", &state).await.unwrap();

    // Principal comes from the issuer's userId field
    assert_eq!(credential.principal_id, "user_42");
    assert_eq!(credential.location_id.as_deref(), Some("loc_9"));

    // A day of validity means no refresh on the way out
    let token = store.ensure_fresh("user_42").await.unwrap();
    assert_eq!(token, "at_live_1");
}
