//! Integration tests for the untyped request path of the API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadlink_infra::api::{ApiError, CrmApiClient, CrmApiClientConfig, StaticTokenProvider};

fn client_for(server: &MockServer) -> CrmApiClient {
    let config = CrmApiClientConfig { base_url: server.uri(), timeout: Duration::from_secs(5) };
    let auth = Arc::new(StaticTokenProvider::new("test-token".to_string()));
    CrmApiClient::new(config, auth).unwrap()
}

#[tokio::test]
async fn request_carries_auth_and_version_headers() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/contacts/c_1"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Version", "2021-07-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"succeeded": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let value = client.request("alice", Method::DELETE, "/contacts/c_1", None).await.unwrap();

    assert_eq!(value["succeeded"], true);
}

#[tokio::test]
async fn request_sends_the_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/contacts/c_1"))
        .and(body_partial_json(json!({"firstName": "Ada"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contact": {"id": "c_1", "firstName": "Ada"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = json!({"firstName": "Ada"});
    let value =
        client.request("alice", Method::PUT, "/contacts/c_1", Some(&body)).await.unwrap();

    assert_eq!(value["contact"]["id"], "c_1");
}

#[tokio::test]
async fn request_maps_upstream_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.request("alice", Method::GET, "/missing", None).await.unwrap_err();

    match err {
        ApiError::Upstream { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not here");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
