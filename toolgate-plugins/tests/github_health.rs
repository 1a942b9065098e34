//! PAT health probe tests against a REST fixture server.

use serde_json::json;
use std::sync::Arc;
use toolgate_plugin::{Plugin, PluginInstance};
use toolgate_plugins::github::GitHubPlugin;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn instance_with_tokens(server: &MockServer, tokens: &[&str]) -> Arc<dyn PluginInstance> {
    let credentials: Vec<_> = tokens
        .iter()
        .map(|token| json!({ "token": token, "resources": ["acme/*"] }))
        .collect();
    GitHubPlugin
        .build(&json!({ "api_url": server.uri(), "credentials": credentials }))
        .unwrap()
}

#[tokio::test]
async fn valid_token_reports_user_scopes_and_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", "Bearer good-token-123"))
        .and(header("Accept", "application/vnd.github+json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "login": "octocat" }))
                .insert_header("X-OAuth-Scopes", "repo, read:org")
                .insert_header("X-RateLimit-Remaining", "4999"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let instance = instance_with_tokens(&server, &["good-token-123"]);
    let statuses = instance.health_check(&reqwest::Client::new()).await;
    assert_eq!(statuses.len(), 1);

    let status = &statuses[0];
    assert_eq!(status["valid"], true);
    assert_eq!(status["user"], "octocat");
    assert_eq!(status["scopes"], "repo, read:org");
    assert_eq!(status["rate_limit_remaining"], "4999");
    assert_eq!(status["masked_token"], "good-tok***");
    assert_eq!(status["resources"], json!(["acme/*"]));
}

#[tokio::test]
async fn rejected_token_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;

    let instance = instance_with_tokens(&server, &["bad-token-4567"]);
    let statuses = instance.health_check(&reqwest::Client::new()).await;

    let status = &statuses[0];
    assert_eq!(status["valid"], false);
    assert_eq!(status["error"], "HTTP 401: Bad credentials");
    assert!(status.get("user").is_none());
}

#[tokio::test]
async fn one_record_per_credential_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", "Bearer good-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octocat" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", "Bearer bad-token-4567"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let instance = instance_with_tokens(&server, &["good-token-123", "bad-token-4567"]);
    let statuses = instance.health_check(&reqwest::Client::new()).await;
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0]["valid"], true);
    assert_eq!(statuses[1]["valid"], false);
    assert_eq!(statuses[1]["error"], "HTTP 403: forbidden");
}

#[tokio::test]
async fn unreachable_api_reports_error_without_failing() {
    // Point at a closed port; the probe reports the transport error.
    let instance = GitHubPlugin
        .build(&json!({
            "api_url": "http://127.0.0.1:1",
            "credentials": [ { "token": "some-token-123", "resources": ["*"] } ],
        }))
        .unwrap();
    let statuses = instance.health_check(&reqwest::Client::new()).await;
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0]["valid"], false);
    assert!(statuses[0]["error"].as_str().is_some());
}

#[tokio::test]
async fn no_credentials_yield_no_records() {
    let server = MockServer::start().await;
    let instance = instance_with_tokens(&server, &[]);
    assert!(instance.health_check(&reqwest::Client::new()).await.is_empty());
}
