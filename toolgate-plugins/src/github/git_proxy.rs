//! Git smart-HTTP reverse proxy.
//!
//! `GET|POST /git/{owner}/{repo}.git/{path}` forwards to the upstream with
//! HTTP Basic auth injected from the selected credential, so `git` clients
//! can push and fetch through the proxy without ever holding a token.
//!
//! Header forwarding is a deliberate allow-list in both directions; the
//! body passes through verbatim.

use super::GitHubInstance;
use super::token_of;
use axum::Router;
use axum::extract::{Path, RawQuery, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, Method, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;
use std::time::Duration;
use toolgate_plugin::PluginInstance;

const FORWARDED_HEADERS: &[HeaderName] = &[
    header::CONTENT_TYPE,
    header::ACCEPT,
    header::CONTENT_ENCODING,
];

const RESPONSE_HEADERS: &[HeaderName] = &[header::CONTENT_TYPE, header::CACHE_CONTROL];

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct GitProxyState {
    github: Arc<GitHubInstance>,
    http: reqwest::Client,
}

pub(crate) fn router(github: Arc<GitHubInstance>, http: reqwest::Client) -> Router {
    Router::new()
        .route("/git/{owner}/{repo}/{*rest}", get(handle_git).post(handle_git))
        .with_state(GitProxyState { github, http })
}

async fn handle_git(
    State(state): State<GitProxyState>,
    Path((owner, repo, rest)): Path<(String, String, String)>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // The route captures the literal "{repo}.git" segment.
    let Some(repo) = repo.strip_suffix(".git") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let resource = format!("{owner}/{repo}");

    let Some(credential) = state.github.select_credential(&resource) else {
        tracing::warn!(resource = %resource, "git proxy: no credential");
        return (
            StatusCode::FORBIDDEN,
            format!("No credential for git on {resource}"),
        )
            .into_response();
    };

    let mut url = format!(
        "{}/{owner}/{repo}.git/{rest}",
        state.github.config.git_url
    );
    if let Some(query) = query {
        url.push('?');
        url.push_str(&query);
    }

    let auth = BASE64.encode(format!("x-access-token:{}", token_of(&credential)));
    let mut request = state
        .http
        .request(method.clone(), &url)
        .header(header::AUTHORIZATION, format!("Basic {auth}"))
        .header(header::USER_AGENT, "git/2.40.0")
        .timeout(UPSTREAM_TIMEOUT);
    for name in FORWARDED_HEADERS {
        if let Some(value) = headers.get(name) {
            request = request.header(name, value);
        }
    }
    if method == Method::POST {
        request = request.body(body);
    }

    let upstream = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "git proxy: upstream request failed");
            return (StatusCode::BAD_GATEWAY, format!("Upstream request failed: {e}"))
                .into_response();
        }
    };

    let status = upstream.status();
    let mut response_headers = HeaderMap::new();
    for name in RESPONSE_HEADERS {
        if let Some(value) = upstream.headers().get(name) {
            response_headers.insert(name, value.clone());
        }
    }
    match upstream.bytes().await {
        Ok(bytes) => (status, response_headers, bytes).into_response(),
        Err(e) => (StatusCode::BAD_GATEWAY, format!("Upstream read failed: {e}")).into_response(),
    }
}
