//! The central `/cli` handler.
//!
//! Pipeline: decode → validate → plugin lookup → policy → credential →
//! intercepted-command table → subprocess fallthrough. Every terminal state
//! emits one audit line through the masking logger before the response is
//! written.

use crate::server::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use toolgate_core::executor::execute_cli;
use toolgate_core::{CliResult, GateError, policy};
use toolgate_plugin::CommandOutcome;
use tracing::{info, warn};

/// Request envelope for `/cli`.
#[derive(Debug, Deserialize)]
pub struct CliRequest {
    #[serde(default)]
    pub tool: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub resource: String,

    /// Forwarded to the child's stdin whenever present.
    #[serde(default)]
    pub stdin_data: Option<String>,
}

pub async fn handle_cli(State(state): State<AppState>, body: Bytes) -> Response {
    let request: CliRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let err = GateError::InvalidRequest(e.to_string());
            warn!(tool = "", resource = "", cmd = "", rejected = 400, reason = %err, "cli");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };
    let cmd = request.args.first().cloned().unwrap_or_default();

    match dispatch(&state, &request, &cmd).await {
        Ok(result) => {
            info!(
                tool = %request.tool,
                resource = %request.resource,
                cmd = %cmd,
                exit_code = result.exit_code,
                "cli"
            );
            Json(result).into_response()
        }
        Err(err) => {
            let status = err.status_code();
            warn!(
                tool = %request.tool,
                resource = %request.resource,
                cmd = %cmd,
                rejected = status,
                reason = %err,
                "cli"
            );
            (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                err.to_string(),
            )
                .into_response()
        }
    }
}

async fn dispatch(
    state: &AppState,
    request: &CliRequest,
    cmd: &str,
) -> Result<CliResult, GateError> {
    if request.tool.is_empty() {
        return Err(GateError::MissingField("tool"));
    }
    if request.resource.is_empty() {
        return Err(GateError::MissingField("resource"));
    }

    let plugin = state
        .plugins
        .values()
        .find(|plugin| plugin.tools().contains(&request.tool.as_str()))
        .ok_or_else(|| GateError::UnknownTool(request.tool.clone()))?;

    if !policy::evaluate(&request.tool, cmd, &request.resource, &state.config).await {
        return Err(GateError::PolicyDenied);
    }

    let credential =
        plugin
            .select_credential(&request.resource)
            .ok_or_else(|| GateError::NoCredential {
                tool: request.tool.clone(),
                resource: request.resource.clone(),
            })?;

    if !cmd.is_empty() && plugin.commands().contains(&cmd) {
        let outcome = plugin
            .execute_command(
                cmd,
                &request.args[1..],
                &request.resource,
                &credential,
                &state.http,
            )
            .await;
        if let CommandOutcome::Handled(result) = outcome {
            return Ok(result);
        }
        // Fallthrough: run the wrapped CLI as if no interception existed.
    }

    Ok(execute_cli(
        &request.tool,
        &request.args,
        &credential.env,
        state.config.timeouts.cli,
        request.stdin_data.as_deref(),
    )
    .await)
}
