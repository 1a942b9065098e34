//! CLI subprocess execution.
//!
//! The credential is injected via an env overlay and never touches the
//! proxy's own environment. Failures the proxy observes itself (binary
//! missing, deadline exceeded) are reported with `exit_code: -1` and the
//! reason in `stderr` so the calling client can surface them like any other
//! tool failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Captured outcome of one subprocess run. Also the `/cli` response
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Proxy-observed failure: `-1` with the reason in stderr.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    /// Command-level error: `1` with the message in stderr. Used by
    /// intercepted commands for argument and upstream errors.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            stdout: String::new(),
            stderr: message.into(),
        }
    }

    pub fn ok(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Run `binary` with `args`, the proxy environment plus `env_overlay`
/// (overlay wins), and a deadline of `timeout_secs`.
///
/// `stdin_data` is written to the child's standard input, which is then
/// closed. stdout/stderr are captured and decoded as UTF-8 with
/// replacement. On timeout the child is killed and reaped before
/// returning.
pub async fn execute_cli(
    binary: &str,
    args: &[String],
    env_overlay: &BTreeMap<String, String>,
    timeout_secs: u64,
    stdin_data: Option<&str>,
) -> CliResult {
    let mut cmd = Command::new(binary);
    cmd.args(args)
        .envs(env_overlay)
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return CliResult::failure(format!("Command not found: {binary}"));
        }
        Err(e) => {
            return CliResult::failure(format!("Failed to spawn {binary}: {e}"));
        }
    };

    let stdin_pipe = child.stdin.take();
    let mut stdout_pipe = child.stdout.take().expect("stdout is piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr is piped");

    let drive = async {
        let write_stdin = async {
            if let (Some(mut pipe), Some(data)) = (stdin_pipe, stdin_data) {
                // Dropping the pipe closes the child's stdin.
                pipe.write_all(data.as_bytes()).await?;
            }
            std::io::Result::Ok(())
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let read_stdout = stdout_pipe.read_to_end(&mut stdout);
        let read_stderr = stderr_pipe.read_to_end(&mut stderr);
        tokio::try_join!(write_stdin, read_stdout, read_stderr)?;
        let status = child.wait().await?;
        std::io::Result::Ok((status, stdout, stderr))
    };

    let outcome = tokio::time::timeout(Duration::from_secs(timeout_secs), drive).await;
    match outcome {
        Ok(Ok((status, stdout, stderr))) => CliResult {
            exit_code: status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        },
        Ok(Err(e)) => CliResult::failure(format!("Failed to run {binary}: {e}")),
        Err(_) => {
            let _ = child.kill().await;
            CliResult::failure(format!("Command timed out after {timeout_secs}s"))
        }
    }
}
