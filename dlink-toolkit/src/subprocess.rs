//! Subprocess-backed toolkit adapter
//!
//! Each call starts a fresh process with piped stdio and a bounded
//! timeout. On timeout the process tree is terminated and the partial
//! output captured so far is surfaced with a distinguished error. The
//! child carries `kill_on_drop`, so cancelling the request future also
//! reaps the process.

use crate::{DigitalLinkParts, Toolkit, ToolkitError, ToolkitResult};
use async_trait::async_trait;
use dlink_core::model::Qualifier;
use serde::Deserialize;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Default bounded timeout for a single toolkit call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Toolkit adapter that spawns one process per call
#[derive(Debug, Clone)]
pub struct SubprocessToolkit {
    command: String,
    base_args: Vec<String>,
    timeout: Duration,
}

impl SubprocessToolkit {
    /// Create an adapter invoking `command` with the default timeout
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            base_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Arguments placed before the operation on every invocation
    pub fn with_base_args(mut self, args: Vec<String>) -> Self {
        self.base_args = args;
        self
    }

    /// Override the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one toolkit operation and collect its line-wise output.
    async fn run(&self, operation: &str, argument: &str) -> ToolkitResult<String> {
        let mut child = Command::new(&self.command)
            .args(&self.base_args)
            .arg(operation)
            .arg(argument)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolkitError::Process(format!("spawning {}: {e}", self.command)))?;

        let stdout_lines = Arc::new(Mutex::new(Vec::new()));
        let stderr_lines = Arc::new(Mutex::new(Vec::new()));

        let stdout_task = child
            .stdout
            .take()
            .map(|pipe| tokio::spawn(collect_lines(pipe, stdout_lines.clone())));
        let stderr_task = child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(collect_lines(pipe, stderr_lines.clone())));

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                return Err(ToolkitError::Process(format!(
                    "waiting for {}: {e}",
                    self.command
                )))
            }
            Err(_) => {
                tracing::warn!(
                    command = %self.command,
                    operation,
                    timeout = ?self.timeout,
                    "toolkit call timed out; killing process"
                );
                // Kill the process and reap the zombie. The readers are
                // aborted rather than awaited: a grandchild may still hold
                // the pipes open, and the captured lines already sit in the
                // shared buffers.
                let _ = child.start_kill();
                let _ = child.wait().await;
                abort_reader(stdout_task);
                abort_reader(stderr_task);
                let partial_output = drain(&stdout_lines);
                return Err(ToolkitError::Timeout {
                    elapsed: self.timeout,
                    partial_output,
                });
            }
        };

        join_reader(stdout_task).await;
        join_reader(stderr_task).await;
        let stdout = drain(&stdout_lines);
        let stderr = drain(&stderr_lines);

        if !status.success() && stdout.trim().is_empty() {
            return Err(ToolkitError::Process(format!(
                "{} exited with {status}: {stderr}",
                self.command
            )));
        }

        Ok(stdout)
    }

    async fn run_parsed(&self, operation: &str, argument: &str) -> ToolkitResult<ToolResponse> {
        let stdout = self.run(operation, argument).await?;
        parse_response(&stdout)
    }
}

async fn collect_lines<R: AsyncRead + Unpin>(pipe: R, sink: Arc<Mutex<Vec<String>>>) {
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        sink.lock().expect("line sink poisoned").push(line);
    }
}

async fn join_reader(task: Option<tokio::task::JoinHandle<()>>) {
    if let Some(task) = task {
        let _ = task.await;
    }
}

fn abort_reader(task: Option<tokio::task::JoinHandle<()>>) {
    if let Some(task) = task {
        task.abort();
    }
}

fn drain(lines: &Arc<Mutex<Vec<String>>>) -> String {
    lines.lock().expect("line sink poisoned").join("\n")
}

/// Wire shape of one toolkit invocation's stdout JSON
#[derive(Debug, Deserialize)]
struct ToolResponse {
    #[serde(rename = "SUCCESS")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    identifiers: Vec<Qualifier>,
    #[serde(default)]
    qualifiers: Vec<Qualifier>,
    #[serde(default, rename = "dataAttributes")]
    data_attributes: Vec<Qualifier>,
    #[serde(default)]
    other: Vec<String>,
    #[serde(default, rename = "compressedPath")]
    compressed_path: Option<String>,
}

fn parse_response(stdout: &str) -> ToolkitResult<ToolResponse> {
    serde_json::from_str(stdout.trim())
        .map_err(|e| ToolkitError::Parse(format!("{e}; output: {}", stdout.trim())))
}

impl ToolResponse {
    fn into_parts(self) -> ToolkitResult<DigitalLinkParts> {
        if !self.success {
            return Err(ToolkitError::Tool(
                self.error.unwrap_or_else(|| "toolkit reported failure".to_string()),
            ));
        }
        Ok(DigitalLinkParts {
            identifiers: self.identifiers,
            qualifiers: self.qualifiers,
            data_attributes: self.data_attributes,
            other: self.other,
        })
    }
}

#[async_trait]
impl Toolkit for SubprocessToolkit {
    async fn test_syntax(&self, path: &str) -> ToolkitResult<bool> {
        let response = self.run_parsed("testsyntax", path).await?;
        Ok(response.success && !response.identifiers.is_empty())
    }

    async fn compress(&self, link: &str) -> ToolkitResult<String> {
        let response = self.run_parsed("compress", link).await?;
        if !response.success {
            return Err(ToolkitError::Tool(
                response
                    .error
                    .unwrap_or_else(|| "compression failed".to_string()),
            ));
        }
        response
            .compressed_path
            .ok_or_else(|| ToolkitError::Parse("compress output had no compressedPath".to_string()))
    }

    async fn uncompress(&self, compressed_path: &str) -> ToolkitResult<DigitalLinkParts> {
        self.run_parsed("uncompress", compressed_path)
            .await?
            .into_parts()
    }

    async fn analyze(&self, link: &str) -> ToolkitResult<DigitalLinkParts> {
        self.run_parsed("analyze", link).await?.into_parts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_success_response() {
        let response = parse_response(
            r#"{"SUCCESS": true, "identifiers": [{"01": "09506000134376"}], "qualifiers": [{"10": "LOT01"}]}"#,
        )
        .unwrap();
        assert!(response.success);
        let parts = response.into_parts().unwrap();
        assert_eq!(parts.identifiers, vec![Qualifier::new("01", "09506000134376")]);
        assert_eq!(parts.qualifiers, vec![Qualifier::new("10", "LOT01")]);
    }

    #[test]
    fn parse_failure_response_surfaces_tool_error() {
        let response =
            parse_response(r#"{"SUCCESS": false, "error": "no valid identifier"}"#).unwrap();
        let err = response.into_parts().unwrap_err();
        assert!(matches!(err, ToolkitError::Tool(msg) if msg == "no valid identifier"));
    }

    #[test]
    fn parse_garbage_is_a_parse_error() {
        assert!(matches!(
            parse_response("definitely not json"),
            Err(ToolkitError::Parse(_))
        ));
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        /// Build an adapter whose "toolkit" is a shell one-liner; the
        /// operation and argument land in `$0`/`$1` and are ignored.
        fn shell_toolkit(script: &str) -> SubprocessToolkit {
            SubprocessToolkit::new("sh")
                .with_base_args(vec!["-c".to_string(), script.to_string()])
        }

        #[tokio::test]
        async fn syntax_check_parses_stdout_json() {
            let toolkit = shell_toolkit(
                r#"printf '{"SUCCESS": true, "identifiers": [{"01": "09506000134376"}]}\n'"#,
            );
            assert!(toolkit.test_syntax("/01/09506000134376").await.unwrap());
        }

        #[tokio::test]
        async fn syntax_check_false_without_identifiers() {
            let toolkit = shell_toolkit(r#"printf '{"SUCCESS": true, "identifiers": []}\n'"#);
            assert!(!toolkit.test_syntax("/xx/1").await.unwrap());
        }

        #[tokio::test]
        async fn timeout_kills_and_reports_partial_output() {
            let toolkit = shell_toolkit(r#"printf 'partial line\n'; exec sleep 30"#)
                .with_timeout(Duration::from_millis(200));
            let err = toolkit.test_syntax("/01/1").await.unwrap_err();
            match err {
                ToolkitError::Timeout { partial_output, .. } => {
                    assert_eq!(partial_output, "partial line");
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn missing_binary_is_a_process_error() {
            let toolkit = SubprocessToolkit::new("/nonexistent/dlink-toolkit-cli");
            assert!(matches!(
                toolkit.test_syntax("/01/1").await,
                Err(ToolkitError::Process(_))
            ));
        }
    }
}
