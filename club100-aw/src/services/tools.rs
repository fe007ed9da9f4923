//! External tool invocation
//!
//! Every external process (yt-dlp, ffmpeg, ffprobe, tts) goes through
//! [`ToolRunner`], which captures output, maps nonzero exits to errors, and
//! bounds each call with a hard timeout. A hung downloader must never wedge a
//! fan-out round forever.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// External tool errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool binary missing or not executable
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },

    /// Tool ran but exited nonzero
    #[error("{tool} failed ({status}): {stderr}")]
    Failed {
        tool: &'static str,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// Tool exceeded the configured timeout and was killed
    #[error("{tool} timed out after {timeout:?}")]
    Timeout {
        tool: &'static str,
        timeout: Duration,
    },

    /// Tool output could not be interpreted
    #[error("could not parse {tool} output: {detail}")]
    Parse {
        tool: &'static str,
        detail: String,
    },

    /// A stage produced no file, or an empty one
    #[error("expected output file missing or empty: {0}")]
    EmptyOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs external tools with captured output and a hard timeout
#[derive(Debug, Clone)]
pub struct ToolRunner {
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run to completion, returning captured stdout/stderr.
    ///
    /// Nonzero exit is an error carrying trimmed stderr. On timeout the
    /// process is killed (`kill_on_drop`) and a distinct error kind returned.
    pub async fn run(
        &self,
        tool: &'static str,
        cmd: &mut Command,
    ) -> Result<std::process::Output, ToolError> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, cmd.output()).await;
        match result {
            Err(_) => Err(ToolError::Timeout {
                tool,
                timeout: self.timeout,
            }),
            Ok(Err(source)) => Err(ToolError::Spawn { tool, source }),
            Ok(Ok(output)) if !output.status.success() => Err(ToolError::Failed {
                tool,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Ok(Ok(output)) => Ok(output),
        }
    }

    /// Run and parse trimmed stdout as UTF-8
    pub async fn run_stdout(
        &self,
        tool: &'static str,
        cmd: &mut Command,
    ) -> Result<String, ToolError> {
        let output = self.run(tool, cmd).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Check that a stage actually produced a non-empty file
pub fn ensure_output_file(path: &Path) -> Result<(), ToolError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(ToolError::EmptyOutput(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ToolRunner {
        ToolRunner::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let out = runner()
            .run_stdout("sh", Command::new("sh").arg("-c").arg("echo 123"))
            .await
            .unwrap();
        assert_eq!(out, "123");
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let err = runner()
            .run("sh", Command::new("sh").arg("-c").arg("echo boom >&2; exit 3"))
            .await
            .unwrap_err();
        match err {
            ToolError::Failed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let err = runner()
            .run("nope", &mut Command::new("club100-no-such-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[tokio::test]
    async fn hung_process_times_out() {
        let runner = ToolRunner::new(Duration::from_millis(100));
        let err = runner
            .run("sleep", Command::new("sleep").arg("10"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
    }

    #[test]
    fn empty_output_detection() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.mp3");
        assert!(ensure_output_file(&missing).is_err());

        let empty = tmp.path().join("empty.mp3");
        std::fs::write(&empty, b"").unwrap();
        assert!(ensure_output_file(&empty).is_err());

        let full = tmp.path().join("full.mp3");
        std::fs::write(&full, b"data").unwrap();
        assert!(ensure_output_file(&full).is_ok());
    }
}
