// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Analyzer child-process runner.
//!
//! Spawns the external analyzer against a local file, streams stdout
//! line-by-line through a caller-supplied callback, retains stderr for
//! diagnostics, and enforces cancellation and a hard timeout. The analyzer
//! emits bounded report text (not the whole log), so stdout is captured in
//! memory.

use loupe_core::job::AnalyzerFlags;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

/// How long a terminated child gets to exit before SIGKILL.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// How much trailing stderr a failure error carries.
const STDERR_TAIL: usize = 512;

/// Errors from one analyzer run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("analyzer spawn failed: {0}")]
    Spawn(String),

    #[error("analyzer cancelled")]
    Cancelled,

    #[error("analyzer timed out after {0:?}")]
    Timeout(Duration),

    #[error("analyzer exited with code {exit_code}: {stderr_tail}")]
    Failed { exit_code: i32, stderr_tail: String },

    #[error("analyzer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One invocation of the analyzer.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Local path of the downloaded log file.
    pub file_path: PathBuf,
    pub flags: AnalyzerFlags,
    /// Heap hint in MiB, forwarded as `--heap-mb`.
    pub heap_mb: Option<u32>,
    /// Per-run override of the runner's timeout.
    pub timeout: Option<Duration>,
}

/// Captured result of a successful run.
#[derive(Debug)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub exit_code: i32,
}

/// Spawns and supervises the external analyzer binary.
#[derive(Debug, Clone)]
pub struct AnalyzerRunner {
    binary: PathBuf,
    default_heap_mb: u32,
    default_timeout: Duration,
}

impl AnalyzerRunner {
    pub fn new(binary: impl Into<PathBuf>, default_heap_mb: u32, default_timeout: Duration) -> Self {
        Self { binary: binary.into(), default_heap_mb, default_timeout }
    }

    fn build_command(&self, request: &RunRequest) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(&request.file_path);
        cmd.arg("--heap-mb").arg(request.heap_mb.unwrap_or(self.default_heap_mb).to_string());
        let flags = &request.flags;
        if flags.api {
            cmd.arg("--api");
        }
        if flags.sql {
            cmd.arg("--sql");
        }
        if flags.filters {
            cmd.arg("--filters");
        }
        if flags.escalations {
            cmd.arg("--escalations");
        }
        if flags.threads {
            cmd.arg("--threads");
        }
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run the analyzer to completion.
    ///
    /// `on_line` is invoked monotonically for every stdout line with a
    /// 1-based counter; it must return promptly, since the caller's side of
    /// the progress path is non-blocking.
    pub async fn run(
        &self,
        token: &CancellationToken,
        request: &RunRequest,
        mut on_line: impl FnMut(u64, &str),
    ) -> Result<RunOutput, RunnerError> {
        let started = Instant::now();
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let deadline = tokio::time::Instant::now() + timeout;

        let mut child = self
            .build_command(request)
            .spawn()
            .map_err(|e| RunnerError::Spawn(format!("{}: {e}", self.binary.display())))?;

        // Stderr drains on its own task so a chatty child never deadlocks
        // the stdout pipe.
        let stderr_task = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf).await;
                buf
            })
        });

        let stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::Spawn("analyzer stdout not piped".to_string()))?;
        let mut lines = BufReader::new(stdout_pipe).lines();

        let mut stdout = String::new();
        let mut line_count: u64 = 0;

        loop {
            tokio::select! {
                next = lines.next_line() => {
                    match next? {
                        Some(line) => {
                            line_count += 1;
                            on_line(line_count, &line);
                            stdout.push_str(&line);
                            stdout.push('\n');
                        }
                        None => break,
                    }
                }
                () = token.cancelled() => {
                    terminate(&mut child, &self.binary).await;
                    return Err(RunnerError::Cancelled);
                }
                () = tokio::time::sleep_until(deadline) => {
                    terminate(&mut child, &self.binary).await;
                    return Err(RunnerError::Timeout(timeout));
                }
            }
        }

        let status = tokio::select! {
            status = child.wait() => status?,
            () = token.cancelled() => {
                terminate(&mut child, &self.binary).await;
                return Err(RunnerError::Cancelled);
            }
            () = tokio::time::sleep_until(deadline) => {
                terminate(&mut child, &self.binary).await;
                return Err(RunnerError::Timeout(timeout));
            }
        };

        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        let exit_code = status.code().unwrap_or(-1);
        let duration = started.elapsed();

        if !status.success() {
            return Err(RunnerError::Failed {
                exit_code,
                stderr_tail: tail(&stderr, STDERR_TAIL),
            });
        }

        if !stderr.is_empty() {
            tracing::warn!(
                binary = %self.binary.display(),
                stderr = %tail(&stderr, STDERR_TAIL),
                "analyzer wrote to stderr but exited cleanly"
            );
        }

        tracing::debug!(
            binary = %self.binary.display(),
            lines = line_count,
            ?duration,
            "analyzer finished"
        );

        Ok(RunOutput { stdout, stderr, duration, exit_code })
    }
}

/// Terminate a child: SIGTERM, wait out the grace period, then SIGKILL.
async fn terminate(child: &mut Child, binary: &Path) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        let _ = nix::sys::signal::kill(
            nix::unistd::Pid::from_raw(pid as i32),
            nix::sys::signal::Signal::SIGTERM,
        );
        if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_ok() {
            return;
        }
        tracing::warn!(binary = %binary.display(), "analyzer ignored SIGTERM, killing");
    }

    let _ = child.kill().await;
    let _ = child.wait().await;
}

fn tail(s: &str, n: usize) -> String {
    let trimmed = s.trim_end();
    if trimmed.len() <= n {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - n;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
