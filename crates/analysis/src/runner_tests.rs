// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

/// Write an executable fake-analyzer script and a dummy log file.
fn fake_analyzer(dir: &TempDir, body: &str) -> (PathBuf, PathBuf) {
    let bin = dir.path().join("analyzer.sh");
    std::fs::write(&bin, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

    let log = dir.path().join("server.log");
    std::fs::write(&log, "<API > line\n").unwrap();
    (bin, log)
}

fn request(log: PathBuf) -> RunRequest {
    RunRequest {
        file_path: log,
        flags: AnalyzerFlags::all(),
        heap_mb: None,
        timeout: None,
    }
}

fn runner(bin: PathBuf) -> AnalyzerRunner {
    AnalyzerRunner::new(bin, 512, Duration::from_secs(10))
}

#[tokio::test]
async fn captures_stdout_and_invokes_line_callback() {
    let dir = TempDir::new().unwrap();
    let (bin, log) = fake_analyzer(&dir, "echo one\necho two\necho three");

    let mut seen = Vec::new();
    let output = runner(bin)
        .run(&CancellationToken::new(), &request(log), |n, line| {
            seen.push((n, line.to_string()));
        })
        .await
        .unwrap();

    assert_eq!(output.exit_code, 0);
    assert_eq!(output.stdout, "one\ntwo\nthree\n");
    assert_eq!(seen, vec![
        (1, "one".to_string()),
        (2, "two".to_string()),
        (3, "three".to_string()),
    ]);
}

#[tokio::test]
async fn nonzero_exit_fails_with_stderr_tail() {
    let dir = TempDir::new().unwrap();
    let (bin, log) = fake_analyzer(&dir, "echo 'OOM: heap exhausted' >&2\nexit 1");

    let err = runner(bin)
        .run(&CancellationToken::new(), &request(log), |_, _| {})
        .await
        .unwrap_err();

    match err {
        RunnerError::Failed { exit_code, stderr_tail } => {
            assert_eq!(exit_code, 1);
            assert!(stderr_tail.contains("OOM"), "stderr tail: {stderr_tail}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn stderr_with_clean_exit_is_success() {
    let dir = TempDir::new().unwrap();
    let (bin, log) = fake_analyzer(&dir, "echo report >&1\necho 'warning: skew' >&2");

    let output = runner(bin)
        .run(&CancellationToken::new(), &request(log), |_, _| {})
        .await
        .unwrap();

    assert_eq!(output.exit_code, 0);
    assert!(output.stderr.contains("warning: skew"));
}

#[tokio::test]
async fn timeout_kills_the_child() {
    let dir = TempDir::new().unwrap();
    let (bin, log) = fake_analyzer(&dir, "sleep 30");

    let mut req = request(log);
    req.timeout = Some(Duration::from_millis(200));

    let started = std::time::Instant::now();
    let err = runner(bin)
        .run(&CancellationToken::new(), &req, |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, RunnerError::Timeout(_)));
    // Well under the 30s the child asked for: terminated, not awaited.
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn cancellation_terminates_within_grace() {
    let dir = TempDir::new().unwrap();
    let (bin, log) = fake_analyzer(&dir, "sleep 30");

    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = std::time::Instant::now();
    let err = runner(bin).run(&token, &request(log), |_, _| {}).await.unwrap_err();

    assert!(matches!(err, RunnerError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn missing_binary_is_spawn_error() {
    let dir = TempDir::new().unwrap();
    let (_, log) = fake_analyzer(&dir, "true");

    let err = runner(dir.path().join("absent"))
        .run(&CancellationToken::new(), &request(log), |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, RunnerError::Spawn(_)));
}

#[tokio::test]
async fn flags_reach_the_child() {
    let dir = TempDir::new().unwrap();
    let (bin, log) = fake_analyzer(&dir, "echo \"$@\"");

    let mut req = request(log.clone());
    req.flags = AnalyzerFlags { api: true, sql: false, filters: true, ..Default::default() };
    req.heap_mb = Some(1024);

    let output = runner(bin)
        .run(&CancellationToken::new(), &req, |_, _| {})
        .await
        .unwrap();

    assert!(output.stdout.contains("--heap-mb 1024"));
    assert!(output.stdout.contains("--api"));
    assert!(output.stdout.contains("--filters"));
    assert!(!output.stdout.contains("--sql"));
    assert!(output.stdout.contains(log.to_str().unwrap()));
}
