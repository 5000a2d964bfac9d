//! Tests for the exposure CLI check commands

use std::{
    io::Write,
    process::{Output, Stdio},
};

use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

mod common;
use common::exposure;

const HUNTER2_HASH: &str = "F3BBBD66A63D4BF1747940578EC3D0103530E21D";

/// Run the CLI off the async runtime so the mock server keeps serving
async fn run(args: Vec<String>, stdin: &'static str) -> Output {
    tokio::task::spawn_blocking(move || {
        let mut child = exposure()
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to execute exposure command");

        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(stdin.as_bytes())
            .expect("Failed to write stdin");

        child.wait_with_output().expect("Failed to wait for exposure")
    })
    .await
    .unwrap()
}

fn args(server: &MockServer, rest: &[&str]) -> Vec<String> {
    let mut args = vec![
        "--corpus-url".to_string(),
        server.uri(),
        "--color".to_string(),
        "no".to_string(),
    ];
    args.extend(rest.iter().map(|s| s.to_string()));
    args
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_password_from_stdin() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/range/password/F3BBB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "hash": HUNTER2_HASH,
                "breach": { "id": "rockyou", "name": "RockYou", "firstSeenDate": "2009-12-14" }
            },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(
        args(&server, &["check", "password", "--stdin", "--details"]),
        "hunter2\n",
    )
    .await;

    assert!(
        output.status.success(),
        "Command should exit successfully: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "breached");
    assert_eq!(report["riskTier"], "LOW");
    assert_eq!(report["records"][0]["name"], "RockYou");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stdout.contains("hunter2"));
    assert!(!stderr.contains("hunter2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_email_safe_summary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/range/email/63A71"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(args(&server, &["check", "email", "user@example.com"]), "").await;

    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "safe");
    assert_eq!(report["riskTier"], "SAFE");
    assert_eq!(report["totalExposures"], 0);
    assert!(report.get("records").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unavailable_corpus_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = run(args(&server, &["check", "email", "user@example.com"]), "").await;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unavailable"),
        "Error should explain the failure: {}",
        stderr
    );
}

#[test]
fn test_invalid_email_is_rejected_without_a_corpus() {
    // Nothing listens on the discard port, so reaching the corpus would fail differently
    let output = exposure()
        .args([
            "--corpus-url",
            "http://127.0.0.1:9",
            "check",
            "email",
            "not-an-email",
        ])
        .output()
        .expect("Failed to execute exposure command");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("malformed"),
        "Error should reject the address: {}",
        stderr
    );
}

#[test]
fn test_missing_corpus_is_reported() {
    let output = exposure()
        .args(["check", "email", "user@example.com"])
        .output()
        .expect("Failed to execute exposure command");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No corpus configured"),
        "Error should mention the corpus: {}",
        stderr
    );
}
