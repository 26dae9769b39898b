//! Status server tests against a real listener on an ephemeral port.

use std::fs;
use std::num::NonZeroUsize;
use std::sync::Arc;

use judge_probe::config::Token;
use judge_probe::server::{serve, StatusState, TOKEN_HEADER};
use judge_probe::status::{JudgerVersion, StatusReporter};
use judge_probe::system::{CapacityResolver, CgroupPaths, ProcMetrics};
use reqwest::StatusCode;
use tokio::net::TcpListener;

/// Boot a status server over a fake cgroup root, returning its base URL.
async fn start_server(cgroup_root: &std::path::Path) -> String {
    let resolver = CapacityResolver::new(
        CgroupPaths::new(cgroup_root),
        NonZeroUsize::new(8).unwrap(),
    );
    let reporter = StatusReporter::new(
        resolver,
        Arc::new(ProcMetrics::new()),
        JudgerVersion(0x0005_0301),
    );
    let state = Arc::new(StatusState::new(reporter, Token::from_secret("abc")).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state));

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(dir.path()).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));
}

#[tokio::test]
async fn test_ping_reports_cgroup_capacity() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cpu.max"), "400000 100000\n").unwrap();
    fs::write(dir.path().join("cpuset.cpus.effective"), "0-1\n").unwrap();
    let base = start_server(dir.path()).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/ping", base))
        .header(TOKEN_HEADER, Token::from_secret("abc").as_str())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["err"].is_null());
    let data = &body["data"];
    assert_eq!(data["cpu_core"], 4);
    assert_eq!(data["judger_version"], "5.3.1");
    assert!(data["hostname"].is_string());
    let cpu = data["cpu"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&cpu));
    let memory = data["memory"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&memory));
}

#[tokio::test]
async fn test_ping_requires_token() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(dir.path()).await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/ping", base))
        .header(TOKEN_HEADER, "abc")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["err"], "invalid_token");
}

#[tokio::test]
async fn test_unknown_path() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_server(dir.path()).await;

    let resp = reqwest::get(format!("{}/status", base)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
