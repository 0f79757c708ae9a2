//! CLI end-to-end tests for `generate` against a mock RunningHub.
//!
//! The binary runs on a blocking thread while the mock server keeps serving
//! from the multi-threaded runtime.

mod common;

use assert_cmd::prelude::*;
use common::*;
use predicates::prelude::*;
use serde_json::json;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[allow(deprecated)]
fn vidforge_cmd() -> Command {
    let mut cmd = Command::cargo_bin("vidforge").unwrap();
    cmd.env_remove("VIDFORGE_API_KEY").env_remove("RUST_LOG");
    cmd
}

/// Config pointing at `server` with the shortest valid polling interval.
fn server_config(dir: &TempDir, server: &MockServer) -> PathBuf {
    let path = dir.path().join("vidforge.toml");
    fs::write(
        &path,
        format!(
            "[provider]\napi_key = \"{}\"\nbase_url = \"{}\"\n\n[polling]\ninterval_secs = 1\nmax_attempts = 3\n",
            API_KEY,
            server.uri()
        ),
    )
    .unwrap();
    path
}

async fn run_generate(config: &Path, args: &[&str]) -> Output {
    let mut argv: Vec<OsString> = vec!["--config".into(), config.into(), "generate".into()];
    argv.extend(args.iter().map(OsString::from));

    tokio::task::spawn_blocking(move || vidforge_cmd().args(argv).output().unwrap())
        .await
        .unwrap()
}

fn ok_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn video_row(db: &Path) -> (String, Option<String>, Option<String>, Option<i64>) {
    let conn = rusqlite::Connection::open(db).unwrap();
    conn.query_row("SELECT state, task_id, file_url, time FROM t_video", [], |r| {
        Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
    })
    .unwrap()
}

/// Answers with `body` after wiping the bookkeeping table, so the later
/// completion update finds no row.
struct WipeRowsThen {
    db: PathBuf,
    body: serde_json::Value,
}

impl Respond for WipeRowsThen {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        rusqlite::Connection::open(&self.db)
            .unwrap()
            .execute("DELETE FROM t_video", [])
            .unwrap();
        ok_json(self.body.clone())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generate_waits_and_prints_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(T2V_PRO_PATH))
        .respond_with(ok_json(json!({ "taskId": "t-1", "status": "QUEUED" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(task_path("t-1")))
        .respond_with(ok_json(json!({
            "taskId": "t-1",
            "status": "SUCCESS",
            "results": [{ "url": "https://cdn.example.com/t-1.mp4" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = server_config(&dir, &server);

    run_generate(&config, &["-p", "waves at night"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Task: t-1"))
        .stdout(predicate::str::contains(
            "Video URL: https://cdn.example.com/t-1.mp4",
        ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generate_json_output() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(T2V_PRO_PATH))
        .respond_with(ok_json(json!({
            "taskId": "t-2",
            "status": "SUCCESS",
            "results": [{ "url": "https://cdn.example.com/t-2.mp4" }]
        })))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = server_config(&dir, &server);

    let output = run_generate(&config, &["-p", "waves at night", "--json"]).await;
    assert!(output.status.success());

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["task_id"], "t-2");
    assert_eq!(body["video_url"], "https://cdn.example.com/t-2.mp4");
    assert!(body["elapsed"].is_number());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generate_no_wait_prints_task_and_records_it() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(T2V_PRO_PATH))
        .respond_with(ok_json(json!({ "taskId": "t-3", "status": "QUEUED" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ok_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = server_config(&dir, &server);
    let db = dir.path().join("jobs.db");
    let db_arg = db.to_str().unwrap();

    run_generate(&config, &["-p", "waves at night", "--no-wait", "--db", db_arg])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Task: t-3"))
        .stdout(predicate::str::contains("Video URL").not());

    let (state, task_id, file_url, time) = video_row(&db);
    assert_eq!(state, "running");
    assert_eq!(task_id.as_deref(), Some("t-3"));
    assert_eq!(file_url, None);
    assert_eq!(time, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generate_no_wait_json_output() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(T2V_PRO_PATH))
        .respond_with(ok_json(json!({ "taskId": "t-4", "status": "RUNNING" })))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = server_config(&dir, &server);

    let output = run_generate(&config, &["-p", "waves at night", "--no-wait", "--json"]).await;
    assert!(output.status.success());

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body, json!({ "task_id": "t-4" }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generate_records_success_in_db() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(T2V_PRO_PATH))
        .respond_with(ok_json(json!({ "taskId": "t-5", "status": "QUEUED" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(task_path("t-5")))
        .respond_with(ok_json(json!({
            "taskId": "t-5",
            "status": "SUCCESS",
            "results": [{ "url": "https://cdn.example.com/t-5.mp4" }]
        })))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = server_config(&dir, &server);
    let db = dir.path().join("jobs.db");

    run_generate(&config, &["-p", "waves at night", "--db", db.to_str().unwrap()])
        .await
        .assert()
        .success();

    let (state, task_id, file_url, time) = video_row(&db);
    assert_eq!(state, "succeeded");
    assert_eq!(task_id.as_deref(), Some("t-5"));
    assert_eq!(file_url.as_deref(), Some("https://cdn.example.com/t-5.mp4"));
    assert!(time.is_some_and(|t| t >= 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generate_prints_url_when_recording_completion_fails() {
    let server = MockServer::start().await;

    let dir = tempdir().unwrap();
    let config = server_config(&dir, &server);
    let db = dir.path().join("jobs.db");

    Mock::given(method("POST"))
        .and(path(T2V_PRO_PATH))
        .respond_with(WipeRowsThen {
            db: db.clone(),
            body: json!({
                "taskId": "t-6",
                "status": "SUCCESS",
                "results": [{ "url": "https://cdn.example.com/paid.mp4" }]
            }),
        })
        .expect(1)
        .mount(&server)
        .await;

    run_generate(&config, &["-p", "waves", "--db", db.to_str().unwrap()])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Video URL: https://cdn.example.com/paid.mp4",
        ))
        .stderr(predicate::str::contains("Failed to record generation outcome"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generate_reports_provider_error_when_recording_failure_fails() {
    let server = MockServer::start().await;

    let dir = tempdir().unwrap();
    let config = server_config(&dir, &server);
    let db = dir.path().join("jobs.db");

    Mock::given(method("POST"))
        .and(path(T2V_PRO_PATH))
        .respond_with(WipeRowsThen {
            db: db.clone(),
            body: json!({ "status": "FAILED", "errorMessage": "quota exhausted" }),
        })
        .mount(&server)
        .await;

    run_generate(&config, &["-p", "waves", "--db", db.to_str().unwrap()])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("quota exhausted"))
        .stderr(predicate::str::contains("Error: Not found").not());
}
