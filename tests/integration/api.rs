//! End-to-end tests against a running `waitlist serve`.

use std::fs;
use std::path::PathBuf;

use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde_json::{Value, json};

use crate::common::{
    KillOnDrop, demo_databases, get_free_port, run_list, spawn_demo, spawn_server,
    wait_for_listening,
};

struct Server {
    _dir: tempfile::TempDir,
    _guard: KillOnDrop,
    database: PathBuf,
    base: String,
}

async fn start_server() -> Server {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("waitlist.db");
    let index = dir.path().join("index.html");
    fs::write(&index, "<form id=\"signup\"></form>").unwrap();

    let port = get_free_port();
    let guard = spawn_server(port, &database, &index);
    wait_for_listening(port, 10).await;

    Server {
        _dir: dir,
        _guard: guard,
        database,
        base: format!("http://127.0.0.1:{port}"),
    }
}

#[tokio::test]
async fn json_signup_is_created_then_conflicts() {
    let server = start_server().await;
    let client = Client::new();
    let url = format!("{}/api/v1/waitlist", server.base);

    let resp = client
        .post(&url)
        .json(&json!({ "email": "a@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "message": "email accepted for waitlist" }));

    let resp = client
        .post(&url)
        .json(&json!({ "email": "a@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "email already registered");

    let output = run_list(&server.database, false);
    assert!(output.status.success(), "list failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 2, "{stdout}");
    assert_eq!(stdout.matches("a@example.com").count(), 1, "{stdout}");
}

#[tokio::test]
async fn bad_form_submission_gets_html_error() {
    let server = start_server().await;
    let client = Client::new();

    let resp = client
        .post(format!("{}/api/v1/waitlist", server.base))
        .form(&[("email", "bad")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(
        resp.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"),
        "expected an HTML reply"
    );
    let body = resp.text().await.unwrap();
    assert!(body.contains("invalid email address"), "{body}");
}

#[tokio::test]
async fn honeypot_submission_is_hidden_from_waitlist() {
    let server = start_server().await;
    let client = Client::new();

    let resp = client
        .post(format!("{}/api/v1/waitlist", server.base))
        .form(&[("email", "not-an-email"), ("nickname", "spam-bot")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.text().await.unwrap().contains("email accepted for waitlist"));

    let waitlist = run_list(&server.database, false);
    assert!(waitlist.status.success(), "list failed: {waitlist:?}");
    let waitlist = String::from_utf8(waitlist.stdout).unwrap();
    assert!(waitlist.contains("(no entries)"), "{waitlist}");

    let honeypot = run_list(&server.database, true);
    assert!(honeypot.status.success(), "list failed: {honeypot:?}");
    let honeypot = String::from_utf8(honeypot.stdout).unwrap();
    assert!(honeypot.contains("not-an-email"), "{honeypot}");
    assert!(honeypot.contains("spam-bot"), "{honeypot}");
}

#[tokio::test]
async fn wrong_method_and_static_form() {
    let server = start_server().await;
    let client = Client::new();

    let resp = client
        .get(format!("{}/api/v1/waitlist", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()["allow"], "POST");

    let resp = client.get(format!("{}/", server.base)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("signup"));

    let resp = client
        .get(format!("{}/nope", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn demo_serves_a_fresh_database_in_the_given_dir() {
    let dir = tempfile::tempdir().unwrap();
    let demo_dir = dir.path().join("demo");
    let index = dir.path().join("index.html");
    fs::write(&index, "<form id=\"signup\"></form>").unwrap();

    let port = get_free_port();
    let _guard = spawn_demo(port, &demo_dir, &index);
    wait_for_listening(port, 10).await;

    let databases = demo_databases(&demo_dir);
    assert_eq!(databases.len(), 1, "{databases:?}");
    let database = databases.first().unwrap();

    let resp = Client::new()
        .post(format!("http://127.0.0.1:{port}/api/v1/waitlist"))
        .json(&json!({ "email": "demo@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let output = run_list(database, false);
    assert!(output.status.success(), "list failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("demo@example.com"), "{stdout}");
}
