//! Integration tests for the `skillmart` CLI binary.
//!
//! Argument parsing, help output, completions and error exits, plus a
//! couple of runs against a mocked backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `skillmart` binary with env isolation.
///
/// Clears all `SKILLMART_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn skillmart_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("skillmart");
    cmd.env("HOME", "/tmp/skillmart-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/skillmart-cli-test-nonexistent")
        .env_remove("SKILLMART_PROFILE")
        .env_remove("SKILLMART_API_URL")
        .env_remove("SKILLMART_TOKEN")
        .env_remove("SKILLMART_OUTPUT")
        .env_remove("SKILLMART_INSECURE")
        .env_remove("SKILLMART_TIMEOUT")
        .env_remove("SKILLMART_EMAIL")
        .env_remove("SKILLMART_PASSWORD");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn backend_with_student() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-cli"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "name": "Ann", "email": "ann@example.com", "role": "student"
        })))
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let api_url = format!("{}/api", server.uri());
    let args: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
    tokio::task::spawn_blocking(move || {
        skillmart_cmd()
            .args(["--api-url", &api_url, "--token", "tok-cli"])
            .args(&args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = skillmart_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    skillmart_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("SkillMart")
            .and(predicate::str::contains("cart"))
            .and(predicate::str::contains("coupons"))
            .and(predicate::str::contains("users")),
    );
}

#[test]
fn test_version_flag() {
    skillmart_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("skillmart"));
}

#[test]
fn test_cart_help_lists_checkout() {
    skillmart_cmd().args(["cart", "--help"]).assert().success().stdout(
        predicate::str::contains("checkout")
            .and(predicate::str::contains("apply-coupon"))
            .and(predicate::str::contains("toggle")),
    );
}

#[test]
fn test_coupons_list_help_shows_sort_orders() {
    skillmart_cmd()
        .args(["coupons", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expiry-asc").and(predicate::str::contains("uses-desc")));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    skillmart_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    skillmart_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    skillmart_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = skillmart_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success(), "Expected failure for invalid subcommand");
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = skillmart_cmd()
        .args(["--output", "invalid", "cart", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("invalid"), "Expected 'invalid' in output:\n{text}");
}

#[test]
fn test_cart_show_without_api_url() {
    skillmart_cmd()
        .args(["cart", "show"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("api-url"))
                .or(predicate::str::contains("API URL")),
        );
}

#[test]
fn test_config_show_no_config() {
    // Falls back to the default config when no file exists.
    skillmart_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_lowercase_coupon_rejected_before_connecting() {
    // Port 9 is discard; a connection attempt would fail with exit 7, not 2.
    let output = skillmart_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9/api",
            "--token",
            "x",
            "cart",
            "apply-coupon",
            "c1",
            "save20",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[test]
fn test_coupon_create_rejects_bad_expiry() {
    let output = skillmart_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9/api",
            "--token",
            "x",
            "coupons",
            "create",
            "c1",
            "--code",
            "SPRING25",
            "--discount",
            "25",
            "--max-uses",
            "10",
            "--expires",
            "next week",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("expires"));
}

#[test]
fn test_destructive_command_requires_yes_without_tty() {
    let output = skillmart_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9/api",
            "--token",
            "x",
            "users",
            "delete",
            "u9",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

// ── Against a mocked backend ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_cart_show_plain_lists_course_ids() {
    let server = backend_with_student().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": "u1",
            "items": [
                { "courseId": "c1", "title": "Rust", "price": 20 },
                { "courseId": "c2", "title": "Tokio", "price": 30 }
            ],
            "subtotal": 50, "totalDiscount": 0, "total": 50
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "cart", "show"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "c1\nc2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_forbidden_maps_to_permission_exit_code() {
    let server = backend_with_student().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "Admins only" })),
        )
        .mount(&server)
        .await;

    let output = run_against(&server, &["admin", "stats"]).await;
    assert_eq!(output.status.code(), Some(5), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Admins only"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_json() {
    let server = backend_with_student().await;

    let output = run_against(&server, &["-o", "json", "whoami"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["email"], "ann@example.com");
    assert_eq!(body["role"], "student");
}
