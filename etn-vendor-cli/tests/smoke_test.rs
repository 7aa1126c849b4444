//! Smoke tests for etn-vendor-cli
//!
//! These tests run the built binary and need no network access.

use std::process::{Command, Output};

const OUTLET: &str = "0abc123def456";
const API_KEY: &str = "key_live_smoke";
const API_SECRET: &str = "sec_live_smoke";

fn etn_vendor(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_etn-vendor"))
        .args(args)
        .env_remove("ETN_VENDOR_API_KEY")
        .env_remove("ETN_VENDOR_API_SECRET")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Test that the CLI can show help
#[test]
fn test_cli_help() {
    let output = etn_vendor(&["--help"]);
    let help = stdout(&output);

    assert!(output.status.success());
    for command in ["payment-id", "qr", "encode", "sign", "verify", "poll"] {
        assert!(help.contains(command), "Help should mention '{}'", command);
    }
}

#[test]
fn test_payment_ids() {
    let output = etn_vendor(&["payment-id", "--count", "3"]);
    assert!(output.status.success());

    let out = stdout(&output);
    let ids: Vec<&str> = out.lines().collect();
    assert_eq!(ids.len(), 3);
    for id in ids {
        assert_eq!(id.len(), 10, "bad id {:?}", id);
        assert!(is_lower_hex(id), "bad id {:?}", id);
    }
}

#[test]
fn test_encode_json() {
    let output = etn_vendor(&[
        "encode",
        "--etn",
        "12.3",
        "--outlet",
        OUTLET,
        "--payment-id",
        "7ce25b4dc0",
        "--json",
    ]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        value["payment_string"],
        "etn-it-0abc123def456/7ce25b4dc0/12.30"
    );
    assert_eq!(value["amount"], "12.30");
    assert!(value["qr_url"]
        .as_str()
        .unwrap()
        .ends_with("data=etn-it-0abc123def456%2F7ce25b4dc0%2F12.30"));
}

#[test]
fn test_encode_rejects_bad_outlet() {
    let output = etn_vendor(&["encode", "--etn", "1", "--outlet", "not-hex"]);
    assert!(!output.status.success());
}

#[test]
fn test_sign_requires_secret() {
    let output = etn_vendor(&["sign", r#"{"key":"k","timestamp":1}"#]);
    assert!(!output.status.success());
}

#[test]
fn test_sign_and_verify() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("webhook.json");
    let body = serde_json::json!({
        "key": API_KEY,
        "timestamp": chrono::Utc::now().timestamp(),
        "payment_id": "7ce25b4dc0",
        "amount": "12.30",
    });
    std::fs::write(&path, serde_json::to_vec(&body).unwrap()).unwrap();
    let payload = format!("@{}", path.display());

    let output = etn_vendor(&["--api-secret", API_SECRET, "sign", &payload]);
    assert!(output.status.success());
    let signature = stdout(&output).trim().to_string();
    assert_eq!(signature.len(), 64);
    assert!(is_lower_hex(&signature));

    let output = etn_vendor(&[
        "--api-key",
        API_KEY,
        "--api-secret",
        API_SECRET,
        "verify",
        "--payload",
        &payload,
        "--signature",
        &signature,
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("HTTP 200"));

    let output = etn_vendor(&[
        "--api-key",
        API_KEY,
        "--api-secret",
        "some-other-secret",
        "verify",
        "--payload",
        &payload,
        "--signature",
        &signature,
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_verify_accepts_numeric_payment_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("webhook.json");
    let body = serde_json::json!({
        "key": API_KEY,
        "timestamp": chrono::Utc::now().timestamp(),
        "payment_id": 12345,
        "amount": "1990.00",
    });
    std::fs::write(&path, serde_json::to_vec(&body).unwrap()).unwrap();
    let payload = format!("@{}", path.display());

    let output = etn_vendor(&["--api-secret", API_SECRET, "sign", &payload]);
    assert!(output.status.success());
    let signature = stdout(&output).trim().to_string();

    let output = etn_vendor(&[
        "--api-key",
        API_KEY,
        "--api-secret",
        API_SECRET,
        "verify",
        "--payload",
        &payload,
        "--signature",
        &signature,
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let out = stdout(&output);
    assert!(out.contains("HTTP 200"));
    assert!(out.contains("12345"));
}

#[test]
fn test_poll_rejects_bad_payment_id() {
    let output = etn_vendor(&[
        "--api-key",
        API_KEY,
        "--api-secret",
        API_SECRET,
        "poll",
        "--outlet",
        OUTLET,
        "--payment-id",
        "short",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_poll_unreachable_endpoint() {
    let output = Command::new(env!("CARGO_BIN_EXE_etn-vendor"))
        .args([
            "--api-key",
            API_KEY,
            "--api-secret",
            API_SECRET,
            "poll",
            "--outlet",
            OUTLET,
            "--payment-id",
            "7ce25b4dc0",
        ])
        .env("ETN_VENDOR_POLL_URL", "http://127.0.0.1:1/vendor/check-payment")
        .env("ETN_VENDOR_CONNECT_TIMEOUT_SECS", "1")
        .env("ETN_VENDOR_TIMEOUT_SECS", "2")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
