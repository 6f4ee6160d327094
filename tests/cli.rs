use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("unirank").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("unirank"))
        .stdout(predicate::str::contains("trend"));
}

#[test]
fn compare_rejects_more_than_five() {
    let mut cmd = Command::cargo_bin("unirank").unwrap();
    cmd.args(["compare", "a", "b", "c", "d", "e", "f"]);
    cmd.assert().failure();
}

#[test]
fn unreachable_backend_fails_with_message() {
    let mut cmd = Command::cargo_bin("unirank").unwrap();
    // Port 9 (discard) is not expected to serve HTTP
    cmd.args(["--base-url", "http://127.0.0.1:9", "years"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load the available years"));
}

// Live test (opt-in): UNIRANK_BASE_URL=http://host:port cargo test --features online
#[cfg(feature = "online")]
#[test]
fn years_online() {
    let mut cmd = Command::cargo_bin("unirank").unwrap();
    cmd.arg("years");
    cmd.assert().success();
}
