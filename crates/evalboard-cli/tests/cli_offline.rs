use assert_cmd::Command;
use predicates::str::contains;

// Port 9 (discard) is not served locally, so every request fails fast.
const DEAD_URL: &str = "http://127.0.0.1:9";

#[test]
fn help_lists_dashboard_commands() {
    let mut cmd = Command::cargo_bin("evalboard").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("run-next"))
        .stdout(contains("chart"))
        .stdout(contains("dashboard"));
}

#[test]
fn unreachable_server_fails_list() {
    let mut cmd = Command::cargo_bin("evalboard").unwrap();
    cmd.args(["--base-url", DEAD_URL, "list"])
        .assert()
        .code(1)
        .stderr(contains("failed to load evaluations"))
        .stderr(contains("cannot reach"));
}

#[test]
fn unreachable_server_fails_chart_with_retry_hint() {
    let mut cmd = Command::cargo_bin("evalboard").unwrap();
    cmd.args(["--base-url", DEAD_URL, "chart", "--mode", "categories"])
        .assert()
        .code(1)
        .stdout(contains("Failed to load performance chart"))
        .stderr(contains("failed to load performance data"));
}

#[test]
fn unknown_chart_mode_is_rejected() {
    let mut cmd = Command::cargo_bin("evalboard").unwrap();
    cmd.args(["chart", "--mode", "pie"])
        .assert()
        .failure()
        .stderr(contains("invalid value"));
}

#[test]
fn show_requires_numeric_id() {
    let mut cmd = Command::cargo_bin("evalboard").unwrap();
    cmd.args(["show", "abc"]).assert().failure();
}

#[test]
fn bad_log_filter_falls_back_quietly() {
    let mut cmd = Command::cargo_bin("evalboard").unwrap();
    cmd.env("EVALBOARD_LOG", "evalboard=[")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("dashboard"));
}
