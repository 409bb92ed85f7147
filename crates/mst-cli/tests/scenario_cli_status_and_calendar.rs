//! End-to-end `mst` invocations.
//!
//! Every run uses a fresh temp dir as cwd so no stray `.env.local` leaks in,
//! and pins the clock with `--at` where output must be exact. Alpaca configs
//! point at sentinel env var names (`MST_SENTINEL_*`) that are never set, and
//! at a closed local port, so nothing reaches the network.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn mst(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mst").expect("mst binary builds");
    cmd.current_dir(cwd).env_remove("RUST_LOG");
    cmd
}

fn write_yaml(dir: &Path, name: &str, body: &str) -> String {
    let p = dir.join(name);
    std::fs::write(&p, body).expect("write yaml");
    p.to_string_lossy().to_string()
}

const ALPACA_NO_CREDS: &str = r#"
calendar:
  source: alpaca
  query_timeout_secs: 1
  alpaca:
    base_url: "http://127.0.0.1:9"
    keys_env:
      api_key: "MST_SENTINEL_CLI_KEY_A1"
      api_secret: "MST_SENTINEL_CLI_SEC_A1"
"#;

#[test]
fn status_at_weekday_evening_prints_exact_block() {
    let dir = tempfile::tempdir().unwrap();
    let out = mst(dir.path())
        .args(["status", "--at", "2025-08-13T20:12:45-04:00"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Market: CLOSED\n\
         Current time: 2025-08-13 20:12:45 -04:00\n\
         Next open: 2025-08-14 09:30:00 -04:00 America/New_York\n\
         Opens in: 13:17:15\n"
    );
}

#[test]
fn status_during_session_counts_down_to_close() {
    let dir = tempfile::tempdir().unwrap();
    mst(dir.path())
        .args(["status", "--at", "2025-08-13T15:59:15-04:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Market: OPEN"))
        .stdout(predicate::str::contains("Closes in: 00:00:45"));
}

#[test]
fn status_with_missing_alpaca_credentials_degrades_to_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_yaml(dir.path(), "alpaca.yaml", ALPACA_NO_CREDS);

    mst(dir.path())
        .args(["status", "--config", &cfg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Market: UNKNOWN"))
        .stdout(predicate::str::ends_with("status unknown\n"))
        .stderr(predicate::str::contains("MST_SENTINEL_CLI_KEY_A1"));
}

#[test]
fn calendar_with_missing_alpaca_credentials_fails_naming_the_var() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_yaml(dir.path(), "alpaca.yaml", ALPACA_NO_CREDS);

    mst(dir.path())
        .args(["calendar", "--config", &cfg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SECRETS_MISSING"))
        .stderr(predicate::str::contains("MST_SENTINEL_CLI_KEY_A1"));
}

#[test]
fn calendar_prints_raw_rules_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    mst(dir.path())
        .args(["calendar", "--at", "2025-07-03T14:00:00-04:00"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("exchange=NYSE\n"))
        .stdout(predicate::str::contains("source=nyse-rules"))
        .stdout(predicate::str::contains("is_open=false"))
        .stdout(predicate::str::contains("next_open=2025-07-07T09:30:00-04:00"));
}

#[test]
fn calendar_reports_configured_exchange_name() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_yaml(dir.path(), "xnys.yaml", "exchange:\n  name: XNYS\n");

    mst(dir.path())
        .args(["calendar", "--config", &cfg, "--at", "2025-07-03T14:00:00-04:00"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("exchange=XNYS\n"))
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS").not());
}

#[test]
fn unknown_exchange_timezone_is_flagged_approximate() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_yaml(
        dir.path(),
        "tz.yaml",
        "exchange:\n  timezone: \"Mars/Olympus_Mons\"\n",
    );

    mst(dir.path())
        .args(["status", "--config", &cfg, "--at", "2025-08-13T20:12:45-04:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "local time (approximate: exchange timezone unavailable)",
        ))
        .stdout(predicate::str::contains("Opens in: 13:17:15 (approximate)"));
}

#[test]
fn invalid_config_fails_with_code() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_yaml(dir.path(), "bad.yaml", "timer:\n  tick_interval_ms: 0\n");

    mst(dir.path())
        .args(["status", "--config", &cfg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"));
}

#[test]
fn invalid_at_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    mst(dir.path())
        .args(["status", "--at", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--at"));
}

#[test]
fn unused_keys_warn_on_stderr_only() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_yaml(dir.path(), "typo.yaml", "timer:\n  tick_intervall_ms: 5\n");

    mst(dir.path())
        .args(["status", "--config", &cfg, "--at", "2025-08-13T20:12:45-04:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIG_UNUSED_KEYS").not())
        .stderr(predicate::str::contains("CONFIG_UNUSED_KEYS"))
        .stderr(predicate::str::contains("/timer/tick_intervall_ms"));
}

#[test]
fn config_hash_prints_hash_and_canonical_json() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_yaml(dir.path(), "base.yaml", "exchange:\n  name: NYSE\n");
    let overlay = write_yaml(dir.path(), "overlay.yaml", "exchange:\n  name: LSE\n");

    mst(dir.path())
        .args(["config-hash", &base, &overlay])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^config_hash=[0-9a-f]{64}\n").unwrap())
        .stdout(predicate::str::contains(r#"{"exchange":{"name":"LSE"}}"#));
}
