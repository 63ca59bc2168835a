//! End-to-end tests of the `quistik` binary.
//!
//! Every test points the account file at a temporary directory and clears
//! the `QISKIT_IBM_*` variables, so nothing here reads a real profile or
//! reaches the network.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const FAKE_KEY: &str = "not-a-real-api-key";

fn quistik(account_file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_quistik"))
        .args(args)
        .env("QUISTIK_ACCOUNT_FILE", account_file)
        .env_remove("QISKIT_IBM_TOKEN")
        .env_remove("QISKIT_IBM_CHANNEL")
        .env_remove("QISKIT_IBM_INSTANCE")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run quistik")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn read_profile(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// version / help
// ============================================================================

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = quistik(&dir.path().join("accounts.json"), &["version"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("quistik"));
    assert!(out.contains(env!("CARGO_PKG_VERSION")));
    assert!(out.contains("quistik-adapter-ibm"));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = quistik(&dir.path().join("accounts.json"), &["--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for command in ["run", "save-account", "backends", "job", "version"] {
        assert!(out.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_help_hides_token_value() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_quistik"))
        .args(["run", "--help"])
        .env("QUISTIK_ACCOUNT_FILE", dir.path().join("accounts.json"))
        .env("QISKIT_IBM_TOKEN", FAKE_KEY)
        .output()
        .unwrap();
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("QISKIT_IBM_TOKEN"));
    assert!(!out.contains(FAKE_KEY));
}

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    let output = quistik(&dir.path().join("accounts.json"), &["compile"]);
    assert!(!output.status.success());
}

// ============================================================================
// save-account
// ============================================================================

#[test]
fn test_save_account_writes_profile() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("qiskit").join("qiskit-ibm.json");
    let output = quistik(&path, &["save-account", "--token", FAKE_KEY]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("default-ibm-quantum-platform"));
    assert!(!stdout(&output).contains(FAKE_KEY));

    let profile = read_profile(&path);
    let account = &profile["default-ibm-quantum-platform"];
    assert_eq!(account["channel"], "ibm_quantum_platform");
    assert_eq!(account["token"], FAKE_KEY);
    assert_eq!(account["verify"], true);
}

#[test]
fn test_save_account_reads_token_from_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.json");
    let output = Command::new(env!("CARGO_BIN_EXE_quistik"))
        .args(["save-account", "--name", "env-account"])
        .env("QUISTIK_ACCOUNT_FILE", &path)
        .env("QISKIT_IBM_TOKEN", FAKE_KEY)
        .env("QISKIT_IBM_INSTANCE", "crn:v1:bluemix:public:quantum-computing:us-east:a/x::")
        .env_remove("QISKIT_IBM_CHANNEL")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let profile = read_profile(&path);
    assert_eq!(profile["env-account"]["token"], FAKE_KEY);
    assert!(
        profile["env-account"]["instance"]
            .as_str()
            .unwrap()
            .starts_with("crn:v1:")
    );
}

#[test]
fn test_save_account_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.json");
    assert!(
        quistik(&path, &["save-account", "--token", FAKE_KEY])
            .status
            .success()
    );

    let output = quistik(&path, &["save-account", "--token", "another-fake-key"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Error:"));
    assert!(err.contains("already exists"));
    assert_eq!(read_profile(&path)["default-ibm-quantum-platform"]["token"], FAKE_KEY);

    let output = quistik(
        &path,
        &["save-account", "--token", "another-fake-key", "--overwrite"],
    );
    assert!(output.status.success());
    assert_eq!(
        read_profile(&path)["default-ibm-quantum-platform"]["token"],
        "another-fake-key"
    );
}

#[test]
fn test_save_account_ibm_cloud_channel() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.json");
    let output = quistik(
        &path,
        &["save-account", "--token", FAKE_KEY, "--channel", "ibm_cloud"],
    );
    assert!(output.status.success());
    assert_eq!(read_profile(&path)["default-ibm-cloud"]["channel"], "ibm_cloud");
}

#[test]
fn test_save_account_keeps_retired_channel_entry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("qiskit-ibm.json");
    let legacy = serde_json::json!({
        "default-ibm-quantum": {
            "channel": "ibm_quantum",
            "token": "legacy-fake-key",
            "url": "https://auth.quantum-computing.ibm.com/api",
            "proxies": {"urls": {"https": "http://proxy:8080"}}
        }
    });
    std::fs::write(&path, legacy.to_string()).unwrap();

    let output = quistik(&path, &["save-account", "--token", FAKE_KEY, "--overwrite"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let profile = read_profile(&path);
    assert_eq!(profile["default-ibm-quantum"], legacy["default-ibm-quantum"]);
    assert_eq!(profile["default-ibm-quantum-platform"]["token"], FAKE_KEY);
}

#[test]
fn test_save_account_without_token_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.json");
    let output = quistik(&path, &["save-account"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("QISKIT_IBM_TOKEN"));
    assert!(!path.exists());
}

#[test]
fn test_invalid_channel_rejected() {
    let dir = TempDir::new().unwrap();
    let output = quistik(
        &dir.path().join("accounts.json"),
        &["save-account", "--token", FAKE_KEY, "--channel", "ibm_quantum"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("ibm_quantum_platform"));
}

// ============================================================================
// commands needing an account fail before any request
// ============================================================================

#[test]
fn test_run_without_account_fails() {
    let dir = TempDir::new().unwrap();
    let output = quistik(&dir.path().join("accounts.json"), &["run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("token not found"));
    assert!(!stdout(&output).contains("Using backend"));
}

#[test]
fn test_backends_without_account_fails() {
    let dir = TempDir::new().unwrap();
    let output = quistik(&dir.path().join("accounts.json"), &["backends"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("QISKIT_IBM_TOKEN"));
}

#[test]
fn test_malformed_profile_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.json");
    std::fs::write(&path, "{ not json").unwrap();
    let output = quistik(&path, &["job", "d1x2y3"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Malformed account file"));
}
