//! Integration tests for the `sodo` CLI binary.
//!
//! Every test runs against a fresh temp directory for both the config file
//! and the saved project, so nothing touches the user's real data.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `sodo` binary with env isolation.
fn sodo_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sodo");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("SODO_CONFIG", home.join("config.toml"))
        .env("SODO_DATA_DIR", home.join("project"))
        .env("NO_COLOR", "1")
        .env_remove("SODO_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Place a device and return its id.
fn add_device(home: &Path, x: &str, y: &str, extra: &[&str]) -> String {
    let output = sodo_cmd(home)
        .args(["-o", "plain", "devices", "add", "--x", x, "--y", y])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    String::from_utf8(output.stdout).unwrap().trim().to_owned()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = sodo_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("connections"))
            .and(predicate::str::contains("floorplan"))
            .and(predicate::str::contains("bom")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sodo"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .arg("teleport")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ── Devices ─────────────────────────────────────────────────────────

#[test]
fn test_added_device_is_persisted() {
    let home = TempDir::new().unwrap();
    let id = add_device(home.path(), "100", "100", &[]);
    assert!(id.starts_with("cam_"), "unexpected id {id}");

    sodo_cmd(home.path())
        .args(["-o", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{id}\n")));
    assert!(home.path().join("project/cctv_project_v2.json").exists());
}

#[test]
fn test_device_fields_use_wire_labels_in_json() {
    let home = TempDir::new().unwrap();
    let id = add_device(
        home.path(),
        "40",
        "60",
        &["--type", "router", "--name", "Tủ mạng", "--status", "maintenance"],
    );
    let output = sodo_cmd(home.path())
        .args(["-o", "json", "devices", "get", &id])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "Router");
    assert_eq!(json["status"], "Bảo trì");
    assert_eq!(json["name"], "Tủ mạng");
    assert_eq!(json["x"], 40.0);
}

#[test]
fn test_bad_type_leaves_project_empty() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .args(["devices", "add", "--x", "1", "--y", "1", "--type", "toaster"])
        .assert()
        .code(2);
    sodo_cmd(home.path())
        .args(["-o", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_rotate_wraps_negative_degrees() {
    let home = TempDir::new().unwrap();
    let id = add_device(home.path(), "200", "200", &[]);
    let output = sodo_cmd(home.path())
        .args(["-o", "json", "devices", "rotate", &id, "--degrees", "-90"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["rotation"], 270.0);
}

#[test]
fn test_unknown_device_exits_not_found() {
    let home = TempDir::new().unwrap();
    let output = sodo_cmd(home.path())
        .args(["devices", "get", "cam_missing"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("devices list"));
}

#[test]
fn test_remove_cascades_connections() {
    let home = TempDir::new().unwrap();
    let a = add_device(home.path(), "0", "0", &[]);
    let b = add_device(home.path(), "50", "0", &[]);
    sodo_cmd(home.path())
        .args(["connections", "add", &a, &b])
        .assert()
        .success();
    sodo_cmd(home.path())
        .args(["-y", "devices", "remove", &a])
        .assert()
        .success();
    sodo_cmd(home.path())
        .args(["-o", "plain", "connections", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ── Connections ─────────────────────────────────────────────────────

#[test]
fn test_self_connection_is_rejected() {
    let home = TempDir::new().unwrap();
    let a = add_device(home.path(), "0", "0", &[]);
    sodo_cmd(home.path())
        .args(["connections", "add", &a, &a])
        .assert()
        .code(2);
}

#[test]
fn test_wireless_connection_with_label() {
    let home = TempDir::new().unwrap();
    let a = add_device(home.path(), "0", "0", &["--name", "NVR"]);
    let b = add_device(home.path(), "90", "0", &["--name", "Cổng"]);
    sodo_cmd(home.path())
        .args(["connections", "add", &a, &b, "--type", "wireless", "--label", "5GHz"])
        .assert()
        .success();
    sodo_cmd(home.path())
        .args(["connections", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("NVR → Cổng")
                .and(predicate::str::contains("wireless"))
                .and(predicate::str::contains("5GHz")),
        );
}

// ── Project, BOM, share ─────────────────────────────────────────────

#[test]
fn test_empty_bom_message() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .arg("bom")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chưa có thiết bị"));
}

#[test]
fn test_bom_counts_in_first_seen_order() {
    let home = TempDir::new().unwrap();
    add_device(home.path(), "0", "0", &["--type", "switch"]);
    add_device(home.path(), "10", "0", &[]);
    add_device(home.path(), "20", "0", &["--type", "switch"]);
    sodo_cmd(home.path())
        .args(["-o", "plain", "bom"])
        .assert()
        .success()
        .stdout(predicate::str::diff("switch\t2\ndome-camera\t1\n"));
}

#[test]
fn test_export_to_stdout_uses_legacy_field_names() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .args(["project", "rename", "Kho A"])
        .assert()
        .success();
    sodo_cmd(home.path())
        .args(["project", "export", "-f", "-"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"projectName\": \"Kho A\"")
                .and(predicate::str::contains("\"cameras\""))
                .and(predicate::str::contains("\"lastUpdated\"")),
        );
}

#[test]
fn test_import_replaces_project() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("import.json");
    std::fs::write(
        &file,
        r#"{"projectName":"Nhập","floorPlanImage":null,"cameras":[{"id":"cam_1","name":"A","type":"Router","x":1,"y":2}],"lastUpdated":"2024-05-01T00:00:00.000Z"}"#,
    )
    .unwrap();
    sodo_cmd(home.path())
        .args(["project", "import"])
        .arg(&file)
        .assert()
        .success();
    sodo_cmd(home.path())
        .args(["-o", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("cam_1\n"));
}

#[test]
fn test_shared_project_is_read_only() {
    let home = TempDir::new().unwrap();
    add_device(home.path(), "5", "5", &[]);
    let output = sodo_cmd(home.path()).arg("share").output().unwrap();
    assert!(output.status.success());
    let link = String::from_utf8(output.stdout).unwrap().trim().to_owned();
    assert!(link.starts_with("https://sodo.local/#share="), "{link}");

    sodo_cmd(home.path())
        .args(["--share", &link, "devices", "add", "--x", "1", "--y", "1"])
        .assert()
        .code(5);
    sodo_cmd(home.path())
        .args(["--share", &link, "-o", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("cam_"));
}

#[test]
fn test_malformed_share_falls_back_to_saved_project() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .args(["--share", "#share=%%%", "devices", "add", "--x", "1", "--y", "1"])
        .assert()
        .success();
}

// ── Floor plan & render ─────────────────────────────────────────────

#[test]
fn test_unsupported_floor_plan_exits_import_failure() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("notes.txt");
    std::fs::write(&file, "just text").unwrap();
    sodo_cmd(home.path())
        .args(["floorplan", "set"])
        .arg(&file)
        .assert()
        .code(6);
}

#[test]
fn test_svg_floor_plan_is_stored_unmeasured() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("tang1.svg");
    std::fs::write(
        &file,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300"/>"#,
    )
    .unwrap();
    sodo_cmd(home.path())
        .args(["floorplan", "set"])
        .arg(&file)
        .assert()
        .success();
    sodo_cmd(home.path())
        .args(["-o", "plain", "floorplan", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown size"));
}

#[test]
fn test_render_writes_png() {
    let home = TempDir::new().unwrap();
    add_device(home.path(), "100", "100", &[]);
    let out = home.path().join("plan.png");
    sodo_cmd(home.path())
        .args(["render", "--no-labels", "-f"])
        .arg(&out)
        .assert()
        .success();
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .args(["-y", "config", "init"])
        .assert()
        .success();
    assert!(home.path().join("config.toml").exists());
    sodo_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("range_policy = \"strict\""));
}

#[test]
fn test_config_path_honours_env() {
    let home = TempDir::new().unwrap();
    sodo_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
