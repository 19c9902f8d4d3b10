//! End-to-end tests of the modloom binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Host "game" 1.3.0 with three mods: base, addon (needs base), broken (needs a missing mod)
fn create_game(root: &Path) {
    write(
        root,
        "modloom.toml",
        r#"[loader]
settings-file = "mod-settings.json"

[host]
id = "game"
version = "1.3.0"
"#,
    );
    write(root, "assets/data/items.json", r#"{"sword":{"atk":1,"def":1}}"#);
    write(root, "assets/media/icon.png", "host icon");

    write(
        root,
        "assets/mods/base/mod.json",
        r#"{"id":"base","version":"1.0.0","dependencies":{"game":"^1.0.0"}}"#,
    );
    write(
        root,
        "assets/mods/base/assets/data/items.json.patch",
        r#"{"sword":{"atk":5}}"#,
    );

    write(
        root,
        "assets/mods/addon/mod.json",
        r#"{"id":"addon","version":"0.2.0","dependencies":{"base":"^1.0.0"}}"#,
    );
    write(root, "assets/mods/addon/assets/media/icon.png", "addon icon");

    write(
        root,
        "assets/mods/broken/mod.json",
        r#"{"id":"broken","version":"1.0.0","dependencies":{"missing":"1.0.0"}}"#,
    );
}

fn modloom(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("modloom").unwrap();
    cmd.arg("--config")
        .arg(root.join("modloom.toml"))
        .env_remove("MODLOOM_CONFIG")
        .env_remove("MODLOOM_HOST_ASSETS_DIR")
        .env_remove("MODLOOM_MODS_DIRS")
        .env_remove("MODLOOM_HOST_VERSION")
        .env_remove("MODLOOM_SETTINGS_FILE")
        .env("RUST_LOG", "warn");
    cmd
}

fn order_json(root: &Path) -> serde_json::Value {
    let output = modloom(root).args(["order", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Order
// ============================================================================

#[test]
fn test_order_lists_load_order_and_exclusions() {
    let temp = TempDir::new().unwrap();
    create_game(temp.path());

    modloom(temp.path())
        .arg("order")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. base 1.0.0"))
        .stdout(predicate::str::contains("2. addon 0.2.0"))
        .stdout(predicate::str::contains("Could not load 'broken'"))
        .stdout(predicate::str::contains("package 'missing' is not installed"));
}

#[test]
fn test_order_json() {
    let temp = TempDir::new().unwrap();
    create_game(temp.path());

    let output = order_json(temp.path());
    let ids: Vec<&str> = output["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["base", "addon"]);
    assert_eq!(output["excluded"][0]["id"], "broken");
    assert_eq!(output["errors"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Resolve / Load
// ============================================================================

#[test]
fn test_resolve_override() {
    let temp = TempDir::new().unwrap();
    create_game(temp.path());

    modloom(temp.path())
        .args(["resolve", "/media/icon.png"])
        .assert()
        .success()
        .stdout("assets/mods/addon/assets/media/icon.png\n");

    modloom(temp.path())
        .args(["resolve", "media/icon.png", "--no-overrides"])
        .assert()
        .success()
        .stdout("assets/media/icon.png\n");
}

#[test]
fn test_resolve_unknown_package_fails() {
    let temp = TempDir::new().unwrap();
    create_game(temp.path());

    modloom(temp.path())
        .args(["resolve", "mod://nope/x.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package 'nope' not found"));
}

#[test]
fn test_load_applies_patch_scripts() {
    let temp = TempDir::new().unwrap();
    create_game(temp.path());

    let output = modloom(temp.path())
        .args(["load", "data/items.json", "--compact"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["sword"]["atk"], 5);
    assert_eq!(document["sword"]["def"], 1);
}

// ============================================================================
// Enable / Disable
// ============================================================================

#[test]
fn test_disable_excludes_dependants() {
    let temp = TempDir::new().unwrap();
    create_game(temp.path());

    modloom(temp.path())
        .args(["disable", "base"])
        .assert()
        .success()
        .stdout("disabled base\n");
    assert!(temp.path().join("mod-settings.json").exists());

    let output = order_json(temp.path());
    assert_eq!(output["order"].as_array().unwrap().len(), 0);
    let excluded: Vec<&str> = output["excluded"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert!(excluded.contains(&"base"));
    assert!(excluded.contains(&"addon"));

    modloom(temp.path())
        .args(["enable", "base"])
        .assert()
        .success();
    let output = order_json(temp.path());
    assert_eq!(output["order"].as_array().unwrap().len(), 2);
}

#[test]
fn test_disabled_patch_is_not_applied() {
    let temp = TempDir::new().unwrap();
    create_game(temp.path());

    modloom(temp.path()).args(["disable", "base"]).assert().success();

    let output = modloom(temp.path())
        .args(["load", "data/items.json", "--compact"])
        .output()
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["sword"]["atk"], 1);
}
