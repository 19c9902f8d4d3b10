//! Configuration loading tests

use modloom_config::{ConfigError, ConfigLoader, ModSettings, CONFIG_FILE_NAME};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> std::path::PathBuf {
    let config_path = dir.join(CONFIG_FILE_NAME);
    fs::write(&config_path, content).unwrap();
    config_path
}

#[test]
fn test_full_config() {
    let temp_dir = TempDir::new().unwrap();
    let content = r#"
[loader]
host-assets-dir = "game/assets"
mods-dirs = ["game/assets/mods", "mods"]
scheme = "pkg"
runtime-package = "my-runtime"
manifest-file = "package.json"

[host]
id = "game"
version = "1.3.0-5"

[lang]
default-locale = "de_DE"
fallback = false
"#;
    let path = create_config_file(temp_dir.path(), content);

    let config = ConfigLoader::without_env().load_from_file(&path).unwrap();

    assert_eq!(config.host_assets_dir(), "game/assets");
    assert_eq!(
        config.mods_dirs(),
        vec!["game/assets/mods".to_string(), "mods".to_string()]
    );
    assert_eq!(config.scheme(), "pkg");
    assert_eq!(config.runtime_package(), "my-runtime");
    assert_eq!(config.manifest_file(), "package.json");
    assert_eq!(config.host_id(), "game");
    assert_eq!(config.host_version().unwrap().to_string(), "1.3.0-5");
    assert_eq!(config.default_locale(), "de_DE");
    assert!(!config.lang_fallback());
}

#[test]
fn test_missing_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::without_env().load_from_file(&temp_dir.path().join("nope.toml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_invalid_toml_reports_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[loader\n");

    match ConfigLoader::without_env().load_from_file(&path) {
        Err(ConfigError::TomlParseError { file, .. }) => assert_eq!(file, path),
        other => panic!("expected TOML parse error, got {:?}", other),
    }
}

#[test]
fn test_settings_file_is_malformed() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mod-settings.json");
    fs::write(&path, "not json").unwrap();

    assert!(matches!(
        ModSettings::load(&path),
        Err(ConfigError::SettingsParseError { .. })
    ));
}
