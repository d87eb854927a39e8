//! Loading configuration files from disk.

use std::fs;

use ivi_shell_lib::config::{
    ConfigError, PolicyEngineKind, ShellConfig, Transform, load_config_from_path,
};

fn write(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.jsonc");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_loads_jsonc_with_comments() {
    let (_dir, path) = write(
        r#"{
          // cluster display runs deny-all
          "policy": {
            "engine": "deny-all",
            "permittedApps": ["cluster", "hvac"],
            /* extra state for the parked gear */
            "states": [{ "value": 8, "name": "parked" }],
            "rules": [
              { "appId": "hvac", "state": "parked", "event": "show", "timeoutMs": 250,
                "output": "HDMI-A-1" }
            ]
          },
          "outputs": [
            { "name": "HDMI-A-1", "transform": "90", "scale": 2 },
            { "name": "HDMI-A-2", "sameAs": "HDMI-A-1" }
          ],
          "shellClient": { "command": "/usr/bin/homescreen" }
        }"#,
    );

    let (config, loaded_from) = load_config_from_path(&path).unwrap();
    assert_eq!(loaded_from, path);
    assert_eq!(config.policy.engine, PolicyEngineKind::DenyAll);
    assert_eq!(config.policy.rules[0].timeout_ms, 250);
    assert_eq!(config.outputs[0].transform(), Transform::Rotate90);
    assert_eq!(config.outputs[0].scale, 2);
    assert_eq!(config.shell_client.command.as_deref(), Some("/usr/bin/homescreen"));
    assert!(config.core.activate_by_default);
    config.validate().unwrap();
}

#[test]
fn test_empty_object_is_default() {
    let (_dir, path) = write("{}");
    let (config, _) = load_config_from_path(&path).unwrap();
    assert_eq!(config, ShellConfig::default());
}

#[test]
fn test_invalid_json_is_parse_error() {
    let (_dir, path) = write(r#"{ "outputs": [ }"#);
    assert!(matches!(load_config_from_path(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config_from_path(&dir.path().join("absent.jsonc"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_dangling_same_as_fails_validation() {
    let (_dir, path) = write(r#"{ "outputs": [{ "name": "HDMI-A-2", "sameAs": "DP-1" }] }"#);
    let (config, _) = load_config_from_path(&path).unwrap();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("unknown output 'DP-1'"));
}

#[test]
fn test_rule_with_unknown_state_fails_validation() {
    let (_dir, path) = write(
        r#"{ "policy": { "rules": [
            { "appId": "hvac", "state": "parked", "event": "show", "output": "A" }
        ] } }"#,
    );
    let (config, _) = load_config_from_path(&path).unwrap();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("hvac"));
}
