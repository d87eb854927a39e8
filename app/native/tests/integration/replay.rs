//! Replaying scripted sessions from disk.

use std::fs;

use ivi_shell_lib::cli::{load_script, run_script};
use ivi_shell_lib::modules::shell::ShellEvent;
use ivi_shell_lib::modules::shell::state::AppState;

const SCRIPT: &str = r#"{
  // two outputs, the second one smaller
  "config": { "outputs": [{ "name": "HDMI-A-2", "appId": "cluster" }] },
  "headSizes": [{ "head": 2, "width": 1280, "height": 720 }],
  "steps": [
    { "op": "heads", "heads": [
        { "id": 1, "name": "HDMI-A-1", "connected": true },
        { "id": 2, "name": "HDMI-A-2", "connected": true }
    ] },
    { "op": "bindShell", "client": 1 },
    { "op": "bindDesktop", "client": 2 },
    { "op": "surface", "name": "panel", "client": 1 },
    { "op": "setPanel", "surface": "panel", "output": "HDMI-A-1", "edge": 1 },
    { "op": "commit", "surface": "panel", "width": 1920, "height": 64 },
    { "op": "surface", "name": "bg", "client": 1 },
    { "op": "setBackground", "surface": "bg", "output": "HDMI-A-1" },
    { "op": "commit", "surface": "bg", "fill": true, "maximized": true },
    { "op": "ready" },
    { "op": "surface", "name": "nav", "client": 3, "appId": "navigation" },
    { "op": "commit", "surface": "nav", "width": 1920, "height": 1016, "maximized": true },
    { "op": "deactivateApp", "appId": "navigation" }
  ]
}"#;

#[test]
fn test_replay_script_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.jsonc");
    fs::write(&path, SCRIPT).unwrap();

    let report = run_script(load_script(&path).unwrap()).unwrap();

    assert_eq!(report.failures().count(), 0, "{:?}", report.steps);
    let snapshot = &report.snapshot;
    assert!(snapshot.ready);
    assert_eq!(snapshot.outputs.len(), 2);

    let main = snapshot.outputs.iter().find(|o| o.name == "HDMI-A-1").unwrap();
    assert_eq!((main.area.width, main.area.height), (1920, 1016));
    let cluster = snapshot.outputs.iter().find(|o| o.name == "HDMI-A-2").unwrap();
    assert_eq!((cluster.geometry.x, cluster.geometry.width), (1920, 1280));

    let states: Vec<AppState> = report
        .events
        .iter()
        .filter_map(|e| match &e.event {
            ShellEvent::StateApp { app_id, state, .. } if app_id == "navigation" => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(states, vec![AppState::Deactivated]);
}

#[test]
fn test_malformed_script_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jsonc");
    fs::write(&path, r#"{ "steps": [{ "op": "teleport" }] }"#).unwrap();

    let err = load_script(&path).unwrap_err();
    assert!(err.to_string().contains("Script error"));
}
