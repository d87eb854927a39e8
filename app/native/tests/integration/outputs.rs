//! Head hotplug through the shell: cloning, eviction, layout and removal.

use ivi_shell_lib::config::ShellConfig;
use ivi_shell_lib::modules::shell::outputs::SimulatedHeads;
use ivi_shell_lib::modules::shell::state::{HeadId, Rect, RoleKind};

use crate::common::*;

fn config(json: &str) -> ShellConfig { serde_json::from_str(json).unwrap() }

#[test]
fn test_heads_laid_out_left_to_right() {
    let mut backend = SimulatedHeads::new();
    backend.sizes.insert(HeadId(2), (1280, 720));
    let mut harness = Harness::new(&ShellConfig::default(), backend);

    let first = harness.connect(1, "HDMI-A-1");
    let second = harness.connect(2, "HDMI-A-2");

    assert_eq!(harness.shell.output(first).unwrap().geometry, Rect::new(0, 0, 1920, 1080));
    assert_eq!(harness.shell.output(second).unwrap().geometry, Rect::new(1920, 0, 1280, 720));
    assert_eq!(harness.shell.outputs().default_output(), Some(first));
}

#[test]
fn test_incompatible_clone_is_evicted() {
    let config = config(
        r#"{ "outputs": [
            { "name": "A" },
            { "name": "B", "sameAs": "A" },
            { "name": "C", "sameAs": "B" }
        ] }"#,
    );
    let mut backend = SimulatedHeads::new();
    backend.incompatible.insert(HeadId(3));
    let mut harness = Harness::new(&config, backend);

    let report = harness.shell.heads_changed(&[head(1, "A"), head(2, "B"), head(3, "C")]);

    assert_eq!(report.enabled.len(), 1);
    assert!(report.failed.is_empty());
    let output = harness.shell.output(report.enabled[0].0).unwrap();
    assert_eq!(output.name, "A");
    assert_eq!(output.heads.as_slice(), &[HeadId(1), HeadId(2)]);
    assert!(!harness.shell.init_failed());
}

#[test]
fn test_refused_head_marks_init_failed() {
    let mut backend = SimulatedHeads::new();
    backend.refuse_attach.insert(HeadId(1));
    let mut harness = Harness::new(&ShellConfig::default(), backend);

    let report = harness.shell.heads_changed(&[head(1, OUTPUT)]);
    assert_eq!(report.failed.len(), 1);
    assert!(harness.shell.init_failed());
}

#[test]
fn test_mode_off_keeps_head_disabled() {
    let config = config(r#"{ "outputs": [{ "name": "HDMI-A-1", "mode": "off" }] }"#);
    let mut harness = Harness::new(&config, SimulatedHeads::new());

    let report = harness.shell.heads_changed(&[head(1, OUTPUT)]);
    assert!(report.enabled.is_empty());
    assert!(harness.shell.outputs().iter().all(|o| !o.enabled));
}

#[test]
fn test_hotplugged_output_after_ready_gets_placeholder() {
    let (mut harness, _) = Harness::boot();
    let second = harness.connect(2, "HDMI-A-2");

    let out = harness.shell.output(second).unwrap();
    assert!(out.enabled);
    assert!(out.placeholder_mapped);
    assert_eq!(out.area, Rect::sized(1920, 1080));
}

#[test]
fn test_unplugged_head_disables_output() {
    let (mut harness, output) = Harness::boot();

    let mut gone = head(1, OUTPUT);
    gone.connected = false;
    gone.enabled = true;
    let report = harness.shell.heads_changed(&[gone]);

    assert_eq!(report.disabled, vec![output]);
    let out = harness.shell.output(output).unwrap();
    assert!(!out.enabled);
    assert!(!out.placeholder_mapped);
}

#[test]
fn test_pinned_app_lands_on_its_output() {
    let config = config(
        r#"{ "outputs": [
            { "name": "HDMI-A-1" },
            { "name": "HDMI-A-2", "appId": "cluster" }
        ] }"#,
    );
    let mut harness = Harness::new(&config, SimulatedHeads::new());
    harness.bind_shell();
    let main = harness.connect(1, "HDMI-A-1");
    let pinned = harness.connect(2, "HDMI-A-2");
    harness.background(main);
    harness.background(pinned);
    harness.shell.ready().unwrap();

    let cluster = harness.launch("cluster");

    assert_eq!(harness.shell.surface(cluster).unwrap().kind(), RoleKind::Remote);
    assert_eq!(harness.active(pinned), Some(cluster));
    assert_eq!(harness.active(main), None);
}
