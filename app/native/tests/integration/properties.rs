//! Layout and policy laws that must hold for any sequence of requests.

use ivi_shell_lib::modules::shell::policy::{EVENT_SHOW, PolicyError, STATE_START};
use ivi_shell_lib::modules::shell::state::{AppRole, PanelEdge, Rect, RoleKind, ViewId};
use ivi_shell_lib::modules::shell::{ShellEffect, ShellError};

use crate::common::*;

#[test]
fn test_panel_thickness_accounts_for_lost_area() {
    let mut harness = Harness::headless();
    harness.bind_shell();
    let output = harness.connect(1, OUTPUT);

    let panels = [
        (PanelEdge::Top, Rect::sized(1920, 40)),
        (PanelEdge::Bottom, Rect::sized(1920, 60)),
        (PanelEdge::Left, Rect::sized(100, 980)),
        (PanelEdge::Right, Rect::sized(120, 980)),
    ];
    for (edge, geometry) in panels {
        let id = harness.shell.surface_added(SHELL_CLIENT, None).unwrap();
        harness.shell.set_panel(id, output, edge as u32).unwrap();
        harness.shell.surface_committed(id, geometry, false).unwrap();
    }
    harness.background(output);
    harness.shell.ready().unwrap();

    let out = harness.shell.output(output).unwrap();
    assert!(out.geometry.contains(&out.area));
    assert_eq!(out.geometry.height - out.area.height, 40 + 60);
    assert_eq!(out.geometry.width - out.area.width, 100 + 120);
    assert_eq!((out.area.x, out.area.y), (100, 40));
}

#[test]
fn test_role_is_assigned_once() {
    let (mut harness, output) = Harness::boot();
    let nav = harness.launch("nav");

    let err = harness.shell.set_panel(nav, output, PanelEdge::Bottom as u32).unwrap_err();
    assert!(err.to_string().contains("already has another ivi role"));
    assert_eq!(harness.shell.surface(nav).unwrap().kind(), RoleKind::Desktop);
    assert_eq!(harness.shell.output(output).unwrap().panel(PanelEdge::Bottom), None);
}

#[test]
fn test_recommit_does_not_relink_view() {
    let (mut harness, output) = Harness::boot();
    let nav = harness.launch("nav");
    harness.shell.take_effects();

    let area = harness.area(output);
    harness.shell.surface_committed(nav, Rect::sized(area.width, area.height), true).unwrap();

    let effects = harness.shell.take_effects();
    assert!(!effects.iter().any(|e| matches!(e, ShellEffect::InsertIntoLayer { .. })));
    assert_eq!(harness.shell.layers().link_count(ViewId::Surface(nav)), 1);
    assert_eq!(harness.active(output), Some(nav));
}

#[test]
fn test_split_round_trip_survives_resizes() {
    let (mut harness, output) = Harness::boot();
    let home = harness.launch("home");
    let before = harness.area(output);

    harness
        .shell
        .set_app_property("nav", AppRole::SplitVertical as u32, 0, 0, Rect::zero(), output)
        .unwrap();
    let nav = harness.shell.surface_added(APP_CLIENT, Some("nav".into())).unwrap();
    for width in [960, 900, 1000, 960] {
        harness.shell.surface_committed(nav, Rect::sized(width, 1080), false).unwrap();
        harness.shell.surface_committed(home, Rect::sized(960, 1080), true).unwrap();
    }
    assert_eq!(harness.area(output).width, 960);

    harness.shell.surface_removed(nav);
    assert_eq!(harness.area(output), before);
}

#[test]
fn test_popup_request_beats_split_request() {
    let (mut harness, output) = Harness::boot();
    let split = AppRole::SplitVertical as u32;
    let popup = AppRole::Popup as u32;
    harness.shell.set_app_property("dlg", split, 0, 0, Rect::zero(), output).unwrap();
    harness.shell.set_app_property("dlg", popup, 40, 30, Rect::zero(), output).unwrap();

    let dlg = harness.shell.surface_added(APP_CLIENT, Some("dlg".into())).unwrap();
    harness.shell.surface_committed(dlg, Rect::sized(400, 300), false).unwrap();

    let surface = harness.shell.surface(dlg).unwrap();
    assert_eq!(surface.kind(), RoleKind::Popup);
    assert_eq!((surface.view.position.x, surface.view.position.y), (40, 30));
}

#[test]
fn test_same_state_change_is_rejected() {
    let (mut harness, output) = Harness::boot();
    let hvac = harness.launch("hvac");
    harness.launch("nav");
    harness.shell.policy_add("hvac", STATE_START, EVENT_SHOW, 0, OUTPUT).unwrap();

    assert_eq!(harness.shell.state_change(STATE_START).unwrap(), 1);
    assert_eq!(harness.active(output), Some(hvac));

    let err = harness.shell.state_change(STATE_START).unwrap_err();
    assert!(matches!(err, ShellError::Policy(PolicyError::SameState(_))));
}
