//! End-to-end layout and policy scenarios.
//!
//! Each test walks one complete interaction: static layout with a panel,
//! an active app exiting, a split application coming and going, immediate
//! and deferred policy rules, and a rejected second panel.

use ivi_shell_lib::modules::shell::{ShellEffect, ShellError};
use ivi_shell_lib::modules::shell::error::ProtocolErrorCode;
use ivi_shell_lib::modules::shell::policy::{EVENT_SHOW, STATE_START, STATE_STOP};
use ivi_shell_lib::modules::shell::state::{
    AppRole, Layer, OutputId, PanelEdge, Rect, RoleKind, ViewId,
};

use crate::common::*;

/// Bound shell with one output carrying a 48px top panel and a background.
fn panel_and_background() -> (Harness, OutputId) {
    let mut harness = Harness::headless();
    harness.bind_shell();
    let output = harness.connect(1, OUTPUT);

    let panel = harness.shell.surface_added(SHELL_CLIENT, Some("panel".into())).unwrap();
    harness.shell.set_panel(panel, output, PanelEdge::Top as u32).unwrap();
    harness.shell.surface_committed(panel, Rect::sized(1920, 48), false).unwrap();
    harness.background(output);

    (harness, output)
}

// ============================================================================
// Static layout
// ============================================================================

#[test]
fn test_top_panel_shrinks_usable_area() {
    let (mut harness, output) = panel_and_background();
    harness.shell.ready().unwrap();

    assert_eq!(harness.area(output), Rect::new(0, 48, 1920, 1032));

    let out = harness.shell.output(output).unwrap();
    let background = ViewId::Surface(out.background.unwrap());
    let panel = ViewId::Surface(out.panel(PanelEdge::Top).unwrap());
    assert_eq!(harness.shell.layers().layer_of(background), Some(Layer::Background));
    assert_eq!(harness.shell.layers().layer_of(panel), Some(Layer::Panel));
    assert!(!out.placeholder_mapped);
}

#[test]
fn test_desktop_app_sized_to_usable_area() {
    let (mut harness, output) = panel_and_background();
    harness.shell.ready().unwrap();
    harness.shell.take_effects();

    let nav = harness.shell.surface_added(APP_CLIENT, Some("nav".into())).unwrap();
    let effects = harness.shell.take_effects();
    assert_eq!(sizes_for(&effects, nav), vec![(1920, 1032)]);

    harness.shell.surface_committed(nav, Rect::sized(1920, 1032), true).unwrap();
    assert_eq!(harness.active(output), Some(nav));
    let view = &harness.shell.surface(nav).unwrap().view;
    assert!(view.mapped);
    assert_eq!((view.position.x, view.position.y), (0, 48));
}

// ============================================================================
// App exit
// ============================================================================

#[test]
fn test_exit_of_active_app_restores_previous() {
    let (mut harness, output) = Harness::boot();
    let nav = harness.launch("nav");
    let music = harness.launch("music");
    assert_eq!(harness.active(output), Some(music));
    assert_eq!(harness.shell.output(output).unwrap().previous_active, Some(nav));

    harness.shell.surface_removed(music);

    assert_eq!(harness.active(output), Some(nav));
    assert!(harness.shell.surface(nav).unwrap().view.mapped);
    assert_eq!(harness.shell.layers().layer_of(ViewId::Surface(nav)), Some(Layer::Normal));
    assert_eq!(harness.shell.output(output).unwrap().previous_active, None);
}

#[test]
fn test_exit_of_only_app_falls_back_to_background() {
    let (mut harness, output) = Harness::boot();
    let nav = harness.launch("nav");
    assert_eq!(harness.active(output), Some(nav));

    harness.shell.surface_removed(nav);

    assert_eq!(harness.active(output), None);
    assert!(harness.shell.output(output).unwrap().background.is_some());
}

// ============================================================================
// Split
// ============================================================================

#[test]
fn test_vertical_split_halves_and_restores_area() {
    let (mut harness, output) = panel_and_background();
    harness.shell.ready().unwrap();
    let home = harness.launch("home");
    harness.shell.take_effects();

    let queued = harness
        .shell
        .set_app_property("nav", AppRole::SplitVertical as u32, 0, 0, Rect::zero(), output)
        .unwrap();
    assert!(queued);

    let nav = harness.shell.surface_added(APP_CLIENT, Some("nav".into())).unwrap();
    harness.shell.surface_committed(nav, Rect::sized(960, 1032), false).unwrap();
    let effects = harness.shell.take_effects();

    assert_eq!(harness.shell.surface(nav).unwrap().kind(), RoleKind::SplitVertical);
    assert_eq!(sizes_for(&effects, nav), vec![(960, 1032)]);
    assert_eq!(sizes_for(&effects, home), vec![(960, 1032)]);
    assert_eq!(harness.area(output).width, 960);

    let home_view = &harness.shell.surface(home).unwrap().view;
    assert_eq!(home_view.position.x, 0);
    let nav_view = &harness.shell.surface(nav).unwrap().view;
    assert_eq!((nav_view.position.x, nav_view.position.y), (960, 48));

    harness.shell.surface_removed(nav);
    let effects = harness.shell.take_effects();
    assert_eq!(sizes_for(&effects, home), vec![(1920, 1032)]);
    assert_eq!(harness.area(output), Rect::new(0, 48, 1920, 1032));
}

#[test]
fn test_horizontal_split_takes_top_half() {
    let (mut harness, output) = Harness::boot();
    harness.launch("home");
    harness
        .shell
        .set_app_property("cam", AppRole::SplitHorizontal as u32, 0, 0, Rect::zero(), output)
        .unwrap();

    let cam = harness.shell.surface_added(APP_CLIENT, Some("cam".into())).unwrap();
    harness.shell.surface_committed(cam, Rect::sized(1920, 540), false).unwrap();

    assert_eq!(harness.area(output), Rect::new(0, 540, 1920, 540));
    let view = &harness.shell.surface(cam).unwrap().view;
    assert_eq!((view.position.x, view.position.y), (0, 0));
}

// ============================================================================
// Policy rules
// ============================================================================

#[test]
fn test_immediate_rule_activates_synchronously() {
    let (mut harness, output) = Harness::boot();
    let hvac = harness.launch("hvac");
    let nav = harness.launch("nav");
    assert_eq!(harness.active(output), Some(nav));

    harness.shell.policy_add("hvac", STATE_START, EVENT_SHOW, 0, OUTPUT).unwrap();
    let applied = harness.shell.state_change(STATE_START).unwrap();

    assert_eq!(applied, 1);
    assert_eq!(harness.active(output), Some(hvac));
    assert_eq!(harness.timers.armed_len(), 0);
}

#[test]
fn test_deferred_rule_waits_for_timer() {
    let (mut harness, output) = Harness::boot();
    let hvac = harness.launch("hvac");
    let nav = harness.launch("nav");

    harness.shell.policy_add("hvac", STATE_START, EVENT_SHOW, 500, OUTPUT).unwrap();
    assert_eq!(harness.shell.state_change(STATE_START).unwrap(), 0);
    assert_eq!(harness.active(output), Some(nav));

    assert_eq!(harness.advance(100), 0);
    harness.shell.state_change(STATE_STOP).unwrap();
    assert_eq!(harness.active(output), Some(nav));

    assert_eq!(harness.advance(400), 1);
    assert_eq!(harness.active(output), Some(hvac));
}

#[test]
fn test_rule_for_unknown_output_rejected() {
    let (mut harness, _) = Harness::boot();
    let err = harness.shell.policy_add("hvac", STATE_START, EVENT_SHOW, 0, "DP-9").unwrap_err();
    assert!(err.to_string().contains("DP-9"));
}

// ============================================================================
// Protocol errors
// ============================================================================

#[test]
fn test_second_panel_on_same_edge_rejected() {
    let (mut harness, output) = panel_and_background();
    let first = harness.shell.output(output).unwrap().panel(PanelEdge::Top);
    harness.shell.take_effects();

    let second = harness.shell.surface_added(SHELL_CLIENT, Some("panel-2".into())).unwrap();
    let err = harness.shell.set_panel(second, output, PanelEdge::Top as u32).unwrap_err();

    assert!(matches!(
        err,
        ShellError::Protocol { code: ProtocolErrorCode::BackgroundExists, .. }
    ));
    assert_eq!(harness.shell.output(output).unwrap().panel(PanelEdge::Top), first);
    assert_eq!(harness.shell.surface(second).unwrap().kind(), RoleKind::None);
    let effects = harness.shell.take_effects();
    assert!(effects.iter().any(|e| matches!(e, ShellEffect::ProtocolError { .. })));
}
