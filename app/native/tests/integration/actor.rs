//! The shell actor driven from async code.

use std::time::Duration;

use ivi_shell_lib::config::ShellConfig;
use ivi_shell_lib::modules::shell::outputs::SimulatedHeads;
use ivi_shell_lib::modules::shell::policy::{ClientInfo, STATE_START};
use ivi_shell_lib::modules::shell::state::{OutputId, Rect, SurfaceId};
use ivi_shell_lib::modules::shell::{
    RecordingExecutor, ShellActor, ShellActorHandle, ShellEffect, ShellMessage, ShellQuery,
};

use crate::common::*;

fn spawn(config: &ShellConfig) -> (ShellActorHandle, RecordingExecutor) {
    let recorder = RecordingExecutor::new();
    let handle =
        ShellActor::spawn(config, Box::new(SimulatedHeads::new()), Box::new(recorder.clone()));
    (handle, recorder)
}

async fn boot(handle: &ShellActorHandle) -> OutputId {
    handle.send_async(ShellMessage::HeadsChanged { heads: vec![head(1, OUTPUT)] }).await.unwrap();
    handle.bind_shell(ClientInfo::new(SHELL_CLIENT)).await.unwrap().unwrap();
    handle.send_async(ShellMessage::Ready).await.unwrap();

    let output = handle.query(ShellQuery::OutputByName { name: OUTPUT.into() }).await.unwrap();
    output.into_output().unwrap().id
}

async fn launch(handle: &ShellActorHandle, app_id: &str) -> SurfaceId {
    let surface = handle.surface_added(APP_CLIENT, Some(app_id.into())).await.unwrap().unwrap();
    handle
        .send_async(ShellMessage::SurfaceCommitted {
            surface,
            geometry: Rect::sized(1920, 1080),
            maximized: true,
        })
        .await
        .unwrap();
    surface
}

#[tokio::test]
async fn test_configured_rule_fires_on_state_change() {
    let config: ShellConfig = serde_json::from_str(
        r#"{ "policy": { "rules": [
            { "appId": "hvac", "state": "start", "event": "show", "output": "HDMI-A-1" }
        ] } }"#,
    )
    .unwrap();
    let (handle, _recorder) = spawn(&config);
    let output = boot(&handle).await;

    let hvac = launch(&handle, "hvac").await;
    let nav = launch(&handle, "nav").await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.rules.len(), 1);
    assert_eq!(snapshot.outputs.iter().find(|o| o.id == output).unwrap().active, Some(nav));

    let applied = handle.state_change(STATE_START).await.unwrap().unwrap();
    assert_eq!(applied, 1);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.current_state, STATE_START);
    assert_eq!(snapshot.outputs.iter().find(|o| o.id == output).unwrap().active, Some(hvac));
}

#[tokio::test]
async fn test_effects_reach_executor_in_order() {
    let (handle, recorder) = spawn(&ShellConfig::default());
    boot(&handle).await;
    recorder.drain();

    let nav = launch(&handle, "nav").await;
    assert!(handle.is_ready().await.unwrap());

    let effects = recorder.effects();
    let maximize = effects
        .iter()
        .position(|e| matches!(e, ShellEffect::SetMaximized { surface, .. } if *surface == nav));
    let insert = effects.iter().position(|e| matches!(e, ShellEffect::InsertIntoLayer { .. }));
    assert!(maximize.unwrap() < insert.unwrap());
}

#[tokio::test]
async fn test_find_app_query() {
    let (handle, _recorder) = spawn(&ShellConfig::default());
    boot(&handle).await;
    let nav = launch(&handle, "nav").await;

    let found = handle.query(ShellQuery::FindApp { app_id: "nav".into() }).await.unwrap();
    assert_eq!(found.into_surface_id(), Some(nav));
    let missing = handle.query(ShellQuery::FindApp { app_id: "radio".into() }).await.unwrap();
    assert_eq!(missing.into_surface_id(), None);
}

#[tokio::test]
async fn test_requests_fail_after_shutdown() {
    let (handle, _recorder) = spawn(&ShellConfig::default());
    handle.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(handle.is_ready().await.is_err());
}
