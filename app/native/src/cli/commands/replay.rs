//! Replay CLI command.
//!
//! Drives a headless shell through a scripted sequence of head, surface,
//! shell and policy requests, then prints the resulting outputs, surfaces
//! and client events. Timers run on a virtual clock advanced by the script.
//!
//! ```jsonc
//! {
//!   "headSizes": [{ "head": 1, "width": 1920, "height": 1080 }],
//!   "steps": [
//!     { "op": "heads", "heads": [{ "id": 1, "name": "HDMI-A-1", "connected": true }] },
//!     { "op": "bindShell", "client": 1 },
//!     { "op": "surface", "name": "bg", "client": 1, "appId": "background" },
//!     { "op": "setBackground", "surface": "bg", "output": "HDMI-A-1" },
//!     { "op": "commit", "surface": "bg", "fill": true, "maximized": true },
//!     { "op": "ready" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config::{self, ShellConfig};
use crate::error::IviShellError;
use crate::modules::shell::effects::{EffectExecutor, RecordingExecutor, ShellEffect, ShellEvent};
use crate::modules::shell::outputs::{HeadStatus, SimulatedHeads};
use crate::modules::shell::policy::{ClientInfo, ManualTimers, PolicyEngine};
use crate::modules::shell::state::{ClientId, HeadId, OutputId, Rect, SurfaceId};
use crate::modules::shell::{Shell, ShellResult, ShellSnapshot};

/// Arguments of the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Script to replay (JSONC).
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Output in JSON format instead of tables.
    #[arg(long, short = 'j')]
    pub json: bool,
}

// ============================================================================
// Script
// ============================================================================

/// Native size of a simulated head.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HeadSize {
    pub head: HeadId,
    pub width: i32,
    pub height: i32,
}

/// A replay script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplayScript {
    /// Configuration to use instead of the loaded one.
    pub config: Option<ShellConfig>,
    pub head_sizes: Vec<HeadSize>,
    pub steps: Vec<ReplayStep>,
}

/// One scripted request. Surfaces are referred to by script-local names,
/// outputs by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReplayStep {
    Heads {
        heads: Vec<HeadStatus>,
    },
    HeadDestroyed {
        head: HeadId,
    },
    BindShell {
        client: u32,
        #[serde(default)]
        label: Option<String>,
    },
    UnbindShell,
    BindDesktop {
        client: u32,
        #[serde(default)]
        label: Option<String>,
    },
    UnbindDesktop {
        client: u32,
    },
    Ready,
    Surface {
        name: String,
        client: u32,
        #[serde(default)]
        app_id: Option<String>,
    },
    SetAppId {
        surface: String,
        app_id: String,
    },
    /// Commit a size. `fill` commits the usable area of the surface's output
    /// (or of the default output).
    Commit {
        surface: String,
        #[serde(default)]
        width: i32,
        #[serde(default)]
        height: i32,
        #[serde(default)]
        maximized: bool,
        #[serde(default)]
        fill: bool,
    },
    Remove {
        surface: String,
    },
    SetBackground {
        surface: String,
        output: String,
    },
    SetPanel {
        surface: String,
        output: String,
        edge: u32,
    },
    ActivateApp {
        app_id: String,
        output: String,
        /// Use the desktop-protocol request, which also broadcasts.
        #[serde(default)]
        desktop: bool,
        #[serde(default)]
        data: Option<String>,
    },
    DeactivateApp {
        app_id: String,
    },
    SetAppProperty {
        app_id: String,
        role: u32,
        output: String,
        #[serde(default)]
        x: i32,
        #[serde(default)]
        y: i32,
        #[serde(default)]
        bounding_box: Rect,
    },
    PolicyAdd {
        app_id: String,
        state: String,
        event: String,
        #[serde(default)]
        timeout_ms: u32,
        output: String,
    },
    StateChange {
        state: String,
    },
    /// Advance the virtual clock, firing due policy timers.
    Advance {
        ms: u64,
    },
}

impl ReplayStep {
    /// Script name of the operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Heads { .. } => "heads",
            Self::HeadDestroyed { .. } => "headDestroyed",
            Self::BindShell { .. } => "bindShell",
            Self::UnbindShell => "unbindShell",
            Self::BindDesktop { .. } => "bindDesktop",
            Self::UnbindDesktop { .. } => "unbindDesktop",
            Self::Ready => "ready",
            Self::Surface { .. } => "surface",
            Self::SetAppId { .. } => "setAppId",
            Self::Commit { .. } => "commit",
            Self::Remove { .. } => "remove",
            Self::SetBackground { .. } => "setBackground",
            Self::SetPanel { .. } => "setPanel",
            Self::ActivateApp { .. } => "activateApp",
            Self::DeactivateApp { .. } => "deactivateApp",
            Self::SetAppProperty { .. } => "setAppProperty",
            Self::PolicyAdd { .. } => "policyAdd",
            Self::StateChange { .. } => "stateChange",
            Self::Advance { .. } => "advance",
        }
    }
}

/// Read a JSONC script from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> Result<ReplayScript, IviShellError> {
    let text = fs::read_to_string(path)?;
    let reader = json_comments::StripComments::new(text.as_bytes());
    serde_json::from_reader(reader).map_err(|err| {
        IviShellError::ScriptError(format!("failed to parse {}: {err}", path.display()))
    })
}

// ============================================================================
// Runner
// ============================================================================

/// Outcome of one step. `error` carries the shell error the step produced.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An event delivered to a client, tagged with the step that caused it.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub step: usize,
    pub client: ClientId,
    pub event: ShellEvent,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub steps: Vec<StepOutcome>,
    pub effects: usize,
    pub events: Vec<EventRecord>,
    pub snapshot: ShellSnapshot,
}

impl ReplayReport {
    /// Steps that failed.
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| s.error.is_some())
    }
}

struct Replay {
    shell: Shell,
    timers: ManualTimers,
    recorder: RecordingExecutor,
    executor: Box<dyn EffectExecutor>,
    surfaces: HashMap<String, SurfaceId>,
}

impl Replay {
    fn new(config: &ShellConfig, head_sizes: &[HeadSize]) -> Self {
        let timers = ManualTimers::new();
        let policy =
            PolicyEngine::from_config(&config.policy, &config.core, Box::new(timers.clone()));

        let mut backend = SimulatedHeads::new();
        for size in head_sizes {
            backend.sizes.insert(size.head, (size.width, size.height));
        }

        let recorder = RecordingExecutor::new();
        Self {
            shell: Shell::new(config, policy, Box::new(backend)),
            timers,
            executor: Box::new(recorder.clone()),
            recorder,
            surfaces: HashMap::new(),
        }
    }

    fn surface(&self, name: &str) -> Result<SurfaceId, IviShellError> {
        self.surfaces
            .get(name)
            .copied()
            .ok_or_else(|| IviShellError::ScriptError(format!("unknown surface '{name}'")))
    }

    fn output(&self, name: &str) -> Result<OutputId, IviShellError> {
        self.shell
            .outputs()
            .by_name(name)
            .map(|o| o.id)
            .ok_or_else(|| IviShellError::ScriptError(format!("unknown output '{name}'")))
    }

    fn vocabulary_value(&self, kind: &str, name: &str) -> Result<u32, IviShellError> {
        let vocabulary = self.shell.policy().rules().vocabulary();
        let value = match kind {
            "state" => vocabulary.state_by_name(name),
            _ => vocabulary.event_by_name(name),
        };
        value.map_err(|err| IviShellError::ScriptError(err.to_string()))
    }

    fn fill_size(&self, surface: SurfaceId) -> Result<(i32, i32), IviShellError> {
        let output = self
            .shell
            .surface(surface)
            .and_then(|s| s.view.output)
            .or_else(|| self.shell.outputs().default_output())
            .ok_or_else(|| IviShellError::ScriptError("no output to fill".to_string()))?;
        let area = self.shell.output(output).map(|o| o.area).unwrap_or_default();
        Ok(area.size())
    }

    /// Apply one step. The outer error aborts the replay; the inner one is
    /// the shell's answer to the request.
    #[allow(clippy::too_many_lines)]
    fn apply(&mut self, step: ReplayStep) -> Result<ShellResult<()>, IviShellError> {
        let result = match step {
            ReplayStep::Heads { heads } => {
                let report = self.shell.heads_changed(&heads);
                report.failed.into_iter().next().map_or(Ok(()), |(_, err)| Err(err))
            }
            ReplayStep::HeadDestroyed { head } => {
                self.shell.head_destroyed(head);
                Ok(())
            }
            ReplayStep::BindShell { client, label } => {
                self.shell.bind_shell(&client_info(client, label))
            }
            ReplayStep::UnbindShell => {
                self.shell.unbind_shell();
                Ok(())
            }
            ReplayStep::BindDesktop { client, label } => {
                self.shell.bind_desktop(&client_info(client, label))
            }
            ReplayStep::UnbindDesktop { client } => {
                self.shell.unbind_desktop(ClientId(client));
                Ok(())
            }
            ReplayStep::Ready => self.shell.ready(),
            ReplayStep::Surface { name, client, app_id } => {
                if self.surfaces.contains_key(&name) {
                    return Err(IviShellError::ScriptError(format!("surface '{name}' exists")));
                }
                self.shell.surface_added(ClientId(client), app_id).map(|id| {
                    self.surfaces.insert(name, id);
                })
            }
            ReplayStep::SetAppId { surface, app_id } => {
                let id = self.surface(&surface)?;
                self.shell.surface_set_app_id(id, &app_id)
            }
            ReplayStep::Commit { surface, width, height, maximized, fill } => {
                let id = self.surface(&surface)?;
                let (width, height) = if fill { self.fill_size(id)? } else { (width, height) };
                self.shell.surface_committed(id, Rect::sized(width, height), maximized)
            }
            ReplayStep::Remove { surface } => {
                let id = self.surface(&surface)?;
                self.surfaces.remove(&surface);
                self.shell.surface_removed(id);
                Ok(())
            }
            ReplayStep::SetBackground { surface, output } => {
                let (id, output) = (self.surface(&surface)?, self.output(&output)?);
                self.shell.set_background(id, output)
            }
            ReplayStep::SetPanel { surface, output, edge } => {
                let (id, output) = (self.surface(&surface)?, self.output(&output)?);
                self.shell.set_panel(id, output, edge)
            }
            ReplayStep::ActivateApp { app_id, output, desktop, data } => {
                let output = self.output(&output)?;
                if desktop {
                    self.shell.desktop_activate_app(&app_id, data.as_deref(), output)
                } else {
                    self.shell.activate_app(&app_id, output)
                }
            }
            ReplayStep::DeactivateApp { app_id } => {
                self.shell.deactivate_app(&app_id);
                Ok(())
            }
            ReplayStep::SetAppProperty { app_id, role, output, x, y, bounding_box } => {
                let output = self.output(&output)?;
                self.shell.set_app_property(&app_id, role, x, y, bounding_box, output).map(|_| ())
            }
            ReplayStep::PolicyAdd { app_id, state, event, timeout_ms, output } => {
                let state = self.vocabulary_value("state", &state)?;
                let event = self.vocabulary_value("event", &event)?;
                self.shell.policy_add(&app_id, state, event, timeout_ms, &output).map(|_| ())
            }
            ReplayStep::StateChange { state } => {
                let state = self.vocabulary_value("state", &state)?;
                self.shell.state_change(state).map(|_| ())
            }
            ReplayStep::Advance { ms } => {
                for rule in self.timers.advance(ms) {
                    self.shell.policy_timer_fired(&rule);
                }
                Ok(())
            }
        };
        Ok(result)
    }
}

fn client_info(client: u32, label: Option<String>) -> ClientInfo {
    let info = ClientInfo::new(ClientId(client));
    match label {
        Some(label) => info.with_label(label),
        None => info,
    }
}

/// Run a script against a fresh headless shell.
///
/// # Errors
///
/// Returns [`IviShellError::ScriptError`] when a step references an unknown
/// surface, output or vocabulary name. Shell errors do not abort the replay;
/// they are recorded in the step outcomes.
pub fn run_script(script: ReplayScript) -> Result<ReplayReport, IviShellError> {
    let config = script.config.unwrap_or_else(|| config::get_config().clone());
    let mut replay = Replay::new(&config, &script.head_sizes);

    let mut steps = Vec::with_capacity(script.steps.len());
    let mut events = Vec::new();
    let mut effects = 0;

    for (index, step) in script.steps.into_iter().enumerate() {
        let index = index + 1;
        let op = step.name();
        let result = replay
            .apply(step)
            .map_err(|err| IviShellError::ScriptError(format!("step {index} ({op}): {err}")))?;
        if let Err(err) = &result {
            tracing::debug!(step = index, op, error = %err, "replay: step failed");
        }

        effects += replay.executor.execute_batch(replay.shell.take_effects());
        for effect in replay.recorder.drain() {
            if let ShellEffect::SendEvent { client, event } = effect {
                events.push(EventRecord { step: index, client, event });
            }
        }
        steps.push(StepOutcome { index, op, error: result.err().map(|e| e.to_string()) });
    }

    Ok(ReplayReport { steps, effects, events, snapshot: replay.shell.snapshot() })
}

// ============================================================================
// Command
// ============================================================================

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the script cannot be loaded or aborts.
pub fn execute(args: &ReplayArgs) -> Result<(), IviShellError> {
    let script = load_script(&args.script)?;
    let report = run_script(script)?;

    if args.json {
        output::print_highlighted_json(&serde_json::to_value(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ReplayReport) {
    #[derive(Tabled)]
    struct OutputRow {
        #[tabled(rename = "ID")]
        id: u32,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Kind")]
        kind: String,
        #[tabled(rename = "Geometry")]
        geometry: String,
        #[tabled(rename = "Area")]
        area: String,
        #[tabled(rename = "Enabled")]
        enabled: String,
        #[tabled(rename = "Active")]
        active: String,
    }

    #[derive(Tabled)]
    struct SurfaceRow {
        #[tabled(rename = "ID")]
        id: u32,
        #[tabled(rename = "App")]
        app: String,
        #[tabled(rename = "Role")]
        role: String,
        #[tabled(rename = "Output")]
        output: String,
        #[tabled(rename = "Position")]
        position: String,
        #[tabled(rename = "Mapped")]
        mapped: String,
    }

    #[derive(Tabled)]
    struct EventRow {
        #[tabled(rename = "Step")]
        step: usize,
        #[tabled(rename = "Client")]
        client: u32,
        #[tabled(rename = "Event")]
        event: String,
    }

    let snapshot = &report.snapshot;
    let ready = if snapshot.ready { "ready".green() } else { "not ready".yellow() };
    println!(
        "{} {} steps, {} effects, shell {ready}",
        "Replay:".bold(),
        report.steps.len(),
        report.effects
    );

    for failure in report.failures() {
        let error = failure.error.as_deref().unwrap_or_default();
        println!("  {} step {} ({}): {error}", "✗".red(), failure.index, failure.op);
    }

    let outputs: Vec<OutputRow> = snapshot
        .outputs
        .iter()
        .map(|o| OutputRow {
            id: o.id.0,
            name: o.name.clone(),
            kind: format!("{:?}", o.kind),
            geometry: o.geometry.to_string(),
            area: o.area.to_string(),
            enabled: output::format_bool(o.enabled),
            active: o.active.map_or_else(|| "-".dimmed().to_string(), |id| id.to_string()),
        })
        .collect();
    if outputs.is_empty() {
        println!("{}", "No outputs.".dimmed());
    } else {
        let count = outputs.len();
        let table = Table::new(outputs)
            .with(Style::rounded())
            .with(Modify::new(Columns::first()).with(Alignment::right()))
            .with(Modify::new(Columns::new(5..6)).with(Alignment::center()))
            .to_string();
        println!("{}", format!("Outputs ({count})").bold());
        println!("{table}");
    }

    let surfaces: Vec<SurfaceRow> = snapshot
        .surfaces
        .iter()
        .map(|s| SurfaceRow {
            id: s.id.0,
            app: output::truncate(s.app_id().unwrap_or("-"), 32),
            role: s.kind().name().to_string(),
            output: s.view.output.map_or_else(|| "-".to_string(), |id| id.to_string()),
            position: format!("{}, {}", s.view.position.x, s.view.position.y),
            mapped: output::format_bool(s.view.mapped),
        })
        .collect();
    if surfaces.is_empty() {
        println!("{}", "No surfaces.".dimmed());
    } else {
        let count = surfaces.len();
        let table = Table::new(surfaces)
            .with(Style::rounded())
            .with(Modify::new(Columns::first()).with(Alignment::right()))
            .with(Modify::new(Columns::new(5..6)).with(Alignment::center()))
            .to_string();
        println!("{}", format!("Surfaces ({count})").bold());
        println!("{table}");
    }

    let events: Vec<EventRow> = report
        .events
        .iter()
        .map(|e| EventRow { step: e.step, client: e.client.0, event: describe_event(&e.event) })
        .collect();
    if !events.is_empty() {
        let count = events.len();
        let table = Table::new(events)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(0..2)).with(Alignment::right()))
            .to_string();
        println!("{}", format!("Events ({count})").bold());
        println!("{table}");
    }
}

fn describe_event(event: &ShellEvent) -> String {
    match event {
        ShellEvent::AdvertiseApplication { app_id } => format!("advertise_application {app_id}"),
        ShellEvent::StateApp { app_id, state, role, .. } => {
            format!("state_app {app_id} {} ({})", state.as_str(), role.name())
        }
        ShellEvent::Bound => "bound".to_string(),
    }
}
