//! Shared harness for the shell integration tests.

#![allow(dead_code)]

use ivi_shell_lib::config::ShellConfig;
use ivi_shell_lib::modules::shell::outputs::{HeadStatus, SimulatedHeads};
use ivi_shell_lib::modules::shell::policy::{ClientInfo, ManualTimers, PolicyEngine};
use ivi_shell_lib::modules::shell::state::{ClientId, HeadId, OutputId, Rect, SurfaceId};
use ivi_shell_lib::modules::shell::{Shell, ShellEffect, ShellEvent};

/// Client bound to the shell interface.
pub const SHELL_CLIENT: ClientId = ClientId(1);

/// Client bound to the desktop interface.
pub const DESKTOP_CLIENT: ClientId = ClientId(2);

/// Client creating application surfaces.
pub const APP_CLIENT: ClientId = ClientId(3);

/// Name of the output brought up by [`Harness::boot`].
pub const OUTPUT: &str = "HDMI-A-1";

/// A headless shell plus a handle on its policy clock.
pub struct Harness {
    pub shell: Shell,
    pub timers: ManualTimers,
}

impl Harness {
    /// Shell built from `config` on top of `backend`.
    pub fn new(config: &ShellConfig, backend: SimulatedHeads) -> Self {
        let timers = ManualTimers::new();
        let policy =
            PolicyEngine::from_config(&config.policy, &config.core, Box::new(timers.clone()));
        Self { shell: Shell::new(config, policy, Box::new(backend)), timers }
    }

    /// Default configuration, 1920x1080 heads.
    pub fn headless() -> Self { Self::new(&ShellConfig::default(), SimulatedHeads::new()) }

    /// One output, a bound shell client, a background and ready.
    pub fn boot() -> (Self, OutputId) {
        let mut harness = Self::headless();
        harness.bind_shell();
        let output = harness.connect(1, OUTPUT);
        harness.background(output);
        harness.shell.ready().unwrap();
        harness.shell.take_effects();
        (harness, output)
    }

    pub fn bind_shell(&mut self) {
        self.shell.bind_shell(&ClientInfo::new(SHELL_CLIENT)).unwrap();
    }

    pub fn bind_desktop(&mut self) {
        self.shell.bind_desktop(&ClientInfo::new(DESKTOP_CLIENT)).unwrap();
    }

    /// Connect a head and return the output it enabled.
    pub fn connect(&mut self, id: u32, name: &str) -> OutputId {
        let report = self.shell.heads_changed(&[head(id, name)]);
        assert!(report.failed.is_empty(), "bring-up failed: {:?}", report.failed);
        report.enabled[0].0
    }

    /// Give `output` a full-size background surface.
    pub fn background(&mut self, output: OutputId) -> SurfaceId {
        let id = self.shell.surface_added(SHELL_CLIENT, Some("background".into())).unwrap();
        self.shell.set_background(id, output).unwrap();
        let geometry = self.shell.output(output).unwrap().geometry;
        let size = Rect::sized(geometry.width, geometry.height);
        self.shell.surface_committed(id, size, true).unwrap();
        id
    }

    /// Usable area of an output.
    pub fn area(&self, output: OutputId) -> Rect { self.shell.output(output).unwrap().area }

    /// Active surface of an output.
    pub fn active(&self, output: OutputId) -> Option<SurfaceId> {
        self.shell.output(output).unwrap().active
    }

    /// Launch a desktop app that acknowledges the maximized size at once.
    pub fn launch(&mut self, app_id: &str) -> SurfaceId {
        let id = self.shell.surface_added(APP_CLIENT, Some(app_id.to_string())).unwrap();
        let output = self.shell.outputs().default_output().unwrap();
        let area = self.area(output);
        self.shell.surface_committed(id, Rect::sized(area.width, area.height), true).unwrap();
        id
    }

    /// Advance the policy clock, firing due timers into the shell.
    pub fn advance(&mut self, ms: u64) -> usize {
        let due = self.timers.advance(ms);
        let count = due.len();
        for rule in due {
            self.shell.policy_timer_fired(&rule);
        }
        count
    }
}

/// A connected, not yet enabled head.
pub fn head(id: u32, name: &str) -> HeadStatus {
    HeadStatus {
        id: HeadId(id),
        name: name.to_string(),
        connected: true,
        enabled: false,
        device_changed: false,
        non_desktop: false,
    }
}

/// Events in a batch of effects.
pub fn events(effects: &[ShellEffect]) -> Vec<ShellEvent> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            ShellEffect::SendEvent { event, .. } => Some(event.clone()),
            _ => None,
        })
        .collect()
}

/// Size requests sent to one surface.
pub fn sizes_for(effects: &[ShellEffect], surface: SurfaceId) -> Vec<(i32, i32)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            ShellEffect::SetSize { surface: s, width, height } if *s == surface => {
                Some((*width, *height))
            }
            _ => None,
        })
        .collect()
}
