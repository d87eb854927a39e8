//! Output manager.
//!
//! Owns every [`Output`], keyed by name, and drives head hotplug: connected
//! heads are queued on the output their configuration names, queued heads
//! are attached and the output enabled, and outputs lose their enabled state
//! once the last head is gone.

mod heads;

pub use heads::{HeadBackend, HeadStatus, SimulatedHeads, try_attach_heads, try_enable_output};

use super::error::{ShellError, ShellResult};
use super::state::{HeadId, MAX_HEADS, Output, OutputId, Rect};
use crate::config::{OutputConfig, resolve_output_config};

/// Outcome of a heads-changed pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeadsChanged {
    /// Outputs enabled by this pass, with their new geometry.
    pub enabled: Vec<(OutputId, Rect)>,
    /// Outputs disabled because their last head went away.
    pub disabled: Vec<OutputId>,
    /// Outputs whose queued heads could not be brought up.
    pub failed: Vec<(OutputId, ShellError)>,
}

/// Registry of outputs plus head bookkeeping.
#[derive(Debug, Default)]
pub struct OutputManager {
    outputs: Vec<Output>,
    next_id: u32,
}

impl OutputManager {
    #[must_use]
    pub fn new() -> Self { Self { next_id: 1, ..Self::default() } }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Return the output named `name`, creating it if needed.
    pub fn ensure_output(&mut self, name: &str, config: Option<&OutputConfig>) -> OutputId {
        if let Some(output) = self.outputs.iter().find(|o| o.name == name) {
            return output.id;
        }

        let id = OutputId(self.next_id);
        self.next_id += 1;
        let output = Output::new(id, name, config.cloned());
        if let Some(app_id) = output.app_id.as_deref() {
            tracing::info!(output = name, app_id, "output: will place app on output");
        }
        tracing::debug!(output = name, id = %id, "output: created");
        self.outputs.push(output);
        id
    }

    #[must_use]
    pub fn get(&self, id: OutputId) -> Option<&Output> { self.outputs.iter().find(|o| o.id == id) }

    pub fn get_mut(&mut self, id: OutputId) -> Option<&mut Output> {
        self.outputs.iter_mut().find(|o| o.id == id)
    }

    /// Look up an output, failing with [`ShellError::OutputNotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is unknown.
    pub fn require(&self, id: OutputId) -> ShellResult<&Output> {
        self.get(id).ok_or(ShellError::OutputNotFound(id))
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Output IDs in creation order.
    #[must_use]
    pub fn ids(&self) -> Vec<OutputId> { self.outputs.iter().map(|o| o.id).collect() }

    pub fn iter(&self) -> impl Iterator<Item = &Output> { self.outputs.iter() }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Output> { self.outputs.iter_mut() }

    /// Output configured to host `app_id`.
    #[must_use]
    pub fn find_with_app_id(&self, app_id: &str) -> Option<OutputId> {
        self.outputs.iter().find(|o| o.app_id.as_deref() == Some(app_id)).map(|o| o.id)
    }

    /// First output carrying a background.
    #[must_use]
    pub fn find_bg_output(&self) -> Option<OutputId> {
        self.outputs.iter().find(|o| o.background.is_some()).map(|o| o.id)
    }

    /// First enabled output.
    #[must_use]
    pub fn default_output(&self) -> Option<OutputId> {
        self.outputs.iter().find(|o| o.enabled).map(|o| o.id)
    }

    /// Output a head is attached to.
    #[must_use]
    pub fn output_of_head(&self, head: HeadId) -> Option<OutputId> {
        self.outputs.iter().find(|o| o.heads.contains(&head)).map(|o| o.id)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.outputs.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.outputs.is_empty() }

    // ========================================================================
    // Hotplug
    // ========================================================================

    /// React to a heads-changed notification from the host.
    pub fn heads_changed(
        &mut self,
        backend: &mut dyn HeadBackend,
        heads: &[HeadStatus],
        configs: &[OutputConfig],
    ) -> HeadsChanged {
        let mut report = HeadsChanged::default();

        for head in heads {
            if head.connected && !head.enabled && !head.non_desktop {
                self.prepare_enable(head, configs);
            } else if !head.connected && head.enabled {
                if let Some(output) = self.head_disable(backend, head.id) {
                    report.disabled.push(output);
                }
            } else if head.enabled && head.device_changed {
                tracing::info!(
                    head = %head.name,
                    "output: monitor change detected on head, not doing anything about it"
                );
            }
        }

        for id in self.ids() {
            let has_pending = self.get(id).is_some_and(|o| !o.pending_heads.is_empty());
            if !has_pending {
                continue;
            }

            match self.process_output(backend, id) {
                Ok(Some(geometry)) => report.enabled.push((id, geometry)),
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(output = %id, error = %err, "output: bring-up failed");
                    if let Some(output) = self.get_mut(id) {
                        output.pending_heads.clear();
                    }
                    report.failed.push((id, err));
                }
            }
        }

        report
    }

    /// Queue a connected head on the output its configuration names.
    ///
    /// Returns the output the head was queued on.
    pub fn prepare_enable(
        &mut self,
        head: &HeadStatus,
        configs: &[OutputConfig],
    ) -> Option<OutputId> {
        let section = match resolve_output_config(configs, &head.name) {
            Ok(section) => section,
            Err(err) => {
                tracing::warn!(head = %head.name, error = %err, "output: configuration error");
                return None;
            }
        };

        let name = match section {
            Some(section) if section.is_off() => {
                tracing::debug!(head = %head.name, "output: head configured off");
                return None;
            }
            Some(section) => section.name.clone(),
            None => head.name.clone(),
        };

        let id = self.ensure_output(&name, section);
        let output = self.get_mut(id)?;
        if output.pending_heads.len() >= MAX_HEADS {
            tracing::warn!(output = %name, head = %head.name, "output: too many heads queued");
            return None;
        }
        if !output.pending_heads.contains(&head.id) {
            output.pending_heads.push(head.id);
        }
        Some(id)
    }

    /// Attach the queued heads of an output, enabling it if necessary.
    ///
    /// Returns the geometry if the output went from disabled to enabled.
    /// After the call, `pending_heads` holds only the heads that failed.
    ///
    /// # Errors
    ///
    /// - [`ShellError::OutputConfigure`] if the host refuses the configuration.
    /// - [`ShellError::HeadAttach`] if no head could be brought up, or if any
    ///   head failed to join an already enabled output.
    pub fn process_output(
        &mut self,
        backend: &mut dyn HeadBackend,
        id: OutputId,
    ) -> ShellResult<Option<Rect>> {
        let output = self.get_mut(id).ok_or(ShellError::OutputNotFound(id))?;
        let mut pending = std::mem::take(&mut output.pending_heads);

        if output.enabled {
            let fail_len = try_attach_heads(backend, &output.name, &mut pending);
            output.heads.extend(pending.drain(fail_len..));
            output.pending_heads = pending;
            return if fail_len == 0 {
                Ok(None)
            } else {
                Err(ShellError::HeadAttach { output: output.name.clone(), failed: fail_len })
            };
        }

        let fail_len = try_attach_heads(backend, &output.name, &mut pending);

        if !backend.configure_output(&output.name, output.scale, output.transform) {
            for head in &pending[fail_len..] {
                backend.detach_head(*head);
            }
            output.pending_heads = pending;
            return Err(ShellError::OutputConfigure(output.name.clone()));
        }

        let (fail_len, geometry) = try_enable_output(backend, &output.name, &mut pending, fail_len);
        let Some(geometry) = geometry else {
            let failed = pending.len();
            output.pending_heads = pending;
            return Err(ShellError::HeadAttach { output: output.name.clone(), failed });
        };

        output.heads.extend(pending.drain(fail_len..));
        output.pending_heads = pending;
        output.enabled = true;
        output.geometry = geometry;
        output.reset_area();
        tracing::info!(
            output = %output.name,
            geometry = %geometry,
            heads = output.heads.len(),
            "output: enabled"
        );
        Ok(Some(geometry))
    }

    /// Detach a disconnected head. Returns the output if it lost its last
    /// head and was disabled.
    pub fn head_disable(
        &mut self,
        backend: &mut dyn HeadBackend,
        head: HeadId,
    ) -> Option<OutputId> {
        backend.detach_head(head);
        self.drop_head(backend, head)
    }

    /// Forget a head the host destroyed. Returns the output if it lost its
    /// last head and was disabled.
    pub fn head_destroyed(
        &mut self,
        backend: &mut dyn HeadBackend,
        head: HeadId,
    ) -> Option<OutputId> {
        for output in &mut self.outputs {
            output.pending_heads.retain(|h| *h != head);
        }
        self.drop_head(backend, head)
    }

    fn drop_head(&mut self, backend: &mut dyn HeadBackend, head: HeadId) -> Option<OutputId> {
        let output = self.outputs.iter_mut().find(|o| o.heads.contains(&head))?;
        output.heads.retain(|h| *h != head);
        if !output.heads.is_empty() {
            return None;
        }

        backend.disable_output(&output.name);
        output.enabled = false;
        tracing::info!(output = %output.name, "output: disabled, no heads left");
        Some(output.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::shell::state::OutputKind;

    fn head(id: u32, name: &str) -> HeadStatus {
        HeadStatus {
            id: HeadId(id),
            name: name.to_string(),
            connected: true,
            enabled: false,
            device_changed: false,
            non_desktop: false,
        }
    }

    fn config(name: &str) -> OutputConfig { OutputConfig::named(name) }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_ensure_output_is_idempotent() {
            let mut manager = OutputManager::new();
            let a = manager.ensure_output("HDMI-A-1", None);
            let b = manager.ensure_output("HDMI-A-1", None);
            assert_eq!(a, b);
            assert_eq!(manager.len(), 1);
        }

        #[test]
        fn test_find_with_app_id_and_background() {
            let mut manager = OutputManager::new();
            let cfg = OutputConfig { app_id: Some("cluster".into()), ..config("DP-1") };
            let _plain = manager.ensure_output("HDMI-A-1", None);
            let pinned = manager.ensure_output("DP-1", Some(&cfg));
            assert_eq!(manager.find_with_app_id("cluster"), Some(pinned));
            assert_eq!(manager.find_bg_output(), None);

            let background = Some(crate::modules::shell::state::SurfaceId(1));
            manager.get_mut(pinned).unwrap().background = background;
            assert_eq!(manager.find_bg_output(), Some(pinned));
        }

        #[test]
        fn test_output_takes_config_settings() {
            let mut manager = OutputManager::new();
            let cfg = OutputConfig { scale: 2, kind: OutputKind::Remote, ..config("remote-1") };
            let id = manager.ensure_output("remote-1", Some(&cfg));
            let output = manager.get(id).unwrap();
            assert_eq!(output.scale, 2);
            assert!(output.kind.is_remote());
        }
    }

    mod hotplug_tests {
        use super::*;

        #[test]
        fn test_connected_head_enables_output() {
            let mut backend = SimulatedHeads::new();
            let mut manager = OutputManager::new();
            let report = manager.heads_changed(&mut backend, &[head(1, "HDMI-A-1")], &[]);

            assert_eq!(report.enabled.len(), 1);
            let (id, geometry) = report.enabled[0];
            let output = manager.get(id).unwrap();
            assert!(output.enabled);
            assert_eq!(output.name, "HDMI-A-1");
            assert_eq!(output.geometry, geometry);
            assert_eq!(output.area, Rect::sized(1920, 1080));
            assert!(output.pending_heads.is_empty());
            assert_eq!(manager.output_of_head(HeadId(1)), Some(id));
        }

        #[test]
        fn test_non_desktop_head_ignored() {
            let mut backend = SimulatedHeads::new();
            let mut manager = OutputManager::new();
            let mut vr = head(1, "DP-2");
            vr.non_desktop = true;
            let report = manager.heads_changed(&mut backend, &[vr], &[]);
            assert!(report.enabled.is_empty());
            assert!(manager.is_empty());
        }

        #[test]
        fn test_mode_off_skips_head() {
            let mut backend = SimulatedHeads::new();
            let mut manager = OutputManager::new();
            let cfg = OutputConfig { mode: Some("off".into()), ..config("HDMI-A-1") };
            let report = manager.heads_changed(&mut backend, &[head(1, "HDMI-A-1")], &[cfg]);
            assert!(report.enabled.is_empty());
            assert!(manager.is_empty());
        }

        #[test]
        fn test_same_as_clones_onto_one_output() {
            let mut backend = SimulatedHeads::new();
            let mut manager = OutputManager::new();
            let configs = vec![
                config("HDMI-A-1"),
                OutputConfig { same_as: Some("HDMI-A-1".into()), ..config("HDMI-A-2") },
            ];
            let report = manager.heads_changed(
                &mut backend,
                &[head(1, "HDMI-A-1"), head(2, "HDMI-A-2")],
                &configs,
            );

            assert_eq!(manager.len(), 1);
            let (id, _) = report.enabled[0];
            assert_eq!(manager.get(id).unwrap().heads.as_slice(), &[HeadId(1), HeadId(2)]);
        }

        #[test]
        fn test_total_failure_reported_and_queue_cleared() {
            let mut backend = SimulatedHeads::new();
            backend.refuse_attach.insert(HeadId(1));
            let mut manager = OutputManager::new();
            let report = manager.heads_changed(&mut backend, &[head(1, "HDMI-A-1")], &[]);

            assert_eq!(report.failed.len(), 1);
            assert!(matches!(report.failed[0].1, ShellError::HeadAttach { failed: 1, .. }));
            let output = manager.by_name("HDMI-A-1").unwrap();
            assert!(!output.enabled);
            assert!(output.pending_heads.is_empty());
        }

        #[test]
        fn test_configure_failure() {
            let mut backend = SimulatedHeads::new();
            backend.refuse_configure.insert("HDMI-A-1".into());
            let mut manager = OutputManager::new();
            let report = manager.heads_changed(&mut backend, &[head(1, "HDMI-A-1")], &[]);
            assert!(matches!(report.failed[0].1, ShellError::OutputConfigure(_)));
            assert!(backend.attached("HDMI-A-1").is_empty());
        }

        #[test]
        fn test_failed_head_on_enabled_output_is_failure() {
            let mut backend = SimulatedHeads::new();
            let mut manager = OutputManager::new();
            let configs = vec![
                config("A"),
                OutputConfig { same_as: Some("A".into()), ..config("B") },
            ];
            manager.heads_changed(&mut backend, &[head(1, "A")], &configs);

            backend.refuse_attach.insert(HeadId(2));
            let report = manager.heads_changed(&mut backend, &[head(2, "B")], &configs);
            assert!(report.enabled.is_empty());
            assert_eq!(report.failed.len(), 1);
            assert!(manager.by_name("A").unwrap().enabled);
        }

        #[test]
        fn test_disconnect_last_head_disables_output() {
            let mut backend = SimulatedHeads::new();
            let mut manager = OutputManager::new();
            let report = manager.heads_changed(&mut backend, &[head(1, "HDMI-A-1")], &[]);
            let (id, _) = report.enabled[0];

            let mut gone = head(1, "HDMI-A-1");
            gone.connected = false;
            gone.enabled = true;
            let report = manager.heads_changed(&mut backend, &[gone], &[]);

            assert_eq!(report.disabled, vec![id]);
            let output = manager.get(id).unwrap();
            assert!(!output.enabled);
            assert!(output.heads.is_empty());
            assert!(!backend.is_enabled("HDMI-A-1"));
        }

        #[test]
        fn test_destroyed_head_keeps_output_with_remaining_heads() {
            let mut backend = SimulatedHeads::new();
            let mut manager = OutputManager::new();
            let configs = vec![
                config("A"),
                OutputConfig { same_as: Some("A".into()), ..config("B") },
            ];
            let report =
                manager.heads_changed(&mut backend, &[head(1, "A"), head(2, "B")], &configs);
            let (id, _) = report.enabled[0];

            assert_eq!(manager.head_destroyed(&mut backend, HeadId(1)), None);
            assert!(manager.get(id).unwrap().enabled);
            assert_eq!(manager.head_destroyed(&mut backend, HeadId(2)), Some(id));
            assert!(!manager.get(id).unwrap().enabled);
        }

        #[test]
        fn test_head_queue_is_bounded() {
            let mut manager = OutputManager::new();
            let configs: Vec<OutputConfig> = std::iter::once(config("A"))
                .chain((1..=9).map(|i| OutputConfig {
                    same_as: Some("A".into()),
                    ..config(&format!("clone-{i}"))
                }))
                .collect();

            let mut queued = 0;
            for i in 1..=9 {
                if manager.prepare_enable(&head(i, &format!("clone-{i}")), &configs).is_some() {
                    queued += 1;
                }
            }
            assert_eq!(queued, MAX_HEADS);
        }
    }
}
