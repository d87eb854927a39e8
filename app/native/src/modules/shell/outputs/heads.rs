//! Display heads and the attach/enable algorithm.
//!
//! Attaching is done in two phases over the output's pending head list:
//!
//! 1. [`try_attach_heads`] attaches every head and partitions the list in
//!    place into a failed prefix and an attached suffix, stable within each
//!    part.
//! 2. [`try_enable_output`] enables the output; while enabling fails it
//!    evicts the *last* attached head into the failed prefix and retries.
//!
//! The result is the largest attached suffix the host accepts, or total
//! failure when no head survives.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::Transform;
use crate::modules::shell::state::{HeadId, HeadList, Rect};

/// State of a head as reported by the host on a heads-changed notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadStatus {
    pub id: HeadId,
    /// Connector name, e.g. `HDMI-A-1`.
    pub name: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub device_changed: bool,
    /// VR headsets and similar; never enabled as desktop outputs.
    #[serde(default)]
    pub non_desktop: bool,
}

/// Host operations on heads and outputs.
pub trait HeadBackend: Send {
    /// Attach a head to the named output. Returns `false` on failure.
    fn attach_head(&mut self, output: &str, head: HeadId) -> bool;

    /// Detach a head from whatever output it is attached to.
    fn detach_head(&mut self, head: HeadId);

    /// Apply scale and transform before enabling. Returns `false` on failure.
    fn configure_output(&mut self, output: &str, scale: i32, transform: Transform) -> bool;

    /// Enable the output with its attached heads, returning its global
    /// geometry, or `None` if the host refuses the head combination.
    fn enable_output(&mut self, output: &str) -> Option<Rect>;

    /// Disable the output.
    fn disable_output(&mut self, output: &str);
}

/// Attach every head in `heads`, moving failures to the front.
///
/// Returns the number of failed heads: `heads[..n]` failed,
/// `heads[n..]` are attached. Relative order is preserved in both parts.
pub fn try_attach_heads(
    backend: &mut dyn HeadBackend,
    output: &str,
    heads: &mut HeadList,
) -> usize {
    let mut fail_len = 0;
    for i in 0..heads.len() {
        let head = heads[i];
        if !backend.attach_head(output, head) {
            tracing::debug!(output, head = %head, "output: head failed to attach");
            heads.remove(i);
            heads.insert(fail_len, head);
            fail_len += 1;
        }
    }
    fail_len
}

/// Enable the output, evicting attached heads from the back on failure.
///
/// `fail_len` is the failed prefix length from [`try_attach_heads`]. Each
/// evicted head is detached and appended to the failed prefix. Returns the
/// final failed prefix length and the geometry if enabling succeeded.
pub fn try_enable_output(
    backend: &mut dyn HeadBackend,
    output: &str,
    heads: &mut HeadList,
    fail_len: usize,
) -> (usize, Option<Rect>) {
    let mut i = fail_len;
    while i < heads.len() {
        if let Some(geometry) = backend.enable_output(output) {
            return (i, Some(geometry));
        }

        let Some(head) = heads.pop() else {
            break;
        };
        tracing::debug!(output, head = %head, "output: enable failed, evicting head");
        heads.insert(i, head);
        backend.detach_head(head);
        i += 1;
    }
    (i, None)
}

// ============================================================================
// Simulated Backend
// ============================================================================

/// In-memory head backend for headless runs and tests.
///
/// Enabled outputs are laid out left to right in enable order. Failure modes
/// are opt-in: heads that refuse to attach, heads whose presence makes
/// enabling fail, and outputs that refuse configuration.
#[derive(Debug, Default, Clone)]
pub struct SimulatedHeads {
    /// Native size per head; heads not listed are 1920x1080.
    pub sizes: HashMap<HeadId, (i32, i32)>,
    /// Heads that fail to attach.
    pub refuse_attach: HashSet<HeadId>,
    /// Heads that make enable fail while attached.
    pub incompatible: HashSet<HeadId>,
    /// Output names that fail configuration.
    pub refuse_configure: HashSet<String>,

    attached: HashMap<String, Vec<HeadId>>,
    enabled: Vec<(String, Rect)>,
    configured: HashMap<String, (i32, Transform)>,
}

impl SimulatedHeads {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Heads attached to an output, in attach order.
    #[must_use]
    pub fn attached(&self, output: &str) -> &[HeadId] {
        self.attached.get(output).map_or(&[], Vec::as_slice)
    }

    /// Whether the output is currently enabled.
    #[must_use]
    pub fn is_enabled(&self, output: &str) -> bool {
        self.enabled.iter().any(|(name, _)| name == output)
    }

    /// Scale and transform last applied to an output.
    #[must_use]
    pub fn configuration(&self, output: &str) -> Option<(i32, Transform)> {
        self.configured.get(output).copied()
    }

    fn next_x(&self) -> i32 { self.enabled.iter().map(|(_, r)| r.x + r.width).max().unwrap_or(0) }
}

impl HeadBackend for SimulatedHeads {
    fn attach_head(&mut self, output: &str, head: HeadId) -> bool {
        if self.refuse_attach.contains(&head) {
            return false;
        }
        self.detach_head(head);
        self.attached.entry(output.to_string()).or_default().push(head);
        true
    }

    fn detach_head(&mut self, head: HeadId) {
        for heads in self.attached.values_mut() {
            heads.retain(|h| *h != head);
        }
    }

    fn configure_output(&mut self, output: &str, scale: i32, transform: Transform) -> bool {
        if self.refuse_configure.contains(output) {
            return false;
        }
        self.configured.insert(output.to_string(), (scale, transform));
        true
    }

    fn enable_output(&mut self, output: &str) -> Option<Rect> {
        let heads = self.attached(output);
        if heads.is_empty() || heads.iter().any(|h| self.incompatible.contains(h)) {
            return None;
        }
        if let Some((_, rect)) = self.enabled.iter().find(|(name, _)| name == output) {
            return Some(*rect);
        }

        // Cloned heads share the output; the first one decides the mode.
        let (width, height) = self.sizes.get(&heads[0]).copied().unwrap_or((1920, 1080));
        let rect = Rect::new(self.next_x(), 0, width, height);
        self.enabled.push((output.to_string(), rect));
        Some(rect)
    }

    fn disable_output(&mut self, output: &str) { self.enabled.retain(|(name, _)| name != output); }
}
