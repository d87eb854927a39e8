//! Surface registry.
//!
//! Owns every known surface. Surfaces live in an arena keyed by
//! [`SurfaceId`]; two ordered ID lists track which surfaces are *listed*
//! (role resolved, visible to app-id lookups) and which are *pending*
//! (waiting for the shell client to become ready).

use std::collections::HashMap;

use super::role::RoleKind;
use super::surface::Surface;
use super::types::{ClientId, SurfaceId};

/// Arena of surfaces plus the listed and pending orderings.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    /// All surfaces by ID.
    surfaces: HashMap<SurfaceId, Surface>,

    /// Surfaces with a resolved role, oldest first.
    listed: Vec<SurfaceId>,

    /// Surfaces parked until role resolution, oldest first.
    pending: Vec<SurfaceId>,

    /// Next ID to hand out.
    next_id: u32,
}

impl SurfaceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self { Self { next_id: 1, ..Self::default() } }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create and register a new role-less surface.
    pub fn register(&mut self, client: ClientId, app_id: Option<String>) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(id, Surface::new(id, client, app_id));
        id
    }

    /// Remove a surface from the arena and from both lists.
    pub fn unregister(&mut self, id: SurfaceId) -> Option<Surface> {
        self.unlink(id);
        self.surfaces.remove(&id)
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// Park a surface on the pending list.
    pub fn push_pending(&mut self, id: SurfaceId) {
        self.unlink(id);
        self.pending.push(id);
    }

    /// Move a surface onto the listed surfaces.
    pub fn link(&mut self, id: SurfaceId) {
        self.unlink(id);
        self.listed.push(id);
    }

    /// Drop a surface from whichever list it is on.
    pub fn unlink(&mut self, id: SurfaceId) {
        self.listed.retain(|s| *s != id);
        self.pending.retain(|s| *s != id);
    }

    /// Empty both lists, keeping the surfaces themselves.
    pub fn unlink_all(&mut self) {
        self.listed.clear();
        self.pending.clear();
    }

    /// Take the pending list, oldest first.
    pub fn take_pending(&mut self) -> Vec<SurfaceId> { std::mem::take(&mut self.pending) }

    /// Whether a surface is on the listed surfaces.
    #[must_use]
    pub fn is_listed(&self, id: SurfaceId) -> bool { self.listed.contains(&id) }

    /// Whether a surface is parked on the pending list.
    #[must_use]
    pub fn is_pending(&self, id: SurfaceId) -> bool { self.pending.contains(&id) }

    /// Listed surfaces, oldest first.
    #[must_use]
    pub fn listed(&self) -> &[SurfaceId] { &self.listed }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get a surface by ID.
    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<&Surface> { self.surfaces.get(&id) }

    /// Get a mutable surface by ID.
    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> { self.surfaces.get_mut(&id) }

    /// Whether a surface ID is known.
    #[must_use]
    pub fn contains(&self, id: SurfaceId) -> bool { self.surfaces.contains_key(&id) }

    /// Find the most recently listed surface carrying `app_id`.
    #[must_use]
    pub fn find_by_app_id(&self, app_id: &str) -> Option<SurfaceId> {
        self.listed
            .iter()
            .rev()
            .copied()
            .find(|id| self.surfaces.get(id).is_some_and(|s| s.has_app_id(app_id)))
    }

    /// Role name of a surface, or `None` if the ID is unknown.
    #[must_use]
    pub fn role_name(&self, id: SurfaceId) -> Option<&'static str> {
        self.surfaces.get(&id).map(Surface::role_name)
    }

    /// Number of listed surfaces with the given role kind.
    #[must_use]
    pub fn count_listed(&self, kind: RoleKind) -> usize {
        self.listed
            .iter()
            .filter(|id| self.surfaces.get(id).is_some_and(|s| s.kind() == kind))
            .count()
    }

    /// Whether any listed surface holds a split role.
    #[must_use]
    pub fn has_split(&self) -> bool {
        self.listed
            .iter()
            .any(|id| self.surfaces.get(id).is_some_and(|s| s.kind().is_split()))
    }

    /// All surfaces sorted by ID.
    #[must_use]
    pub fn all(&self) -> Vec<&Surface> {
        let mut all: Vec<&Surface> = self.surfaces.values().collect();
        all.sort_by_key(|s| s.id);
        all
    }

    /// Number of registered surfaces.
    #[must_use]
    pub fn len(&self) -> usize { self.surfaces.len() }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.surfaces.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::shell::state::role::SurfaceRole;
    use crate::modules::shell::state::types::{OutputId, SplitOrientation};

    fn register_listed(
        registry: &mut SurfaceRegistry,
        app_id: &str,
        role: SurfaceRole,
    ) -> SurfaceId {
        let id = registry.register(ClientId(1), Some(app_id.to_string()));
        registry.get_mut(id).unwrap().set_role(role).unwrap();
        registry.link(id);
        id
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut registry = SurfaceRegistry::new();
        let a = registry.register(ClientId(1), None);
        let b = registry.register(ClientId(1), None);
        assert_eq!(a, SurfaceId(1));
        assert_eq!(b, SurfaceId(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_find_by_app_id_only_sees_listed() {
        let mut registry = SurfaceRegistry::new();
        let id = registry.register(ClientId(1), Some("nav".into()));
        registry.push_pending(id);
        assert_eq!(registry.find_by_app_id("nav"), None);

        registry.link(id);
        assert_eq!(registry.find_by_app_id("nav"), Some(id));
        assert!(!registry.is_pending(id));
    }

    #[test]
    fn test_find_by_app_id_prefers_newest() {
        let mut registry = SurfaceRegistry::new();
        let _old = register_listed(&mut registry, "media", SurfaceRole::desktop());
        let new = register_listed(&mut registry, "media", SurfaceRole::desktop());
        assert_eq!(registry.find_by_app_id("media"), Some(new));
    }

    #[test]
    fn test_unregister_removes_from_lists() {
        let mut registry = SurfaceRegistry::new();
        let id = register_listed(&mut registry, "hvac", SurfaceRole::desktop());
        assert!(registry.unregister(id).is_some());
        assert!(!registry.contains(id));
        assert!(registry.listed().is_empty());
        assert!(registry.unregister(id).is_none());
    }

    #[test]
    fn test_has_split_scans_live_surfaces() {
        let mut registry = SurfaceRegistry::new();
        register_listed(&mut registry, "a", SurfaceRole::desktop());
        assert!(!registry.has_split());
        register_listed(
            &mut registry,
            "b",
            SurfaceRole::split(OutputId(1), SplitOrientation::Horizontal),
        );
        assert!(registry.has_split());
    }

    #[test]
    fn test_count_listed_by_kind() {
        let mut registry = SurfaceRegistry::new();
        register_listed(&mut registry, "a", SurfaceRole::Remote { output: OutputId(1) });
        register_listed(&mut registry, "b", SurfaceRole::desktop());
        assert_eq!(registry.count_listed(RoleKind::Remote), 1);
        assert_eq!(registry.count_listed(RoleKind::Popup), 0);
    }

    #[test]
    fn test_take_pending_preserves_order() {
        let mut registry = SurfaceRegistry::new();
        let a = registry.register(ClientId(1), None);
        let b = registry.register(ClientId(1), None);
        registry.push_pending(a);
        registry.push_pending(b);
        assert_eq!(registry.take_pending(), vec![a, b]);
        assert!(registry.take_pending().is_empty());
    }

    #[test]
    fn test_role_name_lookup() {
        let mut registry = SurfaceRegistry::new();
        let role = SurfaceRole::Background { output: OutputId(1) };
        let id = register_listed(&mut registry, "bg", role);
        assert_eq!(registry.role_name(id), Some("BACKGROUND"));
        assert_eq!(registry.role_name(SurfaceId(99)), None);
    }
}
