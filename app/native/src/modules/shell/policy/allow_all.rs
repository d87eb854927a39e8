//! Permissive hook set: every surface and every client is allowed.

use super::hooks::PolicyHooks;

/// Allows everything and maps show/hide rules to activate/deactivate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl PolicyHooks for AllowAll {
    fn name(&self) -> &'static str { "allow-all" }
}
