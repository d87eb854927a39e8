//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// IVI Shell Configuration File
// ============================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.

{
  // ============================================================================
  // Core
  // ============================================================================
  // "core": {
  //   // Map desktop surfaces as soon as they commit their first frame
  //   "activateByDefault": true,
  //
  //   // rba engine: fall back to "unknown_app/NORMAL" for unlisted apps
  //   "allowUnregisteredApp": false
  // },

  // ============================================================================
  // Policy
  // ============================================================================
  // "policy": {
  //   // "allow-all", "deny-all" or "rba"
  //   "engine": "allow-all",
  //
  //   // deny-all: app-ids allowed to show surfaces (empty = built-in list)
  //   "permittedApps": [],
  //
  //   // deny-all: security labels allowed to bind each interface
  //   "bindLabels": {
  //     "shell": ["User::App::homescreen"],
  //     "desktop": ["User::App::launcher"]
  //   },
  //
  //   // rba: arbitration model
  //   "rbaModel": "/etc/rba/RBAModel.json",
  //
  //   // Extra states and events, referenced by name in rules
  //   "states": [{ "value": 8, "name": "parked" }],
  //   "events": [],
  //
  //   // Rules registered once their output appears
  //   "rules": [
  //     { "appId": "navigation", "state": "start", "event": "show", "output": "HDMI-A-1" }
  //   ]
  // },

  // ============================================================================
  // Outputs
  // ============================================================================
  // "outputs": [
  //   {
  //     "name": "HDMI-A-1",
  //     // "off" keeps the head disabled
  //     "mode": "preferred",
  //     "scale": 1,
  //     // normal, 90, 180, 270, flipped, flipped-90, flipped-180, flipped-270
  //     "transform": "normal",
  //     // Application pinned to this output
  //     "appId": "cluster-dashboard",
  //     // local, remote or remote-with-transmitter
  //     "kind": "local"
  //   },
  //   // Clone HDMI-A-1 onto a second head
  //   { "name": "HDMI-A-2", "sameAs": "HDMI-A-1" }
  // ],

  // ============================================================================
  // Shell Client
  // ============================================================================
  // "shellClient": {
  //   "command": "/usr/bin/homescreen"
  // }
}
"#
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
