//! Configuration types for the IVI shell.
//!
//! Types are organized by configuration section. The configuration file
//! supports JSONC format (JSON with comments).

pub mod general;
pub mod outputs;
pub mod policy;
pub mod root;

// General types
pub use general::{CoreConfig, ShellClientConfig};

// Output types
pub use outputs::{MAX_SAME_AS_DEPTH, OutputConfig, Transform, resolve_output_config};
// Policy types
pub use policy::{
    BindLabels, DEFAULT_RBA_MODEL, PolicyConfig, PolicyEngineKind, RuleConfig, VocabularyConfig,
};
// Root config types
pub use root::{ConfigError, ShellConfig, config_paths, load_config, load_config_from_path};
