//! Error types for the IVI shell binary.
//!
//! This module provides the unified error type returned by CLI commands. It
//! serializes as `{ "kind": ..., "message": ... }` so `--json` output can
//! carry failures too.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::shell::{ActorError, ShellError};

/// Errors that can occur during application execution.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum IviShellError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Replay script error.
    #[error("Script error: {0}")]
    ScriptError(String),
    /// A shell request failed.
    #[error("Shell error: {0}")]
    ShellError(String),
    /// The shell actor could not be reached.
    #[error("Actor error: {0}")]
    ActorError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for IviShellError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for IviShellError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<ConfigError> for IviShellError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<ShellError> for IviShellError {
    fn from(err: ShellError) -> Self { Self::ShellError(err.to_string()) }
}

impl From<ActorError> for IviShellError {
    fn from(err: ActorError) -> Self { Self::ActorError(err.to_string()) }
}

impl From<String> for IviShellError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for IviShellError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::shell::state::SurfaceId;

    #[test]
    fn test_config_error_display() {
        let err: IviShellError = ConfigError::Invalid("dangling sameAs".into()).into();
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("dangling sameAs"));
    }

    #[test]
    fn test_shell_error_conversion() {
        let err: IviShellError = ShellError::SurfaceNotFound(SurfaceId(3)).into();
        assert!(matches!(err, IviShellError::ShellError(_)));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IviShellError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_serializes_kind_and_message() {
        let err = IviShellError::ScriptError("step 3: unknown surface 'nav'".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "ScriptError");
        assert_eq!(json["message"], "step 3: unknown surface 'nav'");
    }
}
