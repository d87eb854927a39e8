//! Error types for the shell layer.
//!
//! # Error Categories
//!
//! - **Protocol violations**: a client broke an invariant (role already set,
//!   edge occupied, invalid enum value). Reported to that client as a
//!   terminal protocol error carrying a [`ProtocolErrorCode`].
//! - **Resolution failures**: no output could host a default activation.
//!   Reported the same way, since it means the output setup is broken.
//! - **Lookup errors**: surface or output IDs that are not (or no longer)
//!   known.
//! - **Authorization**: a bind request refused by the policy hooks.
//! - **Output bring-up**: every head failed to attach or enable.
//! - **Policy**: rule engine failures, see [`PolicyError`].
//!
//! Policy vetoes are *not* errors; the vetoed operation simply has no effect.

use serde::Serialize;
use thiserror::Error;

use super::policy::PolicyError;
use super::state::{ClientId, OutputId, SurfaceId};

/// Result type alias for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Wire error codes of the shell interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolErrorCode {
    InvalidArgument = 0,
    BackgroundExists = 1,
}

/// Errors produced by the shell layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// A protocol violation, terminal for the offending client.
    #[error("protocol error ({code:?}): {message}")]
    Protocol {
        /// Client the error is posted to, when known.
        client: Option<ClientId>,
        /// Wire error code.
        code: ProtocolErrorCode,
        /// Human-readable message sent with the error.
        message: String,
    },

    /// A role was assigned to a surface that already has one.
    #[error("{surface} already has role {current}, refusing {requested}")]
    RoleAlreadyAssigned {
        surface: SurfaceId,
        current: &'static str,
        requested: &'static str,
    },

    /// The surface ID is unknown.
    #[error("{0} not found")]
    SurfaceNotFound(SurfaceId),

    /// The output ID is unknown.
    #[error("{0} not found")]
    OutputNotFound(OutputId),

    /// No output carries the given name.
    #[error("no output named '{0}'")]
    OutputNameNotFound(String),

    /// The policy refused a bind request.
    #[error("client not authorized to use {interface}")]
    NotAuthorized { interface: &'static str },

    /// The shell interface is already bound by another client.
    #[error("ivi_shell has already been bound")]
    AlreadyBound,

    /// The policy refused to create a surface.
    #[error("creation of {0} refused by policy")]
    SurfaceRefused(SurfaceId),

    /// None of the queued heads could be attached and enabled.
    #[error("no head could be attached to output '{output}' ({failed} failed)")]
    HeadAttach { output: String, failed: usize },

    /// The host refused to configure an output.
    #[error("failed to configure output '{0}'")]
    OutputConfigure(String),

    /// A policy rule engine failure.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

impl ShellError {
    /// Creates an `invalid_argument` protocol error.
    #[must_use]
    pub fn invalid_argument(client: Option<ClientId>, message: impl Into<String>) -> Self {
        Self::Protocol {
            client,
            code: ProtocolErrorCode::InvalidArgument,
            message: message.into(),
        }
    }

    /// Creates a `background_exists` protocol error.
    #[must_use]
    pub fn background_exists(client: Option<ClientId>, message: impl Into<String>) -> Self {
        Self::Protocol {
            client,
            code: ProtocolErrorCode::BackgroundExists,
            message: message.into(),
        }
    }

    /// Creates the error raised when default activation finds no output.
    #[must_use]
    pub fn no_output_for_activation(client: Option<ClientId>) -> Self {
        Self::invalid_argument(client, "No valid output found to activate surface by default")
    }

    /// Returns `true` if this error tears down a client connection.
    #[must_use]
    pub const fn is_protocol_error(&self) -> bool { matches!(self, Self::Protocol { .. }) }

    /// Returns `true` if this is a lookup error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SurfaceNotFound(_) | Self::OutputNotFound(_) | Self::OutputNameNotFound(_)
        )
    }

    /// Protocol error code, if this is a protocol violation.
    #[must_use]
    pub const fn protocol_code(&self) -> Option<ProtocolErrorCode> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ShellError::background_exists(None, "output already has background");
        assert_eq!(
            err.to_string(),
            "protocol error (BackgroundExists): output already has background"
        );
        assert!(err.is_protocol_error());
        assert_eq!(err.protocol_code(), Some(ProtocolErrorCode::BackgroundExists));
    }

    #[test]
    fn test_no_output_for_activation_is_invalid_argument() {
        let err = ShellError::no_output_for_activation(Some(ClientId(1)));
        assert_eq!(err.protocol_code(), Some(ProtocolErrorCode::InvalidArgument));
        assert!(err.to_string().contains("No valid output found"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(ShellError::SurfaceNotFound(SurfaceId(3)).is_not_found());
        assert!(ShellError::OutputNameNotFound("HDMI-A-1".into()).is_not_found());
        assert!(!ShellError::AlreadyBound.is_not_found());
    }

    #[test]
    fn test_policy_error_converts() {
        let err: ShellError = PolicyError::SameState(1).into();
        assert!(matches!(err, ShellError::Policy(PolicyError::SameState(1))));
        assert!(!err.is_protocol_error());
    }

    #[test]
    fn test_not_authorized_display() {
        let err = ShellError::NotAuthorized { interface: "ivi_shell" };
        assert_eq!(err.to_string(), "client not authorized to use ivi_shell");
    }
}
