//! Policy engine errors.

use thiserror::Error;

/// Failures of the rule engine and of policy backends.
///
/// Hook vetoes are not errors; they never produce a `PolicyError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Rules cannot be added while a state change is being evaluated.
    #[error("a state change is in progress")]
    StateChangeInProgress,

    /// The policy hooks refused the new rule.
    #[error("policy does not allow adding rules")]
    NotAllowed,

    /// The state value was never registered.
    #[error("unknown state {0}")]
    UnknownState(u32),

    /// The event value was never registered.
    #[error("unknown event {0}")]
    UnknownEvent(u32),

    /// The rule targets an output that does not exist.
    #[error("unknown output '{0}'")]
    UnknownOutput(String),

    /// The requested state is already current.
    #[error("already in state {0}")]
    SameState(u32),

    /// A state or event name was not found in the vocabulary.
    #[error("unknown {kind} name '{name}'")]
    UnknownName { kind: &'static str, name: String },

    /// The arbitration model could not be loaded.
    #[error("arbitration model unavailable: {0}")]
    ModelUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(PolicyError::SameState(1).to_string(), "already in state 1");
        assert_eq!(
            PolicyError::UnknownName { kind: "event", name: "blink".into() }.to_string(),
            "unknown event name 'blink'"
        );
    }
}
