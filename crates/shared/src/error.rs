//! Error taxonomy for the realtime core.
//!
//! Nothing in the core terminates the process: transport and parse failures
//! are converted into connection state and error callbacks for the consumer
//! to render.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RealtimeError {
    /// Connection-level failure, recoverable via the reconnection policy.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Malformed inbound envelope; dropped with a diagnostic, never fatal.
    #[error("malformed event envelope: {0}")]
    Parse(String),

    /// The bounded reconnection policy ran out of attempts.
    #[error("reconnect attempts exhausted after {attempts} tries")]
    ReconnectExhausted { attempts: u32 },
}

impl RealtimeError {
    /// Stable code string for error callbacks, matching the wire `ERROR`
    /// event vocabulary.
    pub fn code(&self) -> &'static str {
        match self {
            RealtimeError::Transport(_) => "WS_ERROR",
            RealtimeError::Parse(_) => "PARSE_ERROR",
            RealtimeError::ReconnectExhausted { .. } => "RECONNECT_EXHAUSTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(RealtimeError::Transport("x".into()).code(), "WS_ERROR");
        assert_eq!(
            RealtimeError::ReconnectExhausted { attempts: 5 }.code(),
            "RECONNECT_EXHAUSTED"
        );
    }

    #[test]
    fn display_includes_context() {
        let err = RealtimeError::ReconnectExhausted { attempts: 5 };
        assert!(err.to_string().contains("5"));
    }
}
