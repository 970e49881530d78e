//! Error taxonomy for the trace engine and its session façade
//!
//! All parsing and evaluation inside the engine is total: unknown constructs
//! degrade to no-ops or zero values and never produce an error. The variants
//! here cover the remaining fault classes: toolchain validation, session
//! lifecycle, and unexpected internal faults.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the session façade and the native validator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The native toolchain rejected the source (or timed out).
    /// Carries the combined stdout+stderr diagnostic text.
    #[error("compilation failed")]
    Compilation { details: String },

    /// Stepping or ending a session that does not exist (or was already ended).
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    /// Random-access read outside `[0, total_steps)`.
    #[error("step {step} out of range for {total} steps")]
    StepOutOfRange { step: usize, total: usize },

    /// The request named a language the engine does not trace.
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    /// Any unexpected fault inside the engine.
    #[error("{0}")]
    Internal(String),
}

impl EngineError {
    /// Wire-level error code, as the front-end expects it.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Compilation { .. } => "Compilation Error",
            EngineError::SessionNotFound(_) => "Session Not Found",
            EngineError::StepOutOfRange { .. } => "Validation Error",
            EngineError::UnsupportedLanguage(_) => "Validation Error",
            EngineError::Internal(_) => "Debug Error",
        }
    }

    /// Diagnostic payload, if this error carries one.
    pub fn details(&self) -> Option<&str> {
        match self {
            EngineError::Compilation { details } => Some(details),
            EngineError::Internal(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes() {
        let err = EngineError::Compilation {
            details: "x.cpp:1:1: error".to_string(),
        };
        assert_eq!(err.code(), "Compilation Error");
        assert_eq!(err.details(), Some("x.cpp:1:1: error"));

        let err = EngineError::Internal("boom".to_string());
        assert_eq!(err.code(), "Debug Error");

        let err = EngineError::StepOutOfRange { step: 9, total: 3 };
        assert_eq!(err.code(), "Validation Error");
        assert!(err.details().is_none());
    }
}
