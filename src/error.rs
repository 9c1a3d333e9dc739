//! Error types for Synheart Rhythm

use thiserror::Error;

/// Errors that can occur while recording or analyzing a session
#[derive(Debug, Error)]
pub enum RhythmError {
    /// Event recorded or session finished after the session was finalized
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Fewer than two events, or blank final text, at finalization
    #[error("Insufficient input for analysis: {0}")]
    InsufficientInput(String),

    #[error("Invalid event log: {0}")]
    InvalidEventLog(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RhythmError {
    /// Whether the caller can recover by supplying more input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RhythmError::InsufficientInput(_))
    }
}
