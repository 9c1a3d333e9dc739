//! Synheart Rhythm - On-device keystroke rhythm analysis
//!
//! Rhythm records the keystroke events of one text-entry session and turns the
//! frozen log into a typing-behavior report through a deterministic pipeline:
//! session recording → freeze → interval derivation → pause / burst / deletion
//! analysis → fluency scoring → rhythm classification.
//!
//! ## Modules
//!
//! - **Session**: Append-only recording, IME composition diffing, frozen snapshots
//! - **Analysis**: Pure feature functions over a frozen session
//! - **Pipeline**: Report assembly from the analysis components

pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::RhythmConfig;
pub use error::RhythmError;
pub use pipeline::{analyze_session, analyze_session_json, RhythmAnalyzer};

// Session exports
pub use session::{CompositionTracker, FrozenSession, SessionHandle, SessionLog};

// Report exports
pub use types::{
    FluencyLevel, InputModality, KeystrokeEvent, KeystrokeKind, PausePattern, Report, RhythmType,
};

/// Rhythm version
pub const RHYTHM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name used in CLI diagnostics
pub const PRODUCER_NAME: &str = "synheart-rhythm";
