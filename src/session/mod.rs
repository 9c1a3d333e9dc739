//! Session recording and freezing
//!
//! Recording is append-only and owned by the host's input-capture layer;
//! finishing moves the log into an immutable snapshot for analysis.
//!
//! Flow: begin → record / compose → finish → FrozenSession → analyzer

pub mod composition;
pub mod log;
pub mod recorder;

pub use composition::{CompositionEdit, CompositionTracker};
pub use log::SessionLog;
pub use recorder::{
    Clock, FrozenSession, ManualClock, SessionBuilder, SessionHandle, SystemClock, MIN_EVENTS,
};
