//! Rhythm feature derivation
//!
//! Each component is a pure function of the frozen event log (or, for text
//! rhythm, of the final text). None of them can fail: empty interval lists,
//! zero elapsed time and empty text all yield 0.

pub mod bursts;
pub mod classifier;
pub mod deletion;
pub mod fluency;
pub mod intervals;
pub mod pauses;
pub mod text;

pub use bursts::{detect_bursts, BurstScan};
pub use classifier::classify_rhythm;
pub use deletion::{analyze_deletions, detect_modality, DeletionStats, ModalityStats};
pub use fluency::{compute_fluency, FluencyScore};
pub use intervals::{compute_interval_stats, effective_intervals, IntervalStats};
pub use pauses::{classify_pauses, map_hesitations, HesitationMap};
pub use text::analyze_text_rhythm;
