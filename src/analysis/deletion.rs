//! Deletion behavior and input modality
//!
//! The keystroke-to-character ratio is the main CJK/IME signal: direct typists
//! sit near 1.0, while Pinyin-style composition typically lands at 3-4 because
//! each committed character takes several composition keystrokes.

use crate::config::RhythmConfig;
use crate::types::{DeletionPattern, DeletionPatternType, InputModality, KeystrokeEvent};

/// Deletion counts and runs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeletionStats {
    /// backspace/delete events; `composition_delete` is excluded
    pub deletion_count: u32,
    /// deletion_count / total events, 0 without events
    pub deletion_ratio: f64,
    pub patterns: Vec<DeletionPattern>,
}

/// Input modality signals
#[derive(Debug, Clone, PartialEq)]
pub struct ModalityStats {
    pub keystroke_ratio: f64,
    pub ime_events: u32,
    pub ime_event_ratio: f64,
    pub detected_modality: InputModality,
}

pub fn analyze_deletions(events: &[KeystrokeEvent], config: &RhythmConfig) -> DeletionStats {
    let deletion_count = events.iter().filter(|e| e.kind.is_deletion()).count() as u32;
    let deletion_ratio = if events.is_empty() {
        0.0
    } else {
        deletion_count as f64 / events.len() as f64
    };

    DeletionStats {
        deletion_count,
        deletion_ratio,
        patterns: consecutive_deletions(events, config.consecutive_deletion_min),
    }
}

/// Runs of at least `min_run` back-to-back deletions
fn consecutive_deletions(events: &[KeystrokeEvent], min_run: u32) -> Vec<DeletionPattern> {
    let mut patterns = Vec::new();
    let mut run = 0u32;

    let mut flush = |run: &mut u32| {
        if *run >= min_run {
            patterns.push(DeletionPattern {
                pattern_type: DeletionPatternType::Consecutive,
                length: *run,
            });
        }
        *run = 0;
    };

    for event in events {
        if event.kind.is_deletion() {
            run += 1;
        } else {
            flush(&mut run);
        }
    }
    flush(&mut run);

    patterns
}

/// Classify the session as direct or IME-composed.
///
/// A share of IME events above the threshold flips the session to `ime`, so
/// occasional composition from a direct typist does not.
pub fn detect_modality(
    events: &[KeystrokeEvent],
    text_len: usize,
    config: &RhythmConfig,
) -> ModalityStats {
    let total = events.len();
    let keystroke_ratio = total as f64 / text_len.max(1) as f64;

    let ime_events = events.iter().filter(|e| e.is_ime).count() as u32;
    let ime_event_ratio = if total == 0 {
        0.0
    } else {
        ime_events as f64 / total as f64
    };

    let detected_modality = if ime_event_ratio > config.ime_event_ratio_threshold {
        InputModality::Ime
    } else {
        InputModality::Direct
    };

    ModalityStats {
        keystroke_ratio,
        ime_events,
        ime_event_ratio,
        detected_modality,
    }
}
