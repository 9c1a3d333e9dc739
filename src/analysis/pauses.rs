//! Pause classification and hesitation mapping

use crate::config::RhythmConfig;
use crate::types::{Hesitation, HesitationSeverity, PausePattern, PauseSummary};

/// Hesitations at or above this many seconds are `long`
const LONG_HESITATION_SEC: f64 = 5.0;
/// Hesitations at or above this many seconds are `very_long`
const VERY_LONG_HESITATION_SEC: f64 = 10.0;

/// Hesitation points over the interval sequence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HesitationMap {
    pub count: u32,
    pub locations: Vec<usize>,
    pub hesitations: Vec<Hesitation>,
}

/// Bucket intervals into short/medium/long pauses and pick the pattern
pub fn classify_pauses(intervals: &[f64], config: &RhythmConfig) -> PauseSummary {
    let mut short_pauses = 0;
    let mut medium_pauses = 0;
    let mut long_pauses = 0;

    for &interval in intervals {
        if interval >= config.long_pause_min_sec {
            long_pauses += 1;
        } else if interval >= config.medium_pause_min_sec {
            medium_pauses += 1;
        } else if interval >= config.short_pause_min_sec {
            short_pauses += 1;
        }
    }

    PauseSummary {
        short_pauses,
        medium_pauses,
        long_pauses,
        pattern: pause_pattern(short_pauses, medium_pauses, long_pauses),
    }
}

/// First match wins, most severe bucket first
fn pause_pattern(short: u32, medium: u32, long: u32) -> PausePattern {
    let rules = [
        (long > 0, PausePattern::Contemplative),
        (medium > 0, PausePattern::Thoughtful),
        (short > 0, PausePattern::Choppy),
    ];
    rules
        .into_iter()
        .find_map(|(hit, pattern)| hit.then_some(pattern))
        .unwrap_or(PausePattern::Continuous)
}

/// Locate intervals at or above the hesitation threshold.
///
/// This overlaps the pause buckets on purpose: a 6s gap is both a medium pause
/// and a hesitation.
pub fn map_hesitations(intervals: &[f64], config: &RhythmConfig) -> HesitationMap {
    let hesitations: Vec<Hesitation> = intervals
        .iter()
        .enumerate()
        .filter(|(_, interval)| **interval >= config.hesitation_threshold_sec)
        .map(|(location, &interval)| Hesitation {
            location,
            duration: interval,
            severity: hesitation_severity(interval),
        })
        .collect();

    HesitationMap {
        count: hesitations.len() as u32,
        locations: hesitations.iter().map(|h| h.location).collect(),
        hesitations,
    }
}

fn hesitation_severity(interval: f64) -> HesitationSeverity {
    if interval >= VERY_LONG_HESITATION_SEC {
        HesitationSeverity::VeryLong
    } else if interval >= LONG_HESITATION_SEC {
        HesitationSeverity::Long
    } else {
        HesitationSeverity::Medium
    }
}
