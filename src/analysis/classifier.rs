//! Rhythm type classification
//!
//! An ordered decision table over typing speed, consistency and pause pattern.
//! Boundaries are strict: a value exactly at 60/120 CPM or 0.5/0.7 consistency
//! matches none of the speed/consistency guards and falls through to the
//! later rules.

use crate::types::{PausePattern, RhythmType};

const FAST_CPM: f64 = 120.0;
const SLOW_CPM: f64 = 60.0;
const HIGH_CONSISTENCY: f64 = 0.7;
const LOW_CONSISTENCY: f64 = 0.5;

type Rule = fn(f64, f64, PausePattern) -> Option<RhythmType>;

/// Evaluated top to bottom; the first rule returning a type wins
const RULES: &[Rule] = &[
    fast_and_consistent,
    slow_and_consistent,
    fast_and_inconsistent,
    slow_and_inconsistent,
    consistent,
    thoughtful_pauses,
    below_consistent,
];

fn fast_and_consistent(cpm: f64, consistency: f64, pattern: PausePattern) -> Option<RhythmType> {
    (cpm > FAST_CPM && consistency > HIGH_CONSISTENCY).then_some(
        if pattern == PausePattern::Continuous {
            RhythmType::SteadyFast
        } else {
            RhythmType::BurstFast
        },
    )
}

fn slow_and_consistent(cpm: f64, consistency: f64, _: PausePattern) -> Option<RhythmType> {
    (cpm < SLOW_CPM && consistency > HIGH_CONSISTENCY).then_some(RhythmType::SteadySlow)
}

fn fast_and_inconsistent(cpm: f64, consistency: f64, _: PausePattern) -> Option<RhythmType> {
    (cpm > FAST_CPM && consistency < LOW_CONSISTENCY).then_some(RhythmType::ErraticFast)
}

fn slow_and_inconsistent(cpm: f64, consistency: f64, pattern: PausePattern) -> Option<RhythmType> {
    (cpm < SLOW_CPM && consistency < LOW_CONSISTENCY).then_some(match pattern {
        PausePattern::Thoughtful | PausePattern::Contemplative => RhythmType::Hesitant,
        _ => RhythmType::Labored,
    })
}

fn consistent(_: f64, consistency: f64, _: PausePattern) -> Option<RhythmType> {
    (consistency > HIGH_CONSISTENCY).then_some(RhythmType::Fluid)
}

fn thoughtful_pauses(_: f64, _: f64, pattern: PausePattern) -> Option<RhythmType> {
    (pattern == PausePattern::Thoughtful).then_some(RhythmType::Measured)
}

fn below_consistent(_: f64, consistency: f64, _: PausePattern) -> Option<RhythmType> {
    (consistency < HIGH_CONSISTENCY).then_some(RhythmType::Uneven)
}

pub fn classify_rhythm(cpm: f64, consistency: f64, pause_pattern: PausePattern) -> RhythmType {
    RULES
        .iter()
        .find_map(|rule| rule(cpm, consistency, pause_pattern))
        .unwrap_or(RhythmType::Balanced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PausePattern::*;

    #[test]
    fn test_fast_consistent() {
        assert_eq!(classify_rhythm(150.0, 0.8, Continuous), RhythmType::SteadyFast);
        assert_eq!(classify_rhythm(150.0, 0.8, Choppy), RhythmType::BurstFast);
    }

    #[test]
    fn test_slow_branches() {
        assert_eq!(classify_rhythm(40.0, 0.9, Contemplative), RhythmType::SteadySlow);
        assert_eq!(classify_rhythm(40.0, 0.3, Thoughtful), RhythmType::Hesitant);
        assert_eq!(classify_rhythm(40.0, 0.3, Contemplative), RhythmType::Hesitant);
        assert_eq!(classify_rhythm(40.0, 0.3, Choppy), RhythmType::Labored);
        assert_eq!(classify_rhythm(40.0, 0.3, Continuous), RhythmType::Labored);
    }

    #[test]
    fn test_erratic_fast() {
        assert_eq!(classify_rhythm(200.0, 0.2, Continuous), RhythmType::ErraticFast);
    }

    #[test]
    fn test_medium_speed() {
        assert_eq!(classify_rhythm(90.0, 0.8, Thoughtful), RhythmType::Fluid);
        assert_eq!(classify_rhythm(90.0, 0.6, Thoughtful), RhythmType::Measured);
        assert_eq!(classify_rhythm(90.0, 0.6, Choppy), RhythmType::Uneven);
    }

    #[test]
    fn test_fast_with_middling_consistency_falls_through() {
        // 0.5..=0.7 consistency matches no fast rule
        assert_eq!(classify_rhythm(150.0, 0.6, Continuous), RhythmType::Uneven);
        assert_eq!(classify_rhythm(150.0, 0.6, Thoughtful), RhythmType::Measured);
    }

    #[test]
    fn test_exact_boundaries_fall_through() {
        assert_eq!(classify_rhythm(120.0, 0.8, Continuous), RhythmType::Fluid);
        assert_eq!(classify_rhythm(60.0, 0.3, Thoughtful), RhythmType::Measured);
        assert_eq!(classify_rhythm(150.0, 0.5, Continuous), RhythmType::Uneven);
        assert_eq!(classify_rhythm(150.0, 0.7, Continuous), RhythmType::Balanced);
        assert_eq!(classify_rhythm(90.0, 0.7, Choppy), RhythmType::Balanced);
    }
}
