//! Composite fluency scoring

use crate::types::{FluencyLevel, PauseSummary};

const STABILITY_WEIGHT: f64 = 0.30;
const DELETION_WEIGHT: f64 = 0.30;
const PAUSE_WEIGHT: f64 = 0.20;
const HESITATION_WEIGHT: f64 = 0.20;

/// Fluency sub-scores and their weighted combination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluencyScore {
    pub stability: f64,
    pub deletion_score: f64,
    pub pause_score: f64,
    pub hesitation_score: f64,
    pub score: f64,
    pub level: FluencyLevel,
}

/// Compute the fluency score
///
/// Formula:
/// ```text
/// Fluency = 0.30 * consistency
///         + 0.30 * max(0, 1 - 2 * deletion_ratio)
///         + 0.20 * max(0, 1 - (short + 2 * medium + 3 * long) / 10)
///         + 0.20 * max(0, 1 - hesitations / 5)
/// ```
pub fn compute_fluency(
    consistency: f64,
    deletion_ratio: f64,
    pauses: &PauseSummary,
    hesitation_count: u32,
) -> FluencyScore {
    let stability = consistency.clamp(0.0, 1.0);
    let deletion_score = (1.0 - 2.0 * deletion_ratio).clamp(0.0, 1.0);

    let pause_penalty = (pauses.short_pauses as f64
        + 2.0 * pauses.medium_pauses as f64
        + 3.0 * pauses.long_pauses as f64)
        / 10.0;
    let pause_score = (1.0 - pause_penalty).clamp(0.0, 1.0);

    let hesitation_score = (1.0 - hesitation_count as f64 / 5.0).clamp(0.0, 1.0);

    let score = STABILITY_WEIGHT * stability
        + DELETION_WEIGHT * deletion_score
        + PAUSE_WEIGHT * pause_score
        + HESITATION_WEIGHT * hesitation_score;

    FluencyScore {
        stability,
        deletion_score,
        pause_score,
        hesitation_score,
        score,
        level: fluency_level(score),
    }
}

/// Highest threshold first; anything not caught is `normal`
fn fluency_level(score: f64) -> FluencyLevel {
    let rules = [
        (score >= 0.8, FluencyLevel::VeryFluent),
        (score >= 0.6, FluencyLevel::Fluent),
        (score < 0.4, FluencyLevel::Hesitant),
    ];
    rules
        .into_iter()
        .find_map(|(hit, level)| hit.then_some(level))
        .unwrap_or(FluencyLevel::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PausePattern;

    fn pauses(short: u32, medium: u32, long: u32) -> PauseSummary {
        PauseSummary {
            short_pauses: short,
            medium_pauses: medium,
            long_pauses: long,
            pattern: PausePattern::Continuous,
        }
    }

    #[test]
    fn test_perfect_session() {
        let fluency = compute_fluency(1.0, 0.0, &pauses(0, 0, 0), 0);
        assert_eq!(fluency.score, 1.0);
        assert_eq!(fluency.level, FluencyLevel::VeryFluent);
    }

    #[test]
    fn test_weights() {
        let only_stability = compute_fluency(1.0, 0.5, &pauses(0, 0, 4), 5);
        assert!((only_stability.score - 0.3).abs() < 1e-9);
        assert_eq!(only_stability.level, FluencyLevel::Hesitant);

        let no_stability = compute_fluency(0.0, 0.0, &pauses(0, 0, 0), 0);
        assert!((no_stability.score - 0.7).abs() < 1e-9);
        assert_eq!(no_stability.level, FluencyLevel::Fluent);
    }

    #[test]
    fn test_pause_weighting() {
        let fluency = compute_fluency(1.0, 0.0, &pauses(1, 1, 1), 0);
        assert!((fluency.pause_score - 0.4).abs() < 1e-9);

        let floored = compute_fluency(1.0, 0.0, &pauses(0, 0, 5), 0);
        assert_eq!(floored.pause_score, 0.0);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(fluency_level(0.8), FluencyLevel::VeryFluent);
        assert_eq!(fluency_level(0.79), FluencyLevel::Fluent);
        assert_eq!(fluency_level(0.6), FluencyLevel::Fluent);
        assert_eq!(fluency_level(0.59), FluencyLevel::Normal);
        assert_eq!(fluency_level(0.4), FluencyLevel::Normal);
        assert_eq!(fluency_level(0.39), FluencyLevel::Hesitant);
    }

    #[test]
    fn test_monotonic_in_penalties() {
        let base = compute_fluency(0.8, 0.1, &pauses(1, 0, 0), 1).score;

        assert!(compute_fluency(0.8, 0.2, &pauses(1, 0, 0), 1).score <= base);
        assert!(compute_fluency(0.8, 0.1, &pauses(1, 1, 0), 1).score <= base);
        assert!(compute_fluency(0.8, 0.1, &pauses(1, 0, 0), 2).score <= base);

        let mut previous = f64::MAX;
        for hesitations in 0..8 {
            let score = compute_fluency(0.8, 0.1, &pauses(0, 0, 0), hesitations).score;
            assert!(score <= previous);
            previous = score;
        }
    }
}
