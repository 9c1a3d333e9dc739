//! Inter-keystroke interval statistics

use crate::types::KeystrokeEvent;

/// Summary statistics over the effective-typing intervals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalStats {
    /// Mean interval in seconds (0 with fewer than two intervals)
    pub avg_interval: f64,
    /// CV-based rhythm consistency, 0-1
    pub consistency: f64,
}

/// Time deltas in seconds between adjacent effective-typing events.
///
/// Deletions and `composition_delete` events are skipped; they neither
/// produce nor break an interval.
pub fn effective_intervals(events: &[KeystrokeEvent]) -> Vec<f64> {
    let timestamps: Vec<u64> = events
        .iter()
        .filter(|e| e.kind.is_effective_typing())
        .map(|e| e.timestamp)
        .collect();

    timestamps
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0]) as f64 / 1000.0)
        .collect()
}

pub fn compute_interval_stats(intervals: &[f64]) -> IntervalStats {
    IntervalStats {
        avg_interval: average_interval(intervals),
        consistency: compute_consistency(intervals),
    }
}

fn average_interval(intervals: &[f64]) -> f64 {
    if intervals.len() < 2 {
        return 0.0;
    }
    intervals.iter().sum::<f64>() / intervals.len() as f64
}

/// Compute rhythm consistency from the coefficient of variation
///
/// Formula: `clamp(1 - cv / 2, 0, 1)` with `cv = sample_stddev / mean`.
/// Scale-invariant: uniformly slow and uniformly fast typists score the same.
fn compute_consistency(intervals: &[f64]) -> f64 {
    if intervals.len() < 2 {
        return 0.0;
    }

    let n = intervals.len() as f64;
    let mean = intervals.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }

    // Shifted-data variance: identical intervals give exactly zero
    let shift = intervals[0];
    let (sum, sum_sq) = intervals.iter().fold((0.0, 0.0), |(s, q), x| {
        let d = x - shift;
        (s + d, q + d * d)
    });
    let variance = ((sum_sq - sum * sum / n) / (n - 1.0)).max(0.0);
    let cv = variance.sqrt() / mean;

    (1.0 - cv / 2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeystrokeKind;
    use pretty_assertions::assert_eq;

    fn event(kind: KeystrokeKind, timestamp: u64) -> KeystrokeEvent {
        KeystrokeEvent::new(kind, "", timestamp, false)
    }

    #[test]
    fn test_intervals_skip_deletions() {
        let events = vec![
            event(KeystrokeKind::Type, 0),
            event(KeystrokeKind::Backspace, 100),
            event(KeystrokeKind::Type, 500),
            event(KeystrokeKind::CompositionDelete, 600),
            event(KeystrokeKind::Composition, 800),
            event(KeystrokeKind::CompositionConfirm, 1_800),
        ];
        assert_eq!(effective_intervals(&events), vec![0.5, 0.3, 1.0]);
    }

    #[test]
    fn test_intervals_need_two_effective_events() {
        let events = vec![
            event(KeystrokeKind::Type, 0),
            event(KeystrokeKind::Delete, 100),
        ];
        assert!(effective_intervals(&events).is_empty());
    }

    #[test]
    fn test_equal_intervals_are_fully_consistent() {
        let stats = compute_interval_stats(&[0.2; 8]);
        assert_eq!(stats.consistency, 1.0);
        assert!((stats.avg_interval - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_short_sequences_yield_zero() {
        assert_eq!(compute_interval_stats(&[]).avg_interval, 0.0);
        assert_eq!(compute_interval_stats(&[]).consistency, 0.0);
        assert_eq!(compute_interval_stats(&[0.4]).avg_interval, 0.0);
        assert_eq!(compute_interval_stats(&[0.4]).consistency, 0.0);
    }

    #[test]
    fn test_zero_mean_yields_zero_consistency() {
        assert_eq!(compute_consistency(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_consistency_uses_sample_variance() {
        // mean 0.2, sample variance ((0.1)^2 + (0.1)^2) / 1 = 0.02
        let consistency = compute_consistency(&[0.1, 0.3]);
        let expected = 1.0 - (0.02f64.sqrt() / 0.2) / 2.0;
        assert!((consistency - expected).abs() < 1e-9);
    }

    #[test]
    fn test_high_variance_clamps_to_zero() {
        let mut intervals = vec![0.01; 9];
        intervals.push(100.0);
        let consistency = compute_consistency(&intervals);
        assert_eq!(consistency, 0.0);
    }

    #[test]
    fn test_consistency_bounded() {
        let samples: [&[f64]; 4] = [
            &[0.1, 0.2, 0.3],
            &[5.0, 0.1],
            &[0.15, 0.15, 0.16, 0.14],
            &[1.0, 100.0, 1.0, 100.0],
        ];
        for intervals in samples {
            let c = compute_consistency(intervals);
            assert!((0.0..=1.0).contains(&c), "{c} out of range");
        }
    }
}
