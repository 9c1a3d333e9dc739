//! Rhythm pipeline orchestration
//!
//! This module provides the public API for rhythm analysis. It runs every
//! feature component over a frozen session and assembles the report.

use chrono::Utc;
use tracing::debug;

use crate::analysis::{
    analyze_deletions, analyze_text_rhythm, classify_pauses, classify_rhythm,
    compute_fluency, compute_interval_stats, detect_bursts, detect_modality,
    effective_intervals, map_hesitations,
};
use crate::config::RhythmConfig;
use crate::error::RhythmError;
use crate::session::{FrozenSession, SessionLog};
use crate::types::{BurstSegment, Hesitation, Report, TextRhythm, TrajectoryPoint};

/// Analyze a session log JSON and return report JSON (stateless, one-shot).
///
/// # Arguments
/// * `log_json` - Recorded session log (see [`SessionLog`])
///
/// # Returns
/// Report JSON string
///
/// # Example
/// ```ignore
/// let report_json = analyze_session_json(log_json)?;
/// ```
pub fn analyze_session_json(log_json: String) -> Result<String, RhythmError> {
    RhythmAnalyzer::default().analyze_json(&log_json)
}

/// Analyze a frozen session with the default thresholds
pub fn analyze_session(session: &FrozenSession) -> Report {
    RhythmAnalyzer::default().analyze(session)
}

/// Report assembler holding the analyzer thresholds
#[derive(Debug, Clone, Default)]
pub struct RhythmAnalyzer {
    config: RhythmConfig,
}

impl RhythmAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom thresholds
    pub fn with_config(config: RhythmConfig) -> Result<Self, RhythmError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RhythmConfig {
        &self.config
    }

    /// Parse, freeze and analyze a session log, returning pretty report JSON
    pub fn analyze_json(&self, log_json: &str) -> Result<String, RhythmError> {
        // Stage 1: Parse the log
        let log = SessionLog::parse(log_json)?;

        // Stage 2: Validate and freeze
        let session = log.into_frozen()?;

        // Stage 3: Analyze
        let report = self.analyze(&session);

        // Stage 4: Encode
        serde_json::to_string_pretty(&report).map_err(RhythmError::JsonError)
    }

    /// Produce the rhythm report for a frozen session
    pub fn analyze(&self, session: &FrozenSession) -> Report {
        let config = &self.config;
        let events = session.events();
        let text = session.final_text();

        let duration_sec = session.duration_sec();
        let total_keystrokes = events.len();
        let actual_chars = text.chars().count();
        let cpm = if duration_sec > 0.0 {
            actual_chars as f64 / duration_sec * 60.0
        } else {
            0.0
        };

        // Timing features
        let intervals = effective_intervals(events);
        let stats = compute_interval_stats(&intervals);
        let pauses = classify_pauses(&intervals, config);
        let hesitations = map_hesitations(&intervals, config);
        let bursts = detect_bursts(&intervals, config);
        debug!(
            intervals = intervals.len(),
            consistency = stats.consistency,
            pattern = %pauses.pattern,
            bursts = bursts.segments.len(),
            "Timing features derived"
        );

        // Event-count features
        let deletions = analyze_deletions(events, config);
        let modality = detect_modality(events, actual_chars, config);

        // Text features
        let text_rhythm = analyze_text_rhythm(text);

        // Composite scores
        let fluency = compute_fluency(
            stats.consistency,
            deletions.deletion_ratio,
            &pauses,
            hesitations.count,
        );
        let rhythm_type = classify_rhythm(cpm, stats.consistency, pauses.pattern);
        debug!(
            cpm,
            fluency = fluency.score,
            rhythm_type = %rhythm_type,
            "Composite scores derived"
        );

        let burst_segments: Vec<BurstSegment> = bursts
            .segments
            .iter()
            .map(|s| BurstSegment {
                avg_speed: round_to(s.avg_speed, 1),
                ..s.clone()
            })
            .collect();
        let max_burst_speed = round_to(bursts.max_burst_speed, 1);

        let start_time = session.start_time();
        let typing_trajectory = events
            .iter()
            .map(|e| TrajectoryPoint {
                kind: e.kind,
                ch: e.ch.clone(),
                time: e.timestamp.saturating_sub(start_time) as f64 / 1000.0,
            })
            .collect();

        Report {
            timestamp: Utc::now().to_rfc3339(),
            duration_seconds: round_to(duration_sec, 2),
            chars_per_minute: round_to(cpm, 1),
            pause_pattern: pauses,
            consistency: round_to(stats.consistency, 3),
            text_rhythm: TextRhythm {
                avg_sentence_length: round_to(text_rhythm.avg_sentence_length, 1),
                punctuation_rate: round_to(text_rhythm.punctuation_rate, 3),
                ..text_rhythm
            },
            rhythm_type,
            total_keystrokes: total_keystrokes as u32,
            actual_chars: actual_chars as u32,
            keystroke_ratio: round_to(modality.keystroke_ratio, 2),
            avg_interval: round_to(stats.avg_interval, 3),
            deletion_count: deletions.deletion_count,
            deletion_ratio: round_to(deletions.deletion_ratio, 3),
            deletion_patterns: deletions.patterns,
            burst_count: bursts.burst_count(),
            burst_segments,
            max_burst_speed,
            hesitation_count: hesitations.count,
            hesitation_locations: hesitations.locations,
            hesitations: hesitations
                .hesitations
                .into_iter()
                .map(|h| Hesitation {
                    duration: round_to(h.duration, 2),
                    ..h
                })
                .collect(),
            fluency_score: round_to(fluency.score, 3),
            fluency_level: fluency.level,
            detected_modality: modality.detected_modality,
            ime_events: modality.ime_events,
            ime_event_ratio: round_to(modality.ime_event_ratio, 3),
            typing_trajectory,
        }
    }
}

/// Round to a fixed number of decimal places for reporting
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        FluencyLevel, InputModality, KeystrokeEvent, KeystrokeKind, PausePattern, RhythmType,
    };
    use pretty_assertions::assert_eq;

    fn typed_session(text: &str, step_ms: u64) -> FrozenSession {
        let events: Vec<KeystrokeEvent> = text
            .chars()
            .enumerate()
            .map(|(i, c)| {
                KeystrokeEvent::new(KeystrokeKind::Type, c.to_string(), i as u64 * step_ms, false)
            })
            .collect();
        let end = events.last().map_or(0, |e| e.timestamp);
        FrozenSession::new(0, end, events, text).unwrap()
    }

    fn sample_log_json() -> &'static str {
        r#"{
            "start_time": 0,
            "end_time": 1600,
            "final_text": "Hi there!",
            "events": [
                { "kind": "type", "char": "H", "timestamp": 0 },
                { "kind": "type", "char": "i", "timestamp": 200 },
                { "kind": "type", "char": " ", "timestamp": 400 },
                { "kind": "type", "char": "t", "timestamp": 600 },
                { "kind": "type", "char": "h", "timestamp": 800 },
                { "kind": "type", "char": "e", "timestamp": 1000 },
                { "kind": "type", "char": "r", "timestamp": 1200 },
                { "kind": "type", "char": "e", "timestamp": 1400 },
                { "kind": "type", "char": "!", "timestamp": 1600 }
            ]
        }"#
    }

    #[test]
    fn test_even_typing_end_to_end() {
        let report = analyze_session(&typed_session("Hi there!", 200));

        assert_eq!(report.total_keystrokes, 9);
        assert_eq!(report.actual_chars, 9);
        assert_eq!(report.consistency, 1.0);
        assert_eq!(report.avg_interval, 0.2);
        assert_eq!(report.burst_count, 0);
        assert_eq!(report.deletion_count, 0);
        assert_eq!(report.deletion_ratio, 0.0);
        assert_eq!(
            (
                report.pause_pattern.short_pauses,
                report.pause_pattern.medium_pauses,
                report.pause_pattern.long_pauses
            ),
            (0, 0, 0)
        );
        assert_eq!(report.pause_pattern.pattern, PausePattern::Continuous);
        assert_eq!(report.fluency_score, 1.0);
        assert_eq!(report.fluency_level, FluencyLevel::VeryFluent);
        assert_eq!(report.detected_modality, InputModality::Direct);
        assert_eq!(report.keystroke_ratio, 1.0);

        // 9 chars in 1.6s = 337.5 cpm, fully consistent, no pauses
        assert_eq!(report.duration_seconds, 1.6);
        assert_eq!(report.chars_per_minute, 337.5);
        assert_eq!(report.rhythm_type, RhythmType::SteadyFast);
    }

    #[test]
    fn test_analyze_session_json() {
        let json = analyze_session_json(sample_log_json().to_string()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(report["rhythm_type"], "steady_fast");
        assert_eq!(report["fluency_level"], "very_fluent");
        assert_eq!(report["pause_pattern"]["pattern"], "continuous");
        assert_eq!(report["text_rhythm"]["rhythm_category"], "staccato");
        assert_eq!(report["text_rhythm"]["punctuation_rate"], 0.111);
        assert_eq!(report["detected_modality"], "direct");
        assert_eq!(report["typing_trajectory"][8]["type"], "type");
        assert_eq!(report["typing_trajectory"][8]["char"], "!");
        assert_eq!(report["typing_trajectory"][8]["time"], 1.6);
        assert!(report["timestamp"].is_string());
        assert!(report["hesitation_locations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_slow_hesitant_session() {
        // intervals: 0.3, 6.0, 0.4, 4.0, 0.2
        let stamps = [0u64, 300, 6_300, 6_700, 10_700, 10_900];
        let events: Vec<KeystrokeEvent> = stamps
            .iter()
            .map(|&t| KeystrokeEvent::new(KeystrokeKind::Type, "a", t, false))
            .collect();
        let session = FrozenSession::new(0, 12_000, events, "aaaaaa").unwrap();

        let report = analyze_session(&session);
        assert_eq!(report.pause_pattern.short_pauses, 1);
        assert_eq!(report.pause_pattern.medium_pauses, 1);
        assert_eq!(report.pause_pattern.pattern, PausePattern::Thoughtful);
        assert_eq!(report.hesitation_count, 2);
        assert_eq!(report.hesitation_locations, vec![1, 3]);
        assert_eq!(report.hesitations[0].duration, 6.0);
        // 6 chars in 12s = 30 cpm with very uneven intervals
        assert_eq!(report.chars_per_minute, 30.0);
        assert!(report.consistency < 0.5);
        assert_eq!(report.rhythm_type, RhythmType::Hesitant);
    }

    #[test]
    fn test_burst_session() {
        let report = analyze_session(&typed_session("abcdefg", 100));
        assert_eq!(report.burst_count, 1);
        assert_eq!(report.burst_segments[0].length, 6);
        assert_eq!(report.burst_segments[0].avg_speed, 10.0);
        assert_eq!(report.max_burst_speed, 10.0);
    }

    #[test]
    fn test_ime_session() {
        let mut events = Vec::new();
        for i in 0..18u64 {
            events.push(KeystrokeEvent::new(KeystrokeKind::Composition, "n", i * 150, true));
        }
        events.push(KeystrokeEvent::new(KeystrokeKind::CompositionDelete, "", 2_800, true));
        events.push(KeystrokeEvent::new(KeystrokeKind::CompositionConfirm, "好", 3_000, true));
        let session = FrozenSession::new(0, 3_000, events, "你好世界朋友").unwrap();

        let report = analyze_session(&session);
        assert_eq!(report.total_keystrokes, 20);
        assert_eq!(report.keystroke_ratio, 3.33);
        assert_eq!(report.ime_events, 20);
        assert_eq!(report.ime_event_ratio, 1.0);
        assert_eq!(report.detected_modality, InputModality::Ime);
        assert_eq!(report.deletion_count, 0);
    }

    #[test]
    fn test_deletion_session() {
        let kinds = [
            KeystrokeKind::Type,
            KeystrokeKind::Type,
            KeystrokeKind::Backspace,
            KeystrokeKind::Backspace,
            KeystrokeKind::Backspace,
            KeystrokeKind::Type,
            KeystrokeKind::Type,
            KeystrokeKind::Type,
        ];
        let events: Vec<KeystrokeEvent> = kinds
            .iter()
            .enumerate()
            .map(|(i, &k)| KeystrokeEvent::new(k, "", i as u64 * 250, false))
            .collect();
        let session = FrozenSession::new(0, 2_000, events, "abc").unwrap();

        let report = analyze_session(&session);
        assert_eq!(report.deletion_count, 3);
        assert_eq!(report.deletion_ratio, 0.375);
        assert_eq!(report.deletion_patterns.len(), 1);
        assert_eq!(report.deletion_patterns[0].length, 3);
        assert!(report.deletion_count <= report.total_keystrokes);
    }

    #[test]
    fn test_zero_duration_session() {
        let events = vec![
            KeystrokeEvent::new(KeystrokeKind::Composition, "a", 0, true),
            KeystrokeEvent::new(KeystrokeKind::Composition, "b", 0, true),
        ];
        let session = FrozenSession::new(0, 0, events, "ab").unwrap();
        let report = analyze_session(&session);
        assert_eq!(report.chars_per_minute, 0.0);
        assert_eq!(report.avg_interval, 0.0);
        assert_eq!(report.consistency, 0.0);
    }

    #[test]
    fn test_insufficient_input_json() {
        let json = r#"{ "final_text": "", "events": [
            { "kind": "type", "char": "a", "timestamp": 0 },
            { "kind": "backspace", "char": "", "timestamp": 100 }
        ] }"#;
        let result = analyze_session_json(json.to_string());
        assert!(matches!(result, Err(RhythmError::InsufficientInput(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(analyze_session_json("not valid json".to_string()).is_err());
    }

    #[test]
    fn test_custom_config() {
        let config = RhythmConfig {
            burst_min_length: 3,
            ..RhythmConfig::default()
        };
        let analyzer = RhythmAnalyzer::with_config(config).unwrap();
        let report = analyzer.analyze(&typed_session("abcd", 100));
        assert_eq!(report.burst_count, 1);

        let invalid = RhythmConfig {
            burst_interval_max_sec: 0.0,
            ..RhythmConfig::default()
        };
        assert!(RhythmAnalyzer::with_config(invalid).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.333_333, 2), 3.33);
        assert_eq!(round_to(0.111_111, 3), 0.111);
        assert_eq!(round_to(337.5, 1), 337.5);
    }
}
