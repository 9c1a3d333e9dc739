//! Analyzer thresholds
//!
//! Interval thresholds used by pause classification, hesitation mapping, burst
//! segmentation and modality detection. The fluency weights and the rhythm/text
//! decision tables are fixed and intentionally not part of this config.

use serde::{Deserialize, Serialize};

use crate::error::RhythmError;

/// Short pause lower bound in seconds
pub const SHORT_PAUSE_MIN_SEC: f64 = 2.0;
/// Medium pause lower bound in seconds
pub const MEDIUM_PAUSE_MIN_SEC: f64 = 5.0;
/// Long pause lower bound in seconds
pub const LONG_PAUSE_MIN_SEC: f64 = 15.0;
/// Interval at or above which a keystroke gap counts as a hesitation
pub const HESITATION_THRESHOLD_SEC: f64 = 3.0;
/// Intervals strictly below this extend a burst (150ms)
pub const BURST_INTERVAL_MAX_SEC: f64 = 0.15;
/// Minimum run length for a burst segment
pub const BURST_MIN_LENGTH: usize = 5;
/// IME event share above which a session is considered IME-composed
pub const IME_EVENT_RATIO_THRESHOLD: f64 = 0.3;
/// Minimum consecutive deletions reported as a deletion pattern
pub const CONSECUTIVE_DELETION_MIN: u32 = 3;

/// Thresholds for the rhythm analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    pub short_pause_min_sec: f64,
    pub medium_pause_min_sec: f64,
    pub long_pause_min_sec: f64,
    pub hesitation_threshold_sec: f64,
    pub burst_interval_max_sec: f64,
    pub burst_min_length: usize,
    pub ime_event_ratio_threshold: f64,
    pub consecutive_deletion_min: u32,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            short_pause_min_sec: SHORT_PAUSE_MIN_SEC,
            medium_pause_min_sec: MEDIUM_PAUSE_MIN_SEC,
            long_pause_min_sec: LONG_PAUSE_MIN_SEC,
            hesitation_threshold_sec: HESITATION_THRESHOLD_SEC,
            burst_interval_max_sec: BURST_INTERVAL_MAX_SEC,
            burst_min_length: BURST_MIN_LENGTH,
            ime_event_ratio_threshold: IME_EVENT_RATIO_THRESHOLD,
            consecutive_deletion_min: CONSECUTIVE_DELETION_MIN,
        }
    }
}

impl RhythmConfig {
    /// Load a config from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, RhythmError> {
        let config: RhythmConfig = serde_json::from_str(json)
            .map_err(|e| RhythmError::InvalidConfig(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, RhythmError> {
        serde_json::to_string_pretty(self).map_err(RhythmError::JsonError)
    }

    /// Check that pause bounds increase and burst limits are positive
    pub fn validate(&self) -> Result<(), RhythmError> {
        if !(self.short_pause_min_sec > 0.0
            && self.short_pause_min_sec < self.medium_pause_min_sec
            && self.medium_pause_min_sec < self.long_pause_min_sec)
        {
            return Err(RhythmError::InvalidConfig(format!(
                "Pause bounds must be positive and strictly increasing (got {}, {}, {})",
                self.short_pause_min_sec, self.medium_pause_min_sec, self.long_pause_min_sec
            )));
        }
        if self.hesitation_threshold_sec <= 0.0 {
            return Err(RhythmError::InvalidConfig(
                "hesitation_threshold_sec must be positive".to_string(),
            ));
        }
        if self.burst_interval_max_sec <= 0.0 || self.burst_min_length == 0 {
            return Err(RhythmError::InvalidConfig(
                "Burst interval and minimum length must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ime_event_ratio_threshold) {
            return Err(RhythmError::InvalidConfig(
                "ime_event_ratio_threshold must be within 0-1".to_string(),
            ));
        }
        Ok(())
    }
}
