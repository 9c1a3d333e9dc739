//! Core data types
//!
//! This module defines the keystroke events recorded during a text-entry session
//! and the report structure produced by the rhythm analyzer. Field names and enum
//! labels are a stable contract with downstream consumers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RhythmError;

/// Kind of a recorded input action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeystrokeKind {
    Type,
    Backspace,
    Delete,
    Composition,
    CompositionDelete,
    CompositionConfirm,
}

impl KeystrokeKind {
    /// Events that contribute a visible character and therefore a typing interval
    pub fn is_effective_typing(self) -> bool {
        matches!(
            self,
            KeystrokeKind::Type | KeystrokeKind::Composition | KeystrokeKind::CompositionConfirm
        )
    }

    /// User deletions of committed text. IME-internal retypes are not deletions.
    pub fn is_deletion(self) -> bool {
        matches!(self, KeystrokeKind::Backspace | KeystrokeKind::Delete)
    }

    /// Events produced by an input method composition
    pub fn is_composition(self) -> bool {
        matches!(
            self,
            KeystrokeKind::Composition
                | KeystrokeKind::CompositionDelete
                | KeystrokeKind::CompositionConfirm
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeystrokeKind::Type => "type",
            KeystrokeKind::Backspace => "backspace",
            KeystrokeKind::Delete => "delete",
            KeystrokeKind::Composition => "composition",
            KeystrokeKind::CompositionDelete => "composition_delete",
            KeystrokeKind::CompositionConfirm => "composition_confirm",
        }
    }
}

impl fmt::Display for KeystrokeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeystrokeKind {
    type Err = RhythmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" => Ok(KeystrokeKind::Type),
            "backspace" => Ok(KeystrokeKind::Backspace),
            "delete" => Ok(KeystrokeKind::Delete),
            "composition" => Ok(KeystrokeKind::Composition),
            "composition_delete" => Ok(KeystrokeKind::CompositionDelete),
            "composition_confirm" => Ok(KeystrokeKind::CompositionConfirm),
            other => Err(RhythmError::ParseError(format!(
                "Unknown keystroke kind: {other}"
            ))),
        }
    }
}

/// A single recorded input action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    /// Event kind
    pub kind: KeystrokeKind,
    /// Character produced, empty for deletions
    #[serde(rename = "char", default)]
    pub ch: String,
    /// Milliseconds since the session-relative epoch
    pub timestamp: u64,
    /// Whether the event came from an input method composition
    #[serde(default)]
    pub is_ime: bool,
}

impl KeystrokeEvent {
    /// Create an event, tagging composition kinds as IME regardless of the flag
    pub fn new(kind: KeystrokeKind, ch: impl Into<String>, timestamp: u64, is_ime: bool) -> Self {
        Self {
            kind,
            ch: ch.into(),
            timestamp,
            is_ime: is_ime || kind.is_composition(),
        }
    }
}

/// Pause behavior label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PausePattern {
    /// No significant pauses
    Continuous,
    /// Short pauses (2-5s) only
    Choppy,
    /// Medium pauses (5-15s), no long ones
    Thoughtful,
    /// At least one long pause (15s+)
    Contemplative,
}

impl PausePattern {
    pub fn as_str(self) -> &'static str {
        match self {
            PausePattern::Continuous => "continuous",
            PausePattern::Choppy => "choppy",
            PausePattern::Thoughtful => "thoughtful",
            PausePattern::Contemplative => "contemplative",
        }
    }

    /// Cognitive reading of the pause pattern
    pub fn interpretation(self) -> &'static str {
        match self {
            PausePattern::Continuous => "Fluent thought flow, minimal cognitive interruption",
            PausePattern::Choppy => "Word-by-word consideration, careful expression",
            PausePattern::Thoughtful => "Sentence-level planning, concept organization",
            PausePattern::Contemplative => "Deep reflection, complex decision-making",
        }
    }
}

impl fmt::Display for PausePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall rhythm classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhythmType {
    SteadyFast,
    BurstFast,
    ErraticFast,
    SteadySlow,
    Hesitant,
    Labored,
    Fluid,
    Measured,
    Uneven,
    Balanced,
}

impl RhythmType {
    pub fn as_str(self) -> &'static str {
        match self {
            RhythmType::SteadyFast => "steady_fast",
            RhythmType::BurstFast => "burst_fast",
            RhythmType::ErraticFast => "erratic_fast",
            RhythmType::SteadySlow => "steady_slow",
            RhythmType::Hesitant => "hesitant",
            RhythmType::Labored => "labored",
            RhythmType::Fluid => "fluid",
            RhythmType::Measured => "measured",
            RhythmType::Uneven => "uneven",
            RhythmType::Balanced => "balanced",
        }
    }

    /// Cognitive reading of the rhythm type
    pub fn interpretation(self) -> &'static str {
        match self {
            RhythmType::SteadyFast => "Confident expression, clear thinking, skilled typing",
            RhythmType::BurstFast => "Inspiration surge, emotional arousal, creative flow",
            RhythmType::ErraticFast => "Agitation, rushing, emotional turbulence",
            RhythmType::SteadySlow => "Careful consideration, deliberate expression",
            RhythmType::Hesitant => "Uncertainty, exploration, searching for words",
            RhythmType::Labored => "Difficulty, fatigue, cognitive strain",
            RhythmType::Fluid => "Flow state, natural expression, engaged focus",
            RhythmType::Measured => "Analytical thinking, careful word choice",
            RhythmType::Uneven => "Distraction, interruption, divided attention",
            RhythmType::Balanced => "Neutral, baseline typing pattern",
        }
    }
}

impl fmt::Display for RhythmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical fluency level derived from the fluency score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluencyLevel {
    VeryFluent,
    Fluent,
    Normal,
    Hesitant,
}

impl FluencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FluencyLevel::VeryFluent => "very_fluent",
            FluencyLevel::Fluent => "fluent",
            FluencyLevel::Normal => "normal",
            FluencyLevel::Hesitant => "hesitant",
        }
    }
}

impl fmt::Display for FluencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural rhythm of the final text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRhythmCategory {
    Concise,
    Staccato,
    Flowing,
    Complex,
    Punctuated,
    Balanced,
}

impl TextRhythmCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TextRhythmCategory::Concise => "concise",
            TextRhythmCategory::Staccato => "staccato",
            TextRhythmCategory::Flowing => "flowing",
            TextRhythmCategory::Complex => "complex",
            TextRhythmCategory::Punctuated => "punctuated",
            TextRhythmCategory::Balanced => "balanced",
        }
    }
}

/// Detected input modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputModality {
    Direct,
    Ime,
}

impl InputModality {
    pub fn as_str(self) -> &'static str {
        match self {
            InputModality::Direct => "direct",
            InputModality::Ime => "ime",
        }
    }
}

/// Severity of a single hesitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HesitationSeverity {
    /// 3-5 seconds
    Medium,
    /// 5-10 seconds
    Long,
    /// 10 seconds or more
    VeryLong,
}

/// Pause bucket counts and the derived pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseSummary {
    pub short_pauses: u32,
    pub medium_pauses: u32,
    pub long_pauses: u32,
    pub pattern: PausePattern,
}

/// Sentence and punctuation features of the final text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRhythm {
    pub sentence_count: u32,
    pub avg_sentence_length: f64,
    pub punctuation_rate: f64,
    pub rhythm_category: TextRhythmCategory,
}

/// A maximal run of fast keystroke intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstSegment {
    /// Index of the first interval in the run
    pub start_index: usize,
    /// Number of intervals in the run
    pub length: usize,
    /// Keys per second across the run
    pub avg_speed: f64,
}

/// A single hesitation point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hesitation {
    /// Interval index
    pub location: usize,
    /// Interval duration in seconds
    pub duration: f64,
    pub severity: HesitationSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPatternType {
    Consecutive,
}

/// A notable deletion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionPattern {
    #[serde(rename = "type")]
    pub pattern_type: DeletionPatternType,
    pub length: u32,
}

/// One entry of the echoed event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    #[serde(rename = "type")]
    pub kind: KeystrokeKind,
    #[serde(rename = "char")]
    pub ch: String,
    /// Seconds since session start
    pub time: f64,
}

/// Rhythm report for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// When the report was produced (RFC3339)
    pub timestamp: String,
    pub duration_seconds: f64,
    pub chars_per_minute: f64,
    pub pause_pattern: PauseSummary,
    pub consistency: f64,
    pub text_rhythm: TextRhythm,
    pub rhythm_type: RhythmType,

    pub total_keystrokes: u32,
    pub actual_chars: u32,
    pub keystroke_ratio: f64,
    pub avg_interval: f64,

    pub deletion_count: u32,
    pub deletion_ratio: f64,
    pub deletion_patterns: Vec<DeletionPattern>,

    pub burst_count: u32,
    pub burst_segments: Vec<BurstSegment>,
    pub max_burst_speed: f64,

    pub hesitation_count: u32,
    pub hesitation_locations: Vec<usize>,
    pub hesitations: Vec<Hesitation>,

    pub fluency_score: f64,
    pub fluency_level: FluencyLevel,

    pub detected_modality: InputModality,
    pub ime_events: u32,
    pub ime_event_ratio: f64,

    pub typing_trajectory: Vec<TrajectoryPoint>,
}
