//! Structural rhythm of the final text
//!
//! Works on the final text alone; no timing is involved.

use crate::types::{TextRhythm, TextRhythmCategory};

/// Sentence terminators, ASCII and full-width
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '。', '！', '？'];

/// Punctuation counted toward the punctuation rate
const PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '，', '。', '！', '？', '；', '：', '～', '~',
];

pub fn analyze_text_rhythm(text: &str) -> TextRhythm {
    let text_len = text.chars().count();

    let sentence_count = text
        .split(SENTENCE_TERMINATORS)
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let avg_sentence_length = text_len as f64 / sentence_count as f64;

    let punctuation_rate = if text_len == 0 {
        0.0
    } else {
        let punctuation = text.chars().filter(|c| PUNCTUATION.contains(c)).count();
        punctuation as f64 / text_len as f64
    };

    TextRhythm {
        sentence_count: sentence_count as u32,
        avg_sentence_length,
        punctuation_rate,
        rhythm_category: categorize(avg_sentence_length, punctuation_rate),
    }
}

fn categorize(length: f64, rate: f64) -> TextRhythmCategory {
    let rules = [
        (length < 20.0 && rate < 0.05, TextRhythmCategory::Concise),
        (length < 20.0 && rate >= 0.05, TextRhythmCategory::Staccato),
        (length >= 50.0 && rate < 0.05, TextRhythmCategory::Flowing),
        (length >= 50.0 && rate >= 0.08, TextRhythmCategory::Complex),
        (rate >= 0.08, TextRhythmCategory::Punctuated),
    ];
    rules
        .into_iter()
        .find_map(|(hit, category)| hit.then_some(category))
        .unwrap_or(TextRhythmCategory::Balanced)
}
