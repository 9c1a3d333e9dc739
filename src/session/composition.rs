//! IME composition delta tracking
//!
//! Input methods report the whole composition buffer on every update
//! ("n" → "ni" → "nih" → "ni"). The tracker diffs each buffer against the
//! previous one and turns the change into per-character composition events,
//! so the recorded log reflects the keystrokes the user actually made.

use crate::types::KeystrokeKind;

/// A synthesized per-character composition event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionEdit {
    pub kind: KeystrokeKind,
    pub ch: String,
}

impl CompositionEdit {
    fn new(kind: KeystrokeKind, ch: char) -> Self {
        Self {
            kind,
            ch: ch.to_string(),
        }
    }
}

/// Tracks the in-progress composition buffer for one session
#[derive(Debug, Clone, Default)]
pub struct CompositionTracker {
    previous_buffer: String,
}

impl CompositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current composition buffer
    pub fn buffer(&self) -> &str {
        &self.previous_buffer
    }

    pub fn is_composing(&self) -> bool {
        !self.previous_buffer.is_empty()
    }

    /// Diff a new buffer against the previous one.
    ///
    /// Characters past the common prefix that disappeared become
    /// `composition_delete` events (last character first, as a backspace would
    /// remove them); new characters become `composition` events.
    pub fn update(&mut self, buffer: &str) -> Vec<CompositionEdit> {
        let prefix_len = self
            .previous_buffer
            .chars()
            .zip(buffer.chars())
            .take_while(|(a, b)| a == b)
            .count();

        let mut edits: Vec<CompositionEdit> = self
            .previous_buffer
            .chars()
            .skip(prefix_len)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|c| CompositionEdit::new(KeystrokeKind::CompositionDelete, c))
            .collect();

        edits.extend(
            buffer
                .chars()
                .skip(prefix_len)
                .map(|c| CompositionEdit::new(KeystrokeKind::Composition, c)),
        );

        self.previous_buffer = buffer.to_string();
        edits
    }

    /// Commit the composition; one `composition_confirm` per committed character
    pub fn commit(&mut self, committed: &str) -> Vec<CompositionEdit> {
        self.previous_buffer.clear();
        committed
            .chars()
            .map(|c| CompositionEdit::new(KeystrokeKind::CompositionConfirm, c))
            .collect()
    }

    /// Abandon the composition, deleting whatever was still buffered
    pub fn cancel(&mut self) -> Vec<CompositionEdit> {
        self.update("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(edits: &[CompositionEdit]) -> Vec<(KeystrokeKind, &str)> {
        edits.iter().map(|e| (e.kind, e.ch.as_str())).collect()
    }

    #[test]
    fn test_growing_buffer_emits_additions() {
        let mut tracker = CompositionTracker::new();
        assert_eq!(
            kinds(&tracker.update("n")),
            vec![(KeystrokeKind::Composition, "n")]
        );
        assert_eq!(
            kinds(&tracker.update("ni")),
            vec![(KeystrokeKind::Composition, "i")]
        );
        assert_eq!(tracker.buffer(), "ni");
        assert!(tracker.is_composing());
    }

    #[test]
    fn test_shrinking_buffer_emits_deletions() {
        let mut tracker = CompositionTracker::new();
        tracker.update("nih");
        assert_eq!(
            kinds(&tracker.update("ni")),
            vec![(KeystrokeKind::CompositionDelete, "h")]
        );
    }

    #[test]
    fn test_replaced_suffix_deletes_then_adds() {
        let mut tracker = CompositionTracker::new();
        tracker.update("nihao");
        assert_eq!(
            kinds(&tracker.update("nihen")),
            vec![
                (KeystrokeKind::CompositionDelete, "o"),
                (KeystrokeKind::CompositionDelete, "a"),
                (KeystrokeKind::Composition, "e"),
                (KeystrokeKind::Composition, "n"),
            ]
        );
    }

    #[test]
    fn test_unchanged_buffer_emits_nothing() {
        let mut tracker = CompositionTracker::new();
        tracker.update("ni");
        assert!(tracker.update("ni").is_empty());
    }

    #[test]
    fn test_commit_confirms_each_character_and_resets() {
        let mut tracker = CompositionTracker::new();
        tracker.update("nihao");
        assert_eq!(
            kinds(&tracker.commit("你好")),
            vec![
                (KeystrokeKind::CompositionConfirm, "你"),
                (KeystrokeKind::CompositionConfirm, "好"),
            ]
        );
        assert!(!tracker.is_composing());
        assert_eq!(
            kinds(&tracker.update("w")),
            vec![(KeystrokeKind::Composition, "w")]
        );
    }

    #[test]
    fn test_cancel_deletes_buffer() {
        let mut tracker = CompositionTracker::new();
        tracker.update("ab");
        assert_eq!(
            kinds(&tracker.cancel()),
            vec![
                (KeystrokeKind::CompositionDelete, "b"),
                (KeystrokeKind::CompositionDelete, "a"),
            ]
        );
        assert!(!tracker.is_composing());
    }
}
