//! Session recording
//!
//! A [`SessionHandle`] owns the mutable side of a monitoring run: the growing
//! event log and the IME composition tracker. Finishing the handle moves the
//! log into an immutable [`FrozenSession`], which is the only thing the
//! analyzer ever sees.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::RhythmError;
use crate::pipeline::RhythmAnalyzer;
use crate::session::composition::{CompositionEdit, CompositionTracker};
use crate::types::{KeystrokeEvent, KeystrokeKind, Report};

/// Minimum number of events required for analysis
pub const MIN_EVENTS: usize = 2;

/// Source of session-relative timestamps in milliseconds
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Monotonic wall clock whose epoch is the moment it was created
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Manually driven clock for replay and tests. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Check the minimum-input guard shared by live and replayed sessions
pub(crate) fn check_minimum_input(event_count: usize, final_text: &str) -> Result<(), RhythmError> {
    if event_count < MIN_EVENTS {
        warn!(event_count, "Rejected session with too few events");
        return Err(RhythmError::InsufficientInput(format!(
            "At least {MIN_EVENTS} events are required, got {event_count}"
        )));
    }
    if final_text.trim().is_empty() {
        warn!("Rejected session with blank final text");
        return Err(RhythmError::InsufficientInput(
            "Final text is empty".to_string(),
        ));
    }
    Ok(())
}

/// Append-only event log under construction
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    start_time: u64,
    events: Vec<KeystrokeEvent>,
    composition: CompositionTracker,
}

impl SessionBuilder {
    pub fn new(start_time: u64) -> Self {
        Self {
            start_time,
            events: Vec::new(),
            composition: CompositionTracker::new(),
        }
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn events(&self) -> &[KeystrokeEvent] {
        &self.events
    }

    pub fn composition(&self) -> &CompositionTracker {
        &self.composition
    }

    /// Append an event, clamping timestamps that would go backwards
    pub fn push(&mut self, kind: KeystrokeKind, ch: &str, is_ime: bool, timestamp: u64) {
        let floor = self
            .events
            .last()
            .map_or(self.start_time, |e| e.timestamp);
        let timestamp = if timestamp < floor {
            warn!(
                timestamp,
                floor, "Keystroke timestamp went backwards; clamping to previous event"
            );
            floor
        } else {
            timestamp
        };
        self.events
            .push(KeystrokeEvent::new(kind, ch, timestamp, is_ime));
    }

    fn push_edits(&mut self, edits: Vec<CompositionEdit>, timestamp: u64) -> usize {
        let count = edits.len();
        for edit in edits {
            self.push(edit.kind, &edit.ch, true, timestamp);
        }
        count
    }

    pub fn update_composition(&mut self, buffer: &str, timestamp: u64) -> usize {
        let edits = self.composition.update(buffer);
        self.push_edits(edits, timestamp)
    }

    pub fn commit_composition(&mut self, committed: &str, timestamp: u64) -> usize {
        let edits = self.composition.commit(committed);
        self.push_edits(edits, timestamp)
    }

    pub fn cancel_composition(&mut self, timestamp: u64) -> usize {
        let edits = self.composition.cancel();
        self.push_edits(edits, timestamp)
    }

    /// Whether the builder can be frozen with this final text
    pub fn check_ready(&self, final_text: &str) -> Result<(), RhythmError> {
        check_minimum_input(self.events.len(), final_text)
    }

    /// Consume the builder into an immutable snapshot
    pub fn freeze(self, final_text: &str, end_time: u64) -> Result<FrozenSession, RhythmError> {
        self.check_ready(final_text)?;
        let last = self
            .events
            .last()
            .map_or(self.start_time, |e| e.timestamp);
        Ok(FrozenSession {
            start_time: self.start_time,
            end_time: end_time.max(last),
            events: self.events,
            final_text: final_text.to_string(),
        })
    }
}

/// Immutable, fully recorded session handed to the analyzer
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenSession {
    start_time: u64,
    end_time: u64,
    events: Vec<KeystrokeEvent>,
    final_text: String,
}

impl FrozenSession {
    /// Build a snapshot from an already recorded log.
    ///
    /// Rejects logs whose timestamps decrease or precede `start_time`, and applies
    /// the minimum-input guard.
    pub fn new(
        start_time: u64,
        end_time: u64,
        events: Vec<KeystrokeEvent>,
        final_text: impl Into<String>,
    ) -> Result<Self, RhythmError> {
        let final_text = final_text.into();
        check_minimum_input(events.len(), &final_text)?;

        let mut previous = start_time;
        for (index, event) in events.iter().enumerate() {
            if event.timestamp < previous {
                return Err(RhythmError::InvalidEventLog(format!(
                    "Event {index} at {}ms precedes {}ms",
                    event.timestamp, previous
                )));
            }
            previous = event.timestamp;
        }
        if end_time < previous {
            return Err(RhythmError::InvalidEventLog(format!(
                "Session end {end_time}ms precedes last event at {previous}ms"
            )));
        }

        let events = events
            .into_iter()
            .map(|e| KeystrokeEvent::new(e.kind, e.ch, e.timestamp, e.is_ime))
            .collect();

        Ok(Self {
            start_time,
            end_time,
            events,
            final_text,
        })
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn events(&self) -> &[KeystrokeEvent] {
        &self.events
    }

    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    /// Elapsed session time in seconds
    pub fn duration_sec(&self) -> f64 {
        self.end_time.saturating_sub(self.start_time) as f64 / 1000.0
    }
}

enum SessionState {
    Recording(SessionBuilder),
    Finished,
}

/// One monitoring run, from `begin` to `finish`
pub struct SessionHandle<C: Clock = SystemClock> {
    id: Uuid,
    clock: C,
    state: SessionState,
}

impl SessionHandle<SystemClock> {
    /// Start monitoring with the system clock
    pub fn begin() -> Self {
        Self::begin_with_clock(SystemClock::default())
    }
}

impl<C: Clock> SessionHandle<C> {
    /// Start monitoring; the session start time is the clock's current reading
    pub fn begin_with_clock(clock: C) -> Self {
        let id = Uuid::new_v4();
        let start_time = clock.now_ms();
        info!(session_id = %id, start_time, "Rhythm session started");
        Self {
            id,
            clock,
            state: SessionState::Recording(SessionBuilder::new(start_time)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished)
    }

    /// Number of events recorded so far (0 once finished)
    pub fn event_count(&self) -> usize {
        match &self.state {
            SessionState::Recording(builder) => builder.events().len(),
            SessionState::Finished => 0,
        }
    }

    fn builder_mut(&mut self) -> Result<&mut SessionBuilder, RhythmError> {
        match &mut self.state {
            SessionState::Recording(builder) => Ok(builder),
            SessionState::Finished => Err(RhythmError::InvalidState(format!(
                "Session {} is already finished",
                self.id
            ))),
        }
    }

    /// Record an event timestamped now
    pub fn record_event(
        &mut self,
        kind: KeystrokeKind,
        ch: &str,
        is_ime: bool,
    ) -> Result<(), RhythmError> {
        let now = self.clock.now_ms();
        self.record_event_at(kind, ch, is_ime, now)
    }

    /// Record an event with a host-supplied timestamp
    pub fn record_event_at(
        &mut self,
        kind: KeystrokeKind,
        ch: &str,
        is_ime: bool,
        timestamp: u64,
    ) -> Result<(), RhythmError> {
        self.builder_mut()?.push(kind, ch, is_ime, timestamp);
        Ok(())
    }

    /// Feed the current IME composition buffer; returns the number of events recorded
    pub fn update_composition(&mut self, buffer: &str) -> Result<usize, RhythmError> {
        let now = self.clock.now_ms();
        Ok(self.builder_mut()?.update_composition(buffer, now))
    }

    /// Commit the IME composition as `committed`
    pub fn commit_composition(&mut self, committed: &str) -> Result<usize, RhythmError> {
        let now = self.clock.now_ms();
        Ok(self.builder_mut()?.commit_composition(committed, now))
    }

    pub fn cancel_composition(&mut self) -> Result<usize, RhythmError> {
        let now = self.clock.now_ms();
        Ok(self.builder_mut()?.cancel_composition(now))
    }

    /// Freeze the event log.
    ///
    /// On `InsufficientInput` the handle stays open so recording can continue.
    pub fn freeze(&mut self, final_text: &str) -> Result<FrozenSession, RhythmError> {
        self.builder_mut()?.check_ready(final_text)?;
        let end_time = self.clock.now_ms();

        match std::mem::replace(&mut self.state, SessionState::Finished) {
            SessionState::Recording(builder) => {
                debug!(
                    session_id = %self.id,
                    events = builder.events().len(),
                    end_time,
                    "Rhythm session frozen"
                );
                builder.freeze(final_text, end_time)
            }
            SessionState::Finished => Err(RhythmError::InvalidState(format!(
                "Session {} is already finished",
                self.id
            ))),
        }
    }

    /// Finish with the default analyzer
    pub fn finish(&mut self, final_text: &str) -> Result<Report, RhythmError> {
        self.finish_with(&RhythmAnalyzer::default(), final_text)
    }

    pub fn finish_with(
        &mut self,
        analyzer: &RhythmAnalyzer,
        final_text: &str,
    ) -> Result<Report, RhythmError> {
        let session = self.freeze(final_text)?;
        let report = analyzer.analyze(&session);
        info!(
            session_id = %self.id,
            rhythm_type = %report.rhythm_type,
            fluency_level = %report.fluency_level,
            "Rhythm session finished"
        );
        Ok(report)
    }
}
