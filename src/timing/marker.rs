//! Marker capability and an in-memory recording implementation.
//!
//! The capability mirrors a user-timing API: named marks are placed on a
//! clock, a measure spans from a mark to "now", and both can be cleared.
//! Measures that were taken are also appended to a persistent timeline,
//! which is what a profiler UI would consume.

use super::clock::{Clock, ManualClock, MonotonicClock};
use crate::utils::config::{MEASURE_PREFIX, WARNING_PREFIX};
use crate::utils::error::MarkerError;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-timing style marker API
pub trait MarkerBackend {
    /// Place a mark at the current clock position
    fn mark(&mut self, name: &str);

    /// Drop every mark with this name
    fn clear_marks(&mut self, name: &str);

    /// Record an interval from the latest `start_mark` to now
    fn measure(&mut self, label: &str, start_mark: &str) -> Result<(), MarkerError>;

    /// Drop buffered measures with this label
    fn clear_measures(&mut self, label: &str);
}

/// One call made against a [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerEvent {
    Mark(String),
    ClearMarks(String),
    Measure(String),
    ClearMeasures(String),
}

/// A recorded interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Full label including prefix glyph and warning suffix
    pub label: String,

    /// Start position in microseconds
    pub start_us: u64,

    /// Elapsed microseconds
    pub duration_us: u64,
}

impl Measurement {
    pub fn end_us(&self) -> u64 {
        self.start_us.saturating_add(self.duration_us)
    }

    /// Label without prefix glyph or warning annotation
    pub fn name(&self) -> &str {
        let label = self
            .label
            .strip_prefix(MEASURE_PREFIX)
            .or_else(|| self.label.strip_prefix(WARNING_PREFIX))
            .unwrap_or(&self.label)
            .trim_start();
        match label.find(" Warning: ") {
            Some(pos) => &label[..pos],
            None => label,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        self.label
            .find(" Warning: ")
            .map(|pos| &self.label[pos + " Warning: ".len()..])
    }

    /// Does this interval fully enclose `other`?
    pub fn contains(&self, other: &Measurement) -> bool {
        self.start_us <= other.start_us && other.end_us() <= self.end_us()
    }
}

/// In-memory marker backend
///
/// **Public** - used by the CLI replay and by tests
pub struct RecordingBackend<C: Clock = MonotonicClock> {
    clock: C,
    marks: HashMap<String, Vec<u64>>,
    buffer: Vec<Measurement>,
    timeline: Vec<Measurement>,
    events: Vec<MarkerEvent>,
    log_events: bool,
}

impl RecordingBackend<MonotonicClock> {
    pub fn monotonic() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl RecordingBackend<ManualClock> {
    pub fn manual(clock: ManualClock) -> Self {
        Self::with_clock(clock)
    }
}

impl<C: Clock> RecordingBackend<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            marks: HashMap::new(),
            buffer: Vec::new(),
            timeline: Vec::new(),
            events: Vec::new(),
            log_events: false,
        }
    }

    /// Also keep a log of every call made against this backend
    ///
    /// Off by default: the log grows with every mark, so it is only meant
    /// for inspecting short runs.
    pub fn with_event_log(mut self) -> Self {
        self.log_events = true;
        self
    }

    /// Marks placed and not yet cleared
    pub fn open_marks(&self) -> usize {
        self.marks.values().map(Vec::len).sum()
    }

    pub fn has_mark(&self, name: &str) -> bool {
        self.marks.get(name).is_some_and(|starts| !starts.is_empty())
    }

    /// Measures not yet cleared from the buffer
    pub fn buffered(&self) -> &[Measurement] {
        &self.buffer
    }

    /// Every measure ever taken, in completion order
    pub fn timeline(&self) -> &[Measurement] {
        &self.timeline
    }

    /// Calls recorded since the last [`clear_events`](Self::clear_events);
    /// always empty unless built [`with_event_log`](Self::with_event_log)
    pub fn events(&self) -> &[MarkerEvent] {
        &self.events
    }

    pub fn take_timeline(&mut self) -> Vec<Measurement> {
        std::mem::take(&mut self.timeline)
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn log(&mut self, event: MarkerEvent) {
        if self.log_events {
            self.events.push(event);
        }
    }
}

impl<C: Clock> MarkerBackend for RecordingBackend<C> {
    fn mark(&mut self, name: &str) {
        let now = self.clock.now_us();
        self.marks.entry(name.to_string()).or_default().push(now);
        self.log(MarkerEvent::Mark(name.to_string()));
    }

    fn clear_marks(&mut self, name: &str) {
        self.marks.remove(name);
        self.log(MarkerEvent::ClearMarks(name.to_string()));
    }

    fn measure(&mut self, label: &str, start_mark: &str) -> Result<(), MarkerError> {
        let start = self
            .marks
            .get(start_mark)
            .and_then(|starts| starts.last().copied())
            .ok_or_else(|| MarkerError::MissingMark(start_mark.to_string()))?;
        let now = self.clock.now_us();
        let measurement = Measurement {
            label: label.to_string(),
            start_us: start,
            duration_us: now.saturating_sub(start),
        };
        trace!("Measured {} ({} us)", label, measurement.duration_us);
        self.buffer.push(measurement.clone());
        self.timeline.push(measurement);
        self.log(MarkerEvent::Measure(label.to_string()));
        Ok(())
    }

    fn clear_measures(&mut self, label: &str) {
        self.buffer.retain(|m| m.label != label);
        self.log(MarkerEvent::ClearMeasures(label.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_spans_from_mark() {
        let clock = ManualClock::new();
        let mut backend = RecordingBackend::manual(clock.clone());

        clock.advance(100);
        backend.mark("start");
        clock.advance(40);
        backend.measure("work", "start").unwrap();

        assert_eq!(
            backend.timeline(),
            &[Measurement {
                label: "work".to_string(),
                start_us: 100,
                duration_us: 40,
            }]
        );
    }

    #[test]
    fn test_measure_without_mark_fails() {
        let mut backend = RecordingBackend::monotonic();
        let err = backend.measure("work", "missing").unwrap_err();
        assert_eq!(err, MarkerError::MissingMark("missing".to_string()));
        assert!(backend.timeline().is_empty());
    }

    #[test]
    fn test_clear_measures_keeps_timeline() {
        let mut backend = RecordingBackend::manual(ManualClock::new());
        backend.mark("a");
        backend.measure("done", "a").unwrap();
        backend.clear_marks("a");
        backend.clear_measures("done");

        assert_eq!(backend.open_marks(), 0);
        assert!(backend.buffered().is_empty());
        assert_eq!(backend.timeline().len(), 1);
    }

    #[test]
    fn test_event_log_is_opt_in() {
        let clock = ManualClock::new();
        let mut quiet = RecordingBackend::manual(clock.clone());
        let mut logged = RecordingBackend::manual(clock.clone()).with_event_log();

        for backend in [&mut quiet, &mut logged] {
            for _ in 0..1000 {
                backend.mark("loop");
                clock.advance(1);
                backend.measure("done", "loop").unwrap();
                backend.clear_marks("loop");
                backend.clear_measures("done");
            }
        }

        assert!(quiet.events().is_empty());
        assert_eq!(quiet.open_marks(), 0);
        assert!(quiet.buffered().is_empty());
        assert_eq!(logged.events().len(), 4000);
        assert_eq!(
            &logged.events()[..2],
            &[
                MarkerEvent::Mark("loop".to_string()),
                MarkerEvent::Measure("done".to_string()),
            ]
        );
    }

    #[test]
    fn test_measurement_name_and_warning() {
        let m = Measurement {
            label: format!("{} (Committing Changes) Warning: Lifecycle hook scheduled a cascading update", WARNING_PREFIX),
            start_us: 0,
            duration_us: 5,
        };
        assert_eq!(m.name(), "(Committing Changes)");
        assert_eq!(m.warning(), Some("Lifecycle hook scheduled a cascading update"));

        let plain = Measurement {
            label: format!("{} App [mount]", MEASURE_PREFIX),
            start_us: 1,
            duration_us: 2,
        };
        assert_eq!(plain.name(), "App [mount]");
        assert_eq!(plain.warning(), None);
        assert_eq!(plain.end_us(), 3);
    }
}
