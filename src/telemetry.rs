//! Pointer gesture tracking and fixed-rate telemetry capture
//!
//! Every interactive mechanic records a telemetry stream while a pointer
//! gesture is active. The stream always opens with a `start` sample and
//! closes with an `end` sample; in between, `move` samples are coalesced so
//! that at most one is kept per sampling window. The stream is owned by the
//! gesture that produced it and handed over exactly once when it ends.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::constants;

/// A position on the interaction surface in logical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Creates a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Identifier the host assigns to a pointer (mouse, finger, pen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u32);

/// Phase of a raw pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    /// Pointer pressed on the surface
    Down,
    /// Pointer moved
    Move,
    /// Pointer released
    Up,
    /// Pointer left the interactive surface
    Leave,
}

/// A raw pointer event delivered by the host in arrival order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Pointer that produced the event
    pub pointer: PointerId,
    /// What happened
    pub phase: PointerPhase,
    /// Where it happened
    pub position: Point,
    /// Host timestamp in milliseconds
    pub at_ms: u64,
}

impl PointerEvent {
    /// Creates a pointer event
    pub fn new(pointer: PointerId, phase: PointerPhase, position: Point, at_ms: u64) -> Self {
        Self {
            pointer,
            phase,
            position,
            at_ms,
        }
    }
}

/// Kind of a recorded telemetry sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// First sample of a gesture
    Start,
    /// Intermediate sample
    Move,
    /// Last sample of a gesture
    End,
}

/// One timestamped pointer snapshot captured during a gesture
#[skip_serializing_none]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    /// Host timestamp in milliseconds
    pub timestamp: u64,
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
    /// Speed in units per second against the preceding sample, absent on `start`
    pub velocity: Option<f64>,
    /// Sample kind
    pub event_type: EventType,
}

/// Rate-limited accumulator for the samples of a single gesture
#[derive(Debug, Clone)]
pub struct TelemetrySampler {
    interval_ms: u64,
    samples: Vec<TelemetrySample>,
}

impl Default for TelemetrySampler {
    fn default() -> Self {
        Self::new(constants::telemetry::SAMPLE_INTERVAL_MS)
    }
}

impl TelemetrySampler {
    /// Creates a sampler that keeps at most one `move` sample per `interval_ms`
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            samples: Vec::new(),
        }
    }

    /// Samples recorded so far for the active gesture
    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    /// Opens a new stream with an unconditional `start` sample
    ///
    /// Any samples left over from an unfinished gesture are discarded.
    pub fn start(&mut self, at_ms: u64, position: Point) {
        self.samples.clear();
        self.samples.push(TelemetrySample {
            timestamp: at_ms,
            x: position.x,
            y: position.y,
            velocity: None,
            event_type: EventType::Start,
        });
    }

    /// Offers a `move` sample, returning whether it was kept
    ///
    /// Moves arriving less than one interval after the last kept sample are
    /// coalesced away. Moves outside a gesture are never kept.
    pub fn record_move(&mut self, at_ms: u64, position: Point) -> bool {
        let Some(last) = self.samples.last() else {
            return false;
        };
        if at_ms.saturating_sub(last.timestamp) < self.interval_ms {
            return false;
        }
        let velocity = self.velocity_to(at_ms, position);
        self.samples.push(TelemetrySample {
            timestamp: at_ms,
            x: position.x,
            y: position.y,
            velocity: Some(velocity),
            event_type: EventType::Move,
        });
        true
    }

    /// Closes the stream with an unconditional `end` sample and hands it over
    ///
    /// Returns an empty stream if no gesture was started.
    pub fn finish(&mut self, at_ms: u64, position: Point) -> Vec<TelemetrySample> {
        if self.samples.is_empty() {
            return Vec::new();
        }
        let velocity = self.velocity_to(at_ms, position);
        self.samples.push(TelemetrySample {
            timestamp: at_ms,
            x: position.x,
            y: position.y,
            velocity: Some(velocity),
            event_type: EventType::End,
        });
        std::mem::take(&mut self.samples)
    }

    /// Drops the active stream without emitting it
    pub fn discard(&mut self) {
        self.samples.clear();
    }

    // The `start` sample is not a velocity reference, so the first move reads 0.
    fn velocity_to(&self, at_ms: u64, position: Point) -> f64 {
        match self.samples.last() {
            Some(previous) if previous.event_type == EventType::Move => {
                let elapsed = at_ms.saturating_sub(previous.timestamp);
                if elapsed == 0 {
                    0.
                } else {
                    Point::new(previous.x, previous.y).distance(position) / elapsed as f64 * 1000.
                }
            }
            _ => 0.,
        }
    }
}

/// Outcome of feeding one pointer event to a [`Gesture`]
#[derive(Debug, Clone, PartialEq)]
pub enum GestureStep {
    /// A gesture began at the given position
    Started(Point),
    /// The active pointer moved (telemetry may have coalesced the move)
    Moved(Point),
    /// The gesture finished and its telemetry was flushed
    Ended {
        /// Final pointer position
        position: Point,
        /// Complete telemetry stream, `start` first and `end` last
        samples: Vec<TelemetrySample>,
        /// Whether the pointer left the surface instead of being released
        interrupted: bool,
    },
    /// The event was not part of an active gesture
    Ignored,
}

/// Single-pointer gesture tracker owning its telemetry accumulator
///
/// Only one pointer is tracked at a time; events from any other pointer are
/// ignored until the active gesture ends. Leaving the surface ends the
/// gesture exactly like a release.
#[derive(Debug, Clone, Default)]
pub struct Gesture {
    active: Option<PointerId>,
    sampler: TelemetrySampler,
}

impl Gesture {
    /// Whether a pointer is currently held down
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Telemetry recorded so far for the active gesture
    pub fn samples(&self) -> &[TelemetrySample] {
        self.sampler.samples()
    }

    /// Feeds a pointer event through the gesture state machine
    pub fn handle(&mut self, event: &PointerEvent) -> GestureStep {
        match (self.active, event.phase) {
            (None, PointerPhase::Down) => {
                self.active = Some(event.pointer);
                self.sampler.start(event.at_ms, event.position);
                tracing::trace!(pointer = event.pointer.0, at_ms = event.at_ms, "gesture started");
                GestureStep::Started(event.position)
            }
            (Some(active), _) if active != event.pointer => {
                tracing::trace!(
                    active = active.0,
                    pointer = event.pointer.0,
                    "ignoring concurrent pointer"
                );
                GestureStep::Ignored
            }
            (Some(_), PointerPhase::Move) => {
                self.sampler.record_move(event.at_ms, event.position);
                GestureStep::Moved(event.position)
            }
            (Some(_), phase @ (PointerPhase::Up | PointerPhase::Leave)) => {
                self.active = None;
                let samples = self.sampler.finish(event.at_ms, event.position);
                let interrupted = phase == PointerPhase::Leave;
                tracing::debug!(samples = samples.len(), interrupted, "gesture ended");
                GestureStep::Ended {
                    position: event.position,
                    samples,
                    interrupted,
                }
            }
            (Some(_), PointerPhase::Down) | (None, _) => GestureStep::Ignored,
        }
    }

    /// Abandons the active gesture and its telemetry
    pub fn reset(&mut self) {
        self.active = None;
        self.sampler.discard();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn event(phase: PointerPhase, x: f64, at_ms: u64) -> PointerEvent {
        PointerEvent::new(PointerId(1), phase, Point::new(x, 0.), at_ms)
    }

    fn count(samples: &[TelemetrySample], kind: EventType) -> usize {
        samples.iter().filter(|s| s.event_type == kind).count()
    }

    #[test]
    fn test_move_outside_gesture_is_not_recorded() {
        let mut sampler = TelemetrySampler::default();
        assert!(!sampler.record_move(10, Point::default()));
        assert!(sampler.finish(20, Point::default()).is_empty());
    }

    #[test]
    fn test_sampling_rate_over_dense_moves() {
        for duration in [0_u64, 15, 16, 100, 333, 1000] {
            let mut sampler = TelemetrySampler::default();
            sampler.start(0, Point::default());
            for t in 1..=duration {
                sampler.record_move(t, Point::new(t as f64, 0.));
            }
            let samples = sampler.finish(duration, Point::new(duration as f64, 0.));

            let moves = count(&samples, EventType::Move) as i64;
            let expected = (duration / 16) as i64;
            assert!((moves - expected).abs() <= 1, "{moves} moves over {duration}ms");
            assert_eq!(count(&samples, EventType::Start), 1);
            assert_eq!(count(&samples, EventType::End), 1);
            assert_eq!(samples.first().map(|s| s.event_type), Some(EventType::Start));
            assert_eq!(samples.last().map(|s| s.event_type), Some(EventType::End));
        }
    }

    #[test]
    fn test_first_move_has_zero_velocity() {
        let mut sampler = TelemetrySampler::default();
        sampler.start(0, Point::new(0., 0.));
        assert!(sampler.record_move(20, Point::new(50., 0.)));
        assert_eq!(sampler.samples()[1].velocity, Some(0.));
        assert_eq!(sampler.samples()[0].velocity, None);
    }

    #[test]
    fn test_velocity_against_predecessor() {
        let mut sampler = TelemetrySampler::default();
        sampler.start(0, Point::new(0., 0.));
        sampler.record_move(20, Point::new(10., 0.));
        sampler.record_move(40, Point::new(30., 0.));
        sampler.record_move(60, Point::new(25., 0.));
        let samples = sampler.finish(100, Point::new(25., 0.));

        assert_eq!(samples[2].velocity, Some(1000.));
        assert_eq!(samples[3].velocity, Some(250.));
        assert_eq!(samples[4].velocity, Some(0.));
    }

    #[test]
    fn test_start_and_end_bypass_rate_limit() {
        let mut sampler = TelemetrySampler::default();
        sampler.start(0, Point::default());
        assert!(!sampler.record_move(5, Point::new(3., 0.)));
        let samples = sampler.finish(6, Point::new(4., 0.));
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].event_type, EventType::End);
        assert!(sampler.samples().is_empty());
    }

    #[test]
    fn test_gesture_flushes_once() {
        let mut gesture = Gesture::default();
        assert_eq!(
            gesture.handle(&event(PointerPhase::Down, 0., 0)),
            GestureStep::Started(Point::new(0., 0.))
        );
        gesture.handle(&event(PointerPhase::Move, 10., 20));
        let GestureStep::Ended { samples, interrupted, .. } =
            gesture.handle(&event(PointerPhase::Up, 20., 40))
        else {
            panic!("expected gesture to end");
        };
        assert!(!interrupted);
        assert_eq!(samples.len(), 3);
        assert!(gesture.samples().is_empty());
        assert_eq!(gesture.handle(&event(PointerPhase::Up, 20., 50)), GestureStep::Ignored);
    }

    #[test]
    fn test_leave_is_implicit_end() {
        let mut gesture = Gesture::default();
        gesture.handle(&event(PointerPhase::Down, 0., 0));
        let step = gesture.handle(&event(PointerPhase::Leave, 40., 30));
        assert!(matches!(step, GestureStep::Ended { interrupted: true, ref samples, .. } if samples.len() == 2));
        assert!(!gesture.is_active());
    }

    #[test]
    fn test_second_pointer_ignored() {
        let mut gesture = Gesture::default();
        gesture.handle(&event(PointerPhase::Down, 0., 0));
        let other = PointerEvent::new(PointerId(2), PointerPhase::Down, Point::new(5., 5.), 3);
        assert_eq!(gesture.handle(&other), GestureStep::Ignored);
        let other_up = PointerEvent::new(PointerId(2), PointerPhase::Up, Point::new(5., 5.), 4);
        assert_eq!(gesture.handle(&other_up), GestureStep::Ignored);
        assert!(gesture.is_active());
        assert_eq!(gesture.samples().len(), 1);
    }

    #[test]
    fn test_sample_serialization() {
        let sample = TelemetrySample {
            timestamp: 12,
            x: 1.,
            y: 2.,
            velocity: None,
            event_type: EventType::Start,
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"eventType\":\"start\""));
        assert!(!json.contains("velocity"));
    }
}
