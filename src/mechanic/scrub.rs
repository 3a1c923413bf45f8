//! Continuous scrub slider
//!
//! The player drags a thumb along a horizontal track to a 0–100 value. A
//! target zone of `target ± tolerance` defines success, and the widget
//! reports whether the current value lies inside it while dragging. When the
//! pointer is released (or leaves the surface) the final value and the full
//! telemetry stream are emitted together, exactly once.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    constants::scrub::{MAX_VALUE, MIN_VALUE, PROXIMITY_FALLOFF},
    design::StyleTokens,
    telemetry::{Gesture, GestureStep, PointerEvent, PointerPhase, TelemetrySample},
};

use super::common::{Phase, PointerInput, Rect, Render};

/// Target zone of a scrub scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScrubConfig {
    /// Value the player should land on
    #[garde(range(max = MAX_VALUE))]
    pub target: u8,
    /// Accepted distance from the target on either side
    #[garde(range(max = 50))]
    pub tolerance: u8,
}

impl ScrubConfig {
    /// Creates a target zone
    pub const fn new(target: u8, tolerance: u8) -> Self {
        Self { target, tolerance }
    }

    /// Inclusive bounds of the target zone, clamped to the slider range
    pub fn zone(&self) -> (u8, u8) {
        (
            self.target.saturating_sub(self.tolerance).max(MIN_VALUE),
            self.target.saturating_add(self.tolerance).min(MAX_VALUE),
        )
    }

    /// Whether `value` lies inside the target zone
    pub fn contains(&self, value: u8) -> bool {
        value.abs_diff(self.target) <= self.tolerance
    }

    /// Presentational closeness to the target in `[0, 1]`, 1 meaning on target
    pub fn proximity(&self, value: u8) -> f64 {
        1. - (f64::from(value.abs_diff(self.target)) / PROXIMITY_FALLOFF).min(1.)
    }
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self::new(50, 10)
    }
}

/// Result emitted once per completed scrub gesture
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Final value
    pub value: u8,
    /// Whether the final value lies in the target zone
    pub in_target_zone: bool,
    /// Telemetry of the gesture, `start` first and `end` last
    pub samples: Vec<TelemetrySample>,
}

/// Slider widget state
///
/// The slider maps the horizontal pointer position onto the track and
/// clamps it to the value range, so dragging past either end pins the thumb
/// there. While a gesture is in progress the phase is
/// [`Phase::Dragging`]; it returns to [`Phase::Idle`] on release.
///
/// The value is kept after release until the next press moves the thumb,
/// and every gesture emits its own [`Release`].
#[derive(Debug, Clone)]
pub struct ScrubSlider {
    track: Rect,
    config: ScrubConfig,
    value: u8,
    phase: Phase,
    gesture: Gesture,
}

impl ScrubSlider {
    /// Creates an idle slider over `track`, resting at the midpoint
    ///
    /// # Arguments
    ///
    /// * `track` - The horizontal band the thumb moves along
    /// * `config` - The target zone the final value is judged against
    pub fn new(track: Rect, config: ScrubConfig) -> Self {
        Self {
            track,
            config,
            value: MAX_VALUE / 2,
            phase: Phase::Idle,
            gesture: Gesture::default(),
        }
    }

    /// Current value
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Current interaction phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Target zone configuration
    pub fn config(&self) -> ScrubConfig {
        self.config
    }

    /// Whether the current value lies in the target zone
    pub fn in_target_zone(&self) -> bool {
        self.config.contains(self.value)
    }

    /// Closeness of the current value to the target in `[0, 1]`
    pub fn proximity(&self) -> f64 {
        self.config.proximity(self.value)
    }

    /// Maps a horizontal pointer position onto the slider range
    pub fn value_from_x(&self, x: f64) -> u8 {
        if self.track.w <= 0. {
            return MIN_VALUE;
        }
        let t = ((x - self.track.x) / self.track.w).clamp(0., 1.);
        (t * f64::from(MAX_VALUE)).round() as u8
    }
}

impl PointerInput for ScrubSlider {
    type Output = Release;

    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Release> {
        if event.phase == PointerPhase::Down
            && !self.gesture.is_active()
            && !self.track.contains(event.position)
        {
            return None;
        }
        match self.gesture.handle(event) {
            GestureStep::Started(position) => {
                self.phase = Phase::Dragging;
                self.value = self.value_from_x(position.x);
                None
            }
            GestureStep::Moved(position) => {
                self.value = self.value_from_x(position.x);
                None
            }
            GestureStep::Ended {
                position, samples, ..
            } => {
                self.phase = Phase::Idle;
                self.value = self.value_from_x(position.x);
                tracing::debug!(value = self.value, target = self.config.target, "scrub released");
                Some(Release {
                    value: self.value,
                    in_target_zone: self.in_target_zone(),
                    samples,
                })
            }
            GestureStep::Ignored => None,
        }
    }
}

/// View model of the slider
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrubView {
    /// Current value
    pub value: u8,
    /// Inclusive target zone bounds
    pub zone: (u8, u8),
    /// Whether the value is inside the zone
    pub in_target_zone: bool,
    /// Clarity of the scene image in `[0, 1]`
    pub clarity: f64,
    /// Thumb colour
    pub thumb_color: String,
    /// Whether a drag is in progress
    pub dragging: bool,
}

impl Render for ScrubSlider {
    type View = ScrubView;

    fn view(&self, style: &StyleTokens) -> ScrubView {
        ScrubView {
            value: self.value,
            zone: self.config.zone(),
            in_target_zone: self.in_target_zone(),
            clarity: self.proximity(),
            thumb_color: if self.in_target_zone() {
                style.highlight.clone()
            } else {
                style.primary.clone()
            },
            dragging: self.phase == Phase::Dragging,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::telemetry::{EventType, Point, PointerId};

    fn slider() -> ScrubSlider {
        ScrubSlider::new(Rect::new(0., 0., 100., 40.), ScrubConfig::new(65, 10))
    }

    fn event(phase: PointerPhase, x: f64, at_ms: u64) -> PointerEvent {
        PointerEvent::new(PointerId(1), phase, Point::new(x, 20.), at_ms)
    }

    #[test]
    fn test_target_zone_scenario() {
        let mut slider = slider();
        assert!(slider.handle_pointer(&event(PointerPhase::Down, 40., 0)).is_none());
        assert_eq!(slider.phase(), Phase::Dragging);

        slider.handle_pointer(&event(PointerPhase::Move, 70., 20));
        assert_eq!(slider.value(), 70);
        assert!(slider.in_target_zone());

        slider.handle_pointer(&event(PointerPhase::Move, 50., 40));
        assert_eq!(slider.value(), 50);
        assert!(!slider.in_target_zone());

        let release = slider
            .handle_pointer(&event(PointerPhase::Up, 50., 60))
            .expect("release emits a result");
        assert_eq!(release.value, 50);
        assert!(!release.in_target_zone);
        assert!(release.samples.len() >= 2);
        assert_eq!(release.samples[0].event_type, EventType::Start);
        assert_eq!(release.samples.last().unwrap().event_type, EventType::End);
        assert_eq!(slider.phase(), Phase::Idle);

        assert!(slider.handle_pointer(&event(PointerPhase::Up, 50., 70)).is_none());
    }

    #[test]
    fn test_tap_emits_minimal_stream() {
        let mut slider = slider();
        slider.handle_pointer(&event(PointerPhase::Down, 65., 0));
        let release = slider.handle_pointer(&event(PointerPhase::Up, 65., 5)).unwrap();
        assert_eq!(release.samples.len(), 2);
        assert!(release.in_target_zone);
    }

    #[test]
    fn test_value_clamped_to_track() {
        let slider = slider();
        assert_eq!(slider.value_from_x(-30.), 0);
        assert_eq!(slider.value_from_x(500.), 100);
        assert_eq!(slider.value_from_x(33.4), 33);
    }

    #[test]
    fn test_leave_commits_covered_distance() {
        let mut slider = slider();
        slider.handle_pointer(&event(PointerPhase::Down, 10., 0));
        slider.handle_pointer(&event(PointerPhase::Move, 60., 30));
        let release = slider.handle_pointer(&event(PointerPhase::Leave, 140., 50)).unwrap();
        assert_eq!(release.value, 100);
    }

    #[test]
    fn test_press_outside_track_ignored() {
        let mut slider = slider();
        let outside = PointerEvent::new(PointerId(1), PointerPhase::Down, Point::new(50., 90.), 0);
        assert!(slider.handle_pointer(&outside).is_none());
        assert_eq!(slider.phase(), Phase::Idle);
    }

    #[test]
    fn test_proximity() {
        let config = ScrubConfig::new(65, 10);
        assert!((config.proximity(65) - 1.).abs() < f64::EPSILON);
        assert!((config.proximity(40) - 0.5).abs() < f64::EPSILON);
        assert!(config.proximity(0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zone_clamps() {
        assert_eq!(ScrubConfig::new(5, 10).zone(), (0, 15));
        assert_eq!(ScrubConfig::new(95, 10).zone(), (85, 100));
    }

    #[test]
    fn test_config_validation() {
        assert!(ScrubConfig::new(101, 10).validate().is_err());
        assert!(ScrubConfig::new(50, 51).validate().is_err());
        assert!(ScrubConfig::default().validate().is_ok());
    }

    #[test]
    fn test_view_uses_highlight_in_zone() {
        let mut slider = slider();
        slider.handle_pointer(&event(PointerPhase::Down, 66., 0));
        let style = StyleTokens::default();
        let view = slider.view(&style);
        assert!(view.dragging);
        assert_eq!(view.thumb_color, style.highlight);
        assert_eq!(view.zone, (55, 75));
    }
}
