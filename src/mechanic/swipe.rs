//! Binary swipe card
//!
//! Two choices are placed either side of a card. Dragging the card
//! horizontally past the threshold and releasing commits the choice on that
//! side: a positive offset picks the first (right) choice and a negative one
//! the second (left). Releasing short of the threshold snaps the card back
//! without a decision and without keeping any telemetry.

use serde::Serialize;

use crate::{
    constants::swipe::THRESHOLD_PX,
    design::StyleTokens,
    scene::Choice,
    telemetry::{Gesture, GestureStep, PointerEvent, Point, TelemetrySample},
};

use super::common::{PointerInput, Rect, Render};

/// Side a card was swiped towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Positive offset, first choice
    Right,
    /// Negative offset, second choice
    Left,
}

/// A committed swipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// Direction of the swipe
    pub direction: Direction,
    /// Index into [`SwipeCard::choices`]
    pub index: usize,
    /// Chosen option
    pub choice: Choice,
    /// Horizontal offset at release
    pub offset: f64,
    /// Telemetry of the committing gesture
    pub samples: Vec<TelemetrySample>,
}

impl Decision {
    /// Whether the chosen option is the ground-truth answer
    pub fn is_correct(&self) -> bool {
        self.choice.is_correct()
    }
}

/// Swipe card widget state
///
/// Tracks the card's horizontal offset from where the drag began. Vertical
/// movement is ignored. Once a decision is committed the card stays on its
/// side and further gestures are dropped.
#[derive(Debug, Clone)]
pub struct SwipeCard {
    card: Rect,
    choices: [Choice; 2],
    origin: Option<Point>,
    offset: f64,
    gesture: Gesture,
    decided: Option<Direction>,
}

impl SwipeCard {
    /// Creates a card from the first two usable choices
    ///
    /// Choices with blank text are skipped. If fewer than two remain, a
    /// Yes/No pair is synthesized instead.
    ///
    /// # Arguments
    ///
    /// * `card` - The resting rectangle of the card
    /// * `choices` - The scene's choices, in authored order
    pub fn new(card: Rect, choices: &[Choice]) -> Self {
        let usable: Vec<&Choice> = choices
            .iter()
            .filter(|c| !c.text().trim().is_empty())
            .take(2)
            .collect();
        let choices = match usable.as_slice() {
            [first, second] => [(*first).clone(), (*second).clone()],
            _ => {
                tracing::debug!(usable = usable.len(), "synthesizing yes/no pair");
                [Choice::new("Yes", true), Choice::new("No", false)]
            }
        };
        Self {
            card,
            choices,
            origin: None,
            offset: 0.,
            gesture: Gesture::default(),
            decided: None,
        }
    }

    /// The two options, first is the right-hand side
    pub fn choices(&self) -> &[Choice; 2] {
        &self.choices
    }

    /// Current horizontal offset of the card
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Direction committed so far, if any
    pub fn decided(&self) -> Option<Direction> {
        self.decided
    }

    /// Resolves a release offset into a direction, `None` within the threshold
    pub fn direction_for(offset: f64) -> Option<Direction> {
        if offset.abs() <= THRESHOLD_PX {
            None
        } else if offset > 0. {
            Some(Direction::Right)
        } else {
            Some(Direction::Left)
        }
    }
}

impl PointerInput for SwipeCard {
    type Output = Decision;

    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Decision> {
        if self.decided.is_some() {
            return None;
        }
        if !self.gesture.is_active() && !self.card.contains(event.position) {
            return None;
        }
        match self.gesture.handle(event) {
            GestureStep::Started(position) => {
                self.origin = Some(position);
                self.offset = 0.;
                None
            }
            GestureStep::Moved(position) => {
                if let Some(origin) = self.origin {
                    self.offset = position.x - origin.x;
                }
                None
            }
            GestureStep::Ended {
                position, samples, ..
            } => {
                let offset = self.origin.take().map_or(0., |origin| position.x - origin.x);
                match Self::direction_for(offset) {
                    Some(direction) => {
                        self.decided = Some(direction);
                        self.offset = offset;
                        let index = match direction {
                            Direction::Right => 0,
                            Direction::Left => 1,
                        };
                        Some(Decision {
                            direction,
                            index,
                            choice: self.choices[index].clone(),
                            offset,
                            samples,
                        })
                    }
                    None => {
                        tracing::trace!(offset, "swipe below threshold, snapping back");
                        self.offset = 0.;
                        None
                    }
                }
            }
            GestureStep::Ignored => None,
        }
    }
}

/// View model of the swipe card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeView {
    /// Label on the right-hand side
    pub right_label: String,
    /// Label on the left-hand side
    pub left_label: String,
    /// Card offset
    pub offset: f64,
    /// Card rotation in degrees, following the offset
    pub rotation: f64,
    /// Side currently past the threshold, if any
    pub armed: Option<Direction>,
    /// Card colour
    pub card_color: String,
}

impl Render for SwipeCard {
    type View = SwipeView;

    fn view(&self, style: &StyleTokens) -> SwipeView {
        let armed = Self::direction_for(self.offset);
        SwipeView {
            right_label: self.choices[0].text().to_string(),
            left_label: self.choices[1].text().to_string(),
            offset: self.offset,
            rotation: (self.offset / 10.).clamp(-15., 15.),
            armed,
            card_color: if armed.is_some() {
                style.accent.clone()
            } else {
                style.primary.clone()
            },
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::telemetry::{PointerId, PointerPhase};

    fn card() -> SwipeCard {
        SwipeCard::new(
            Rect::new(0., 0., 300., 400.),
            &[
                Choice::new("Approve", true),
                Choice::new("Reject", false),
                Choice::new("Defer", false),
            ],
        )
    }

    fn swipe(card: &mut SwipeCard, dx: f64) -> Option<Decision> {
        let start = Point::new(150., 200.);
        let id = PointerId(1);
        card.handle_pointer(&PointerEvent::new(id, PointerPhase::Down, start, 0));
        card.handle_pointer(&PointerEvent::new(
            id,
            PointerPhase::Move,
            Point::new(start.x + dx / 2., start.y),
            20,
        ));
        card.handle_pointer(&PointerEvent::new(
            id,
            PointerPhase::Up,
            Point::new(start.x + dx, start.y),
            40,
        ))
    }

    #[test]
    fn test_below_threshold_snaps_back() {
        let mut card = card();
        assert!(swipe(&mut card, 79.).is_none());
        assert_eq!(card.offset(), 0.);
        assert!(card.decided().is_none());
    }

    #[test]
    fn test_exact_threshold_snaps_back() {
        let mut card = card();
        assert!(swipe(&mut card, -80.).is_none());
    }

    #[test]
    fn test_right_swipe_picks_first() {
        let mut card = card();
        let decision = swipe(&mut card, 81.).unwrap();
        assert_eq!(decision.direction, Direction::Right);
        assert_eq!(decision.index, 0);
        assert_eq!(decision.choice.text(), "Approve");
        assert!(decision.is_correct());
        assert_eq!(decision.samples.len(), 3);
    }

    #[test]
    fn test_left_swipe_picks_second() {
        let mut card = card();
        let decision = swipe(&mut card, -81.).unwrap();
        assert_eq!(decision.direction, Direction::Left);
        assert_eq!(decision.choice.text(), "Reject");
        assert!(!decision.is_correct());
    }

    #[test]
    fn test_locked_after_decision() {
        let mut card = card();
        assert!(swipe(&mut card, 200.).is_some());
        assert!(swipe(&mut card, -200.).is_none());
        assert_eq!(card.decided(), Some(Direction::Right));
    }

    #[test]
    fn test_retry_after_snap_back() {
        let mut card = card();
        assert!(swipe(&mut card, 30.).is_none());
        assert!(swipe(&mut card, -120.).is_some());
    }

    #[test]
    fn test_synthesizes_yes_no() {
        let card = SwipeCard::new(
            Rect::new(0., 0., 100., 100.),
            &[Choice::new("Only", true), Choice::new("  ", false)],
        );
        assert_eq!(card.choices()[0].text(), "Yes");
        assert_eq!(card.choices()[1].text(), "No");
    }

    #[test]
    fn test_view_arms_past_threshold() {
        let mut card = card();
        let id = PointerId(1);
        card.handle_pointer(&PointerEvent::new(id, PointerPhase::Down, Point::new(150., 200.), 0));
        card.handle_pointer(&PointerEvent::new(id, PointerPhase::Move, Point::new(50., 200.), 20));
        let view = card.view(&StyleTokens::default());
        assert_eq!(view.armed, Some(Direction::Left));
        assert_eq!(view.rotation, -10.);
        assert_eq!(view.right_label, "Approve");
    }
}
