//! Trade-off quadrant matrix
//!
//! A single marker rests in a tray below a 2×2 field and has to be dragged
//! into the field. The drop position is compared with the field's
//! midpoints to find the quadrant. Once dropped inside, the marker is pinned
//! for good; a drop outside the field sends it back to the tray.

use enum_map::{Enum, EnumMap, enum_map};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    constants::tradeoff::{FIELD_PERCENT, MARKER_RADIUS},
    design::StyleTokens,
    telemetry::{Gesture, GestureStep, Point, PointerEvent, PointerPhase, TelemetrySample},
};

use super::common::{PointerInput, Rect, Render};

type ValidationResult = garde::Result;

/// One cell of the 2×2 field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Upper left
    TopLeft,
    /// Upper right
    TopRight,
    /// Lower left
    BottomLeft,
    /// Lower right
    BottomRight,
}

impl Quadrant {
    /// Quadrant of `point` within `field`, points on a midline belong to the right/bottom side
    pub fn of(field: Rect, point: Point) -> Self {
        let center = field.center();
        match (point.x >= center.x, point.y >= center.y) {
            (false, false) => Self::TopLeft,
            (true, false) => Self::TopRight,
            (false, true) => Self::BottomLeft,
            (true, true) => Self::BottomRight,
        }
    }
}

fn validate_labels(labels: &EnumMap<Quadrant, String>) -> ValidationResult {
    if labels
        .values()
        .all(|label| label.chars().count() <= crate::constants::text::MAX_CHOICE_LENGTH)
    {
        Ok(())
    } else {
        Err(garde::Error::new("quadrant label is too long"))
    }
}

/// Labels and answer of a trade-off scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TradeoffConfig {
    /// Caption of each quadrant
    #[garde(custom(|v, _| validate_labels(v)))]
    pub labels: EnumMap<Quadrant, String>,
    /// Quadrant counted as the good trade-off
    #[garde(skip)]
    pub correct: Quadrant,
}

impl Default for TradeoffConfig {
    fn default() -> Self {
        Self {
            labels: enum_map! {
                Quadrant::TopLeft => "High impact, high effort".to_string(),
                Quadrant::TopRight => "High impact, low effort".to_string(),
                Quadrant::BottomLeft => "Low impact, high effort".to_string(),
                Quadrant::BottomRight => "Low impact, low effort".to_string(),
            },
            correct: Quadrant::TopRight,
        }
    }
}

/// The pinned placement of the marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Quadrant the marker was dropped in
    pub quadrant: Quadrant,
    /// Drop position
    pub position: Point,
    /// Whether the quadrant is the correct one
    pub correct: bool,
    /// Telemetry of the placing drag
    pub samples: Vec<TelemetrySample>,
}

/// Trade-off matrix widget state
///
/// The widget area is split into the quadrant field on top and the tray
/// below it. The marker can only be grabbed within its grab radius, and
/// once pinned it ignores every further event.
#[derive(Debug, Clone)]
pub struct TradeoffMatrix {
    config: TradeoffConfig,
    field: Rect,
    home: Point,
    marker: Point,
    gesture: Gesture,
    placement: Option<Placement>,
}

impl TradeoffMatrix {
    /// Lays the field and tray out inside `area`
    ///
    /// # Arguments
    ///
    /// * `area` - The interaction region to split into field and tray
    /// * `config` - Axis labels and the correct quadrant
    pub fn new(area: Rect, config: TradeoffConfig) -> Self {
        let rows = area.split_rows(&[FIELD_PERCENT, 100 - FIELD_PERCENT]);
        let home = rows[1].center();
        Self {
            config,
            field: rows[0],
            home,
            marker: home,
            gesture: Gesture::default(),
            placement: None,
        }
    }

    /// The quadrant field
    pub fn field(&self) -> Rect {
        self.field
    }

    /// Current marker position
    pub fn marker(&self) -> Point {
        self.marker
    }

    /// Pinned placement, if the marker has been dropped in the field
    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }
}

impl PointerInput for TradeoffMatrix {
    type Output = Placement;

    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Placement> {
        if self.placement.is_some() {
            return None;
        }
        if event.phase == PointerPhase::Down
            && !self.gesture.is_active()
            && self.marker.distance(event.position) > MARKER_RADIUS
        {
            return None;
        }
        match self.gesture.handle(event) {
            GestureStep::Started(position) | GestureStep::Moved(position) => {
                self.marker = position;
                None
            }
            GestureStep::Ended {
                position, samples, ..
            } => {
                if !self.field.contains(position) {
                    tracing::trace!(x = position.x, y = position.y, "marker dropped outside field");
                    self.marker = self.home;
                    return None;
                }
                self.marker = position;
                let quadrant = Quadrant::of(self.field, position);
                let placement = Placement {
                    quadrant,
                    position,
                    correct: quadrant == self.config.correct,
                    samples,
                };
                tracing::debug!(?quadrant, correct = placement.correct, "marker pinned");
                self.placement = Some(placement.clone());
                Some(placement)
            }
            GestureStep::Ignored => None,
        }
    }
}

/// Feedback state once the marker is pinned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// Marker not placed yet
    Pending,
    /// Correct quadrant
    Good,
    /// Any other quadrant
    Caution,
}

/// View model of the matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixView {
    /// Field rectangle
    pub field: Rect,
    /// Caption per quadrant
    pub labels: EnumMap<Quadrant, String>,
    /// Marker position
    pub marker: Point,
    /// Marker colour
    pub marker_color: String,
    /// Feedback state
    pub feedback: Feedback,
}

impl Render for TradeoffMatrix {
    type View = MatrixView;

    fn view(&self, style: &StyleTokens) -> MatrixView {
        let feedback = match &self.placement {
            None => Feedback::Pending,
            Some(placement) if placement.correct => Feedback::Good,
            Some(_) => Feedback::Caution,
        };
        MatrixView {
            field: self.field,
            labels: self.config.labels.clone(),
            marker: self.marker,
            marker_color: match feedback {
                Feedback::Pending => style.primary.clone(),
                Feedback::Good => style.highlight.clone(),
                Feedback::Caution => style.secondary.clone(),
            },
            feedback,
        }
    }
}
