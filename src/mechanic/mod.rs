//! Game mechanics and their interactive widgets
//!
//! A mechanic names the interaction pattern a scene is played through. This
//! module resolves mechanic labels into a [`Mechanic`] once, when framework
//! data is ingested, and maps mechanics onto concrete [`WidgetVariant`]s.
//! Free-text labels from older data go through [`resolve`], a keyword
//! priority chain that always falls back to the generic choice grid.
//!
//! [`Widget`] dispatches pointer input, submission and rendering to the
//! widget a scene was built with, and [`Outcome`] collects what a finished
//! interaction produced.

use std::{fmt::Display, str::FromStr};

use heck::ToKebabCase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    design::StyleTokens,
    scene::{MechanicParams, Scene},
    telemetry::{PointerEvent, TelemetrySample},
};

pub mod common;
pub mod drag_connect;
pub mod media;
pub mod pattern_grid;
pub mod quick_tap;
pub mod ranking;
pub mod scrub;
pub mod swipe;
pub mod tradeoff;
pub mod visual_grid;

use common::{PointerInput, Rect, Render};

/// Interaction pattern a scene is played through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mechanic {
    /// Two-way swipe decision
    Binary,
    /// Drag items into priority order
    Ranking,
    /// Drag a slider onto a target zone
    ContinuousScrub,
    /// Connect sources to targets
    DragConnect,
    /// Select cells of a grid
    PatternGrid,
    /// Place a marker in a 2×2 matrix
    TradeoffMatrix,
    /// First tap on a list of buttons, timed
    QuickTap,
    /// Pick one option from a list or grid
    #[default]
    MultiChoice,
}

/// A label that is not a canonical mechanic name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mechanic '{0}'")]
pub struct UnknownMechanic(pub String);

impl FromStr for Mechanic {
    type Err = UnknownMechanic;

    /// Parses a canonical mechanic name, ignoring case and separators
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_kebab_case().as_str() {
            "binary" | "binary-choice" | "swipe" | "swipe-card" => Ok(Self::Binary),
            "ranking" | "drag-list" => Ok(Self::Ranking),
            "continuous-scrub" | "scrub" => Ok(Self::ContinuousScrub),
            "drag-connect" => Ok(Self::DragConnect),
            "pattern-grid" => Ok(Self::PatternGrid),
            "trade-off-matrix" | "tradeoff-matrix" => Ok(Self::TradeoffMatrix),
            "quick-tap" => Ok(Self::QuickTap),
            "multi-choice" | "multiple-choice" | "visual-grid" => Ok(Self::MultiChoice),
            _ => Err(UnknownMechanic(s.to_string())),
        }
    }
}

impl Display for Mechanic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Binary => "Binary Choice",
            Self::Ranking => "Ranking",
            Self::ContinuousScrub => "Continuous Scrub",
            Self::DragConnect => "Drag Connect",
            Self::PatternGrid => "Pattern Grid",
            Self::TradeoffMatrix => "Trade-off Matrix",
            Self::QuickTap => "Quick Tap",
            Self::MultiChoice => "Multi Choice",
        })
    }
}

impl Mechanic {
    /// Matches a free-text label against the keyword priority chain
    ///
    /// Ranking keywords take precedence over the binary ones so that labels
    /// like "ranking priority toggle" stay rankings.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|word| label.contains(word));
        if has(&["ranking", "priorit", "order"]) {
            Some(Self::Ranking)
        } else if has(&["binary", "toggle"]) {
            Some(Self::Binary)
        } else if has(&["scrub"]) {
            Some(Self::ContinuousScrub)
        } else if has(&["connect", "alignment"]) {
            Some(Self::DragConnect)
        } else if has(&["pattern", "grid"]) {
            Some(Self::PatternGrid)
        } else if has(&["trade-off", "tradeoff", "matrix"]) {
            Some(Self::TradeoffMatrix)
        } else {
            None
        }
    }

    /// Resolves a framework label once at ingestion time
    ///
    /// Canonical names win; anything else goes through the keyword chain and
    /// finally falls back to [`Mechanic::MultiChoice`].
    pub fn ingest(label: &str) -> Self {
        label
            .parse()
            .ok()
            .or_else(|| Self::from_label(label))
            .unwrap_or_else(|| {
                tracing::debug!(label, "unrecognised mechanic label, using multi-choice");
                Self::MultiChoice
            })
    }
}

/// Concrete widget layout a scene renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum WidgetVariant {
    /// Two-choice swipe card
    SwipeCard,
    /// Drag-to-reorder list
    Ranking,
    /// Continuous slider
    ContinuousScrub,
    /// Two-column graph matching
    DragConnect,
    /// Multi-cell toggle grid
    PatternGrid,
    /// Quadrant placement
    TradeoffMatrix,
    /// Timed button list
    QuickTap,
    /// Generic choice grid
    Grid {
        /// Number of columns
        columns: usize,
    },
}

impl WidgetVariant {
    /// Generic grid sized for `choice_count` options
    pub fn grid(choice_count: usize) -> Self {
        Self::Grid {
            columns: visual_grid::columns_for(choice_count),
        }
    }

    /// Variant for an already resolved mechanic
    ///
    /// Follows the same precedence as [`resolve`]: ranking always keeps its
    /// list, and any other scene with exactly two options becomes a swipe
    /// card before its own mechanic is considered.
    ///
    /// # Arguments
    ///
    /// * `mechanic` - The mechanic resolved when the framework row was ingested
    /// * `choice_count` - Number of answer options on the scene
    pub fn for_mechanic(mechanic: Mechanic, choice_count: usize) -> Self {
        match mechanic {
            Mechanic::Ranking => Self::Ranking,
            _ if choice_count == 2 => Self::SwipeCard,
            Mechanic::Binary => Self::SwipeCard,
            Mechanic::ContinuousScrub => Self::ContinuousScrub,
            Mechanic::DragConnect => Self::DragConnect,
            Mechanic::PatternGrid => Self::PatternGrid,
            Mechanic::TradeoffMatrix => Self::TradeoffMatrix,
            Mechanic::QuickTap => Self::QuickTap,
            Mechanic::MultiChoice => Self::grid(choice_count),
        }
    }
}

/// Picks a widget for a free-text mechanic label and a choice count
///
/// The first matching rule wins: ranking keywords, then binary keywords or
/// exactly two choices, then scrub, connect, pattern and trade-off keywords,
/// and finally the generic grid. The function is pure and never fails.
pub fn resolve(label: Option<&str>, choice_count: usize) -> WidgetVariant {
    match label.and_then(Mechanic::from_label) {
        Some(Mechanic::Ranking) => WidgetVariant::Ranking,
        _ if choice_count == 2 => WidgetVariant::SwipeCard,
        Some(mechanic) => WidgetVariant::for_mechanic(mechanic, choice_count),
        None => {
            tracing::trace!(?label, choice_count, "no mechanic keyword, using grid");
            WidgetVariant::grid(choice_count)
        }
    }
}

/// Result of a finished interaction
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::From)]
pub enum Outcome {
    /// Slider released
    Scrub(scrub::Release),
    /// Card swiped past the threshold
    Swipe(swipe::Decision),
    /// First tap recorded
    QuickTap(quick_tap::Tap),
    /// Connections submitted
    DragConnect(drag_connect::Matching),
    /// Pattern submitted
    PatternGrid(pattern_grid::Submission),
    /// Marker pinned
    Tradeoff(tradeoff::Placement),
    /// Ranking submitted
    Ranking(ranking::RankingSubmission),
    /// Grid choice selected
    Grid(visual_grid::Selection),
}

impl Outcome {
    /// Whether the interaction hit the ground truth
    pub fn is_correct(&self) -> bool {
        match self {
            Self::Scrub(release) => release.in_target_zone,
            Self::Swipe(decision) => decision.is_correct(),
            Self::QuickTap(tap) => tap.is_correct(),
            Self::DragConnect(matching) => matching.correct,
            Self::PatternGrid(submission) => submission.correct,
            Self::Tradeoff(placement) => placement.correct,
            Self::Ranking(submission) => submission.correct,
            Self::Grid(selection) => selection.is_correct(),
        }
    }

    /// Telemetry captured for the interaction, empty for tap-only widgets
    pub fn samples(&self) -> &[TelemetrySample] {
        match self {
            Self::Scrub(release) => &release.samples,
            Self::Swipe(decision) => &decision.samples,
            Self::DragConnect(matching) => &matching.samples,
            Self::PatternGrid(submission) => &submission.samples,
            Self::Tradeoff(placement) => &placement.samples,
            Self::Ranking(submission) => &submission.samples,
            Self::QuickTap(_) | Self::Grid(_) => &[],
        }
    }

    /// Converts the outcome to a JSON string for the host
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// A live widget built for one scene
#[derive(Debug, Clone)]
pub enum Widget {
    /// Continuous scrub slider
    Scrub(scrub::ScrubSlider),
    /// Swipe card
    Swipe(swipe::SwipeCard),
    /// Quick tap buttons
    QuickTap(quick_tap::QuickTap),
    /// Drag-connect board
    DragConnect(drag_connect::DragConnect),
    /// Pattern grid
    PatternGrid(pattern_grid::PatternGrid),
    /// Trade-off matrix
    Tradeoff(tradeoff::TradeoffMatrix),
    /// Ranking list
    Ranking(ranking::Ranking),
    /// Generic choice grid
    Grid(visual_grid::VisualGrid),
}

/// View model of whichever widget is live
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", content = "view", rename_all = "snake_case")]
pub enum WidgetView {
    /// Slider view
    Scrub(scrub::ScrubView),
    /// Swipe card view
    Swipe(swipe::SwipeView),
    /// Quick tap buttons
    QuickTap(Vec<quick_tap::TapButton>),
    /// Drag-connect board
    DragConnect(drag_connect::ConnectView),
    /// Pattern grid
    PatternGrid(pattern_grid::GridView),
    /// Trade-off matrix
    Tradeoff(tradeoff::MatrixView),
    /// Ranking rows
    Ranking(Vec<ranking::RankRow>),
    /// Grid cells
    Grid(Vec<visual_grid::GridCell>),
}

impl Widget {
    /// Builds the widget a scene renders with inside `surface`
    ///
    /// `at_ms` starts the latency timer of timed widgets. Tuning that does
    /// not fit the scene's mechanic is ignored in favour of the defaults.
    pub fn build(scene: &Scene, surface: Rect, at_ms: u64) -> Self {
        let choices = scene.choices();
        match (scene.widget_variant(), scene.params()) {
            (WidgetVariant::SwipeCard, _) => Self::Swipe(swipe::SwipeCard::new(surface, choices)),
            (WidgetVariant::Ranking, _) => Self::Ranking(ranking::Ranking::new(surface, choices)),
            (WidgetVariant::ContinuousScrub, params) => {
                let config = match params {
                    MechanicParams::Scrub(config) => *config,
                    _ => scrub::ScrubConfig::default(),
                };
                Self::Scrub(scrub::ScrubSlider::new(surface, config))
            }
            (WidgetVariant::DragConnect, params) => {
                let config = match params {
                    MechanicParams::DragConnect(config) => config.clone(),
                    _ => drag_connect::ConnectConfig::from_choices(choices),
                };
                Self::DragConnect(drag_connect::DragConnect::new(surface, config))
            }
            (WidgetVariant::PatternGrid, params) => {
                let config = match params {
                    MechanicParams::PatternGrid(config) => config.clone(),
                    _ => {
                        tracing::warn!(scene = %scene.id(), "pattern grid scene has no pattern");
                        pattern_grid::PatternConfig::default()
                    }
                };
                Self::PatternGrid(pattern_grid::PatternGrid::new(surface, config))
            }
            (WidgetVariant::TradeoffMatrix, params) => {
                let config = match params {
                    MechanicParams::Tradeoff(config) => config.clone(),
                    _ => tradeoff::TradeoffConfig::default(),
                };
                Self::Tradeoff(tradeoff::TradeoffMatrix::new(surface, config))
            }
            (WidgetVariant::QuickTap, _) => {
                Self::QuickTap(quick_tap::QuickTap::new(surface, choices.to_vec(), at_ms))
            }
            (WidgetVariant::Grid { columns }, _) => Self::Grid(visual_grid::VisualGrid::new(
                surface,
                choices.to_vec(),
                columns,
                at_ms,
            )),
        }
    }

    /// Feeds a pointer event, returning an outcome when the interaction completes
    ///
    /// Board-style widgets (drag-connect, pattern grid, ranking) only finish
    /// through [`Widget::submit`].
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Outcome> {
        match self {
            Self::Scrub(w) => w.handle_pointer(event).map(Outcome::from),
            Self::Swipe(w) => w.handle_pointer(event).map(Outcome::from),
            Self::QuickTap(w) => w.handle_pointer(event).map(Outcome::from),
            Self::Tradeoff(w) => w.handle_pointer(event).map(Outcome::from),
            Self::Grid(w) => w.handle_pointer(event).map(Outcome::from),
            Self::DragConnect(w) => {
                w.handle_pointer(event);
                None
            }
            Self::PatternGrid(w) => {
                w.handle_pointer(event);
                None
            }
            Self::Ranking(w) => {
                w.handle_pointer(event);
                None
            }
        }
    }

    /// Submits board-style widgets; single-shot widgets return `None`
    pub fn submit(&self) -> Option<Outcome> {
        match self {
            Self::DragConnect(w) => Some(w.submit().into()),
            Self::PatternGrid(w) => Some(w.submit().into()),
            Self::Ranking(w) => Some(w.submit().into()),
            Self::Scrub(_) | Self::Swipe(_) | Self::QuickTap(_) | Self::Tradeoff(_) | Self::Grid(_) => {
                None
            }
        }
    }

    /// Builds the view model of the live widget
    pub fn view(&self, style: &StyleTokens) -> WidgetView {
        match self {
            Self::Scrub(w) => WidgetView::Scrub(w.view(style)),
            Self::Swipe(w) => WidgetView::Swipe(w.view(style)),
            Self::QuickTap(w) => WidgetView::QuickTap(w.view(style)),
            Self::DragConnect(w) => WidgetView::DragConnect(w.view(style)),
            Self::PatternGrid(w) => WidgetView::PatternGrid(w.view(style)),
            Self::Tradeoff(w) => WidgetView::Tradeoff(w.view(style)),
            Self::Ranking(w) => WidgetView::Ranking(w.view(style)),
            Self::Grid(w) => WidgetView::Grid(w.view(style)),
        }
    }
}
