//! Ranking drag list
//!
//! The choices are presented as a vertical list in shuffled order and the
//! player drags rows to put them in priority order. The authored order of
//! the choices is the correct ranking; a submission is correct only when
//! the arrangement matches it exactly.

use itertools::Itertools;
use serde::Serialize;

use crate::{
    design::StyleTokens,
    scene::{Choice, Id},
    telemetry::{Gesture, GestureStep, Point, PointerEvent, PointerPhase, TelemetrySample},
};

use super::common::{PointerInput, Rect, Render, stack_rows};

/// A row moved by one drag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reorder {
    /// Row the drag started on
    pub from: usize,
    /// Row the item was dropped on
    pub to: usize,
    /// Telemetry of the drag
    pub samples: Vec<TelemetrySample>,
}

/// A submitted ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSubmission {
    /// Choice IDs in the submitted order
    pub order: Vec<Id>,
    /// Whether the order matches the authored order exactly
    pub correct: bool,
    /// Number of items sitting at their authored position
    pub positional_matches: usize,
    /// Telemetry of every drag, in order
    pub samples: Vec<TelemetrySample>,
}

/// Ranking widget state
///
/// Rows are laid out top to bottom in their current order. A drag picks up
/// the row under the press and drops it at the row nearest the release,
/// shifting the rows in between by one.
///
/// The correct order is remembered by choice ID, so choice text can be
/// edited without affecting scoring.
#[derive(Debug, Clone)]
pub struct Ranking {
    area: Rect,
    correct: Vec<Id>,
    items: Vec<Choice>,
    dragging: Option<usize>,
    gesture: Gesture,
    samples: Vec<TelemetrySample>,
}

impl Ranking {
    /// Creates the list with a randomly shuffled presentation order
    pub fn new(area: Rect, choices: &[Choice]) -> Self {
        Self::with_rng(area, choices, &mut fastrand::Rng::new())
    }

    /// Creates the list shuffled with the given generator
    ///
    /// A list of two or more items never starts out already solved.
    ///
    /// # Arguments
    ///
    /// * `area` - The region the rows are stacked in
    /// * `choices` - The choices in their correct order
    /// * `rng` - The generator driving the shuffle
    pub fn with_rng(area: Rect, choices: &[Choice], rng: &mut fastrand::Rng) -> Self {
        let correct = choices.iter().map(Choice::id).collect_vec();
        let mut items = choices.to_vec();
        rng.shuffle(&mut items);
        if items.len() > 1 && items.iter().map(Choice::id).eq(correct.iter().copied()) {
            items.rotate_left(1);
        }
        Self {
            area,
            correct,
            items,
            dragging: None,
            gesture: Gesture::default(),
            samples: Vec::new(),
        }
    }

    /// Items in their current order
    pub fn items(&self) -> &[Choice] {
        &self.items
    }

    /// Moves the item at `from` so that it ends up at `to`
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Compares the current order with the authored one
    pub fn submit(&self) -> RankingSubmission {
        let order = self.items.iter().map(Choice::id).collect_vec();
        let positional_matches = order
            .iter()
            .zip(self.correct.iter())
            .filter(|(a, b)| a == b)
            .count();
        RankingSubmission {
            correct: order == self.correct,
            order,
            positional_matches,
            samples: self.samples.clone(),
        }
    }

    fn row_at(&self, point: Point) -> Option<usize> {
        stack_rows(self.area, self.items.len())
            .iter()
            .position(|row| row.contains(point))
    }

    // Drops above or below the list land on the first or last row.
    fn drop_row(&self, point: Point) -> usize {
        let last = self.items.len().saturating_sub(1);
        self.row_at(point).unwrap_or(if point.y < self.area.y { 0 } else { last })
    }
}

impl PointerInput for Ranking {
    type Output = Reorder;

    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Reorder> {
        if event.phase == PointerPhase::Down && !self.gesture.is_active() {
            self.dragging = Some(self.row_at(event.position)?);
        }
        match self.gesture.handle(event) {
            GestureStep::Ended {
                position, samples, ..
            } => {
                let from = self.dragging.take()?;
                let to = self.drop_row(position);
                self.move_item(from, to);
                self.samples.extend_from_slice(&samples);
                Some(Reorder { from, to, samples })
            }
            GestureStep::Started(_) | GestureStep::Moved(_) | GestureStep::Ignored => None,
        }
    }
}

/// One row of the ranking view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRow {
    /// 1-based rank shown next to the item
    pub rank: usize,
    /// Item label
    pub label: String,
    /// Row colour
    pub color: String,
}

impl Render for Ranking {
    type View = Vec<RankRow>;

    fn view(&self, style: &StyleTokens) -> Vec<RankRow> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| RankRow {
                rank: i + 1,
                label: item.text().to_string(),
                color: if self.dragging == Some(i) {
                    style.accent.clone()
                } else {
                    style.primary.clone()
                },
            })
            .collect_vec()
    }
}
