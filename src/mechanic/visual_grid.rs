//! Multi-choice visual grid
//!
//! The generic layout every unrecognised mechanic falls back to. Choices are
//! laid out in one column when there are few of them and in a wider grid
//! otherwise, each cell showing its text and optional icon or image. A
//! single tap selects a choice.

use itertools::Itertools;
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{
    design::StyleTokens,
    scene::Choice,
    telemetry::{PointerEvent, PointerPhase},
};

use super::{
    common::{PointerInput, Rect, Render, grid_cells},
    media::Media,
};

/// Column count of the grid for a number of choices
pub fn columns_for(count: usize) -> usize {
    match count {
        0..=crate::constants::visual_grid::SINGLE_COLUMN_MAX => 1,
        5..=8 => 2,
        _ => 3,
    }
}

/// A selected choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Index of the selected cell
    pub index: usize,
    /// Selected option
    pub choice: Choice,
    /// Milliseconds between activation and selection
    pub latency_ms: u64,
}

impl Selection {
    /// Whether the selected option is the ground-truth answer
    pub fn is_correct(&self) -> bool {
        self.choice.is_correct()
    }
}

/// Visual grid widget state
#[derive(Debug, Clone)]
pub struct VisualGrid {
    choices: Vec<Choice>,
    columns: usize,
    cells: Vec<Rect>,
    started_at: u64,
    selected: Option<usize>,
}

impl VisualGrid {
    /// Lays the choices out inside `area`, timing selections from `at_ms`
    pub fn new(area: Rect, choices: Vec<Choice>, columns: usize, at_ms: u64) -> Self {
        Self {
            cells: grid_cells(area, choices.len(), columns),
            choices,
            columns,
            started_at: at_ms,
            selected: None,
        }
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Currently selected cell
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Selects a cell, replacing any previous selection
    pub fn select(&mut self, index: usize, at_ms: u64) -> Option<Selection> {
        let choice = self.choices.get(index)?.clone();
        self.selected = Some(index);
        Some(Selection {
            index,
            choice,
            latency_ms: at_ms.saturating_sub(self.started_at),
        })
    }
}

impl PointerInput for VisualGrid {
    type Output = Selection;

    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Selection> {
        if event.phase != PointerPhase::Up {
            return None;
        }
        let index = self.cells.iter().position(|cell| cell.contains(event.position))?;
        self.select(index, event.at_ms)
    }
}

/// One cell of the grid view
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    /// Cell rectangle
    pub rect: Rect,
    /// Choice text
    pub label: String,
    /// Optional visual
    pub media: Option<Media>,
    /// Whether the brand badge is shown
    pub brand_aligned: bool,
    /// Border colour
    pub border: String,
}

impl Render for VisualGrid {
    type View = Vec<GridCell>;

    fn view(&self, style: &StyleTokens) -> Vec<GridCell> {
        self.choices
            .iter()
            .zip(self.cells.iter())
            .enumerate()
            .map(|(i, (choice, rect))| GridCell {
                rect: *rect,
                label: choice.text().to_string(),
                media: choice.media().cloned(),
                brand_aligned: choice.is_brand_aligned(),
                border: if self.selected == Some(i) {
                    style.highlight.clone()
                } else {
                    style.secondary.clone()
                },
            })
            .collect_vec()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::telemetry::{Point, PointerId};

    fn choices(count: usize) -> Vec<Choice> {
        (0..count)
            .map(|i| Choice::new(format!("Option {i}"), i == 1))
            .collect_vec()
    }

    #[test]
    fn test_columns_for() {
        assert_eq!(columns_for(3), 1);
        assert_eq!(columns_for(4), 1);
        assert_eq!(columns_for(5), 2);
        assert_eq!(columns_for(8), 2);
        assert_eq!(columns_for(10), 3);
    }

    #[test]
    fn test_select_by_tap() {
        let mut grid = VisualGrid::new(Rect::new(0., 0., 200., 300.), choices(6), 2, 100);
        let release = PointerEvent::new(PointerId(1), PointerPhase::Up, Point::new(150., 50.), 600);
        let selection = grid.handle_pointer(&release).unwrap();
        assert_eq!(selection.index, 1);
        assert!(selection.is_correct());
        assert_eq!(selection.latency_ms, 500);
    }

    #[test]
    fn test_reselect_replaces() {
        let mut grid = VisualGrid::new(Rect::new(0., 0., 200., 300.), choices(3), 1, 0);
        grid.select(0, 10);
        grid.select(2, 20);
        assert_eq!(grid.selected(), Some(2));
        assert!(grid.select(7, 30).is_none());
        assert_eq!(grid.selected(), Some(2));
    }

    #[test]
    fn test_view_marks_selection() {
        let style = StyleTokens::default();
        let mut grid = VisualGrid::new(Rect::new(0., 0., 200., 300.), choices(3), 1, 0);
        grid.select(1, 5);
        let view = grid.view(&style);
        assert_eq!(view.len(), 3);
        assert_eq!(view[1].border, style.highlight);
        assert_eq!(view[2].rect, Rect::new(0., 200., 200., 100.));
    }
}
