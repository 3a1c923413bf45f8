//! Pattern grid
//!
//! An N×N grid of cells that the player selects either by clicking
//! (toggling one cell) or by dragging across cells, which paints every
//! entered cell into the selection and never clears one. Submission checks
//! the selection against the correct pattern by exact set equality.

use std::collections::BTreeSet;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::pattern_grid::{DEFAULT_SIZE, MAX_SIZE},
    design::StyleTokens,
    telemetry::{Gesture, GestureStep, Point, PointerEvent, TelemetrySample},
};

use super::common::{PointerInput, Rect, Render, grid_cells};

type ValidationResult = garde::Result;

/// Side length and correct cells of a pattern scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PatternConfig {
    /// Grid side length
    #[garde(range(min = 2, max = MAX_SIZE))]
    pub size: usize,
    /// Row-major indices of the correct cells
    #[garde(custom(validate_pattern(self.size)))]
    pub pattern: BTreeSet<usize>,
}

/// Checks that every pattern cell lies on the grid
///
/// The `size` rule reports its own range error, but garde still runs this
/// rule afterwards, so an oversized side length must not be squared here.
///
/// # Arguments
///
/// * `size` - The side length declared next to the pattern, possibly out of
///   range
fn validate_pattern(size: usize) -> impl FnOnce(&BTreeSet<usize>, &()) -> ValidationResult {
    move |pattern, _| {
        let Some(cells) = size.checked_mul(size).filter(|_| size <= MAX_SIZE) else {
            return Err(garde::Error::new(format!(
                "a {size}x{size} grid exceeds the maximum of {MAX_SIZE}x{MAX_SIZE}"
            )));
        };
        match pattern.iter().find(|cell| **cell >= cells) {
            Some(cell) => Err(garde::Error::new(format!(
                "cell {cell} is outside a {size}x{size} grid"
            ))),
            None => Ok(()),
        }
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            pattern: BTreeSet::new(),
        }
    }
}

/// A submitted selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    /// Selected cells in ascending order
    pub selected: Vec<usize>,
    /// Whether the selection equals the pattern exactly
    pub correct: bool,
    /// Telemetry of every paint gesture, in order
    pub samples: Vec<TelemetrySample>,
}

/// Pattern grid widget state
///
/// Holds the laid-out cells, the live selection and the paint gesture in
/// progress. A press toggles the cell under it; every other cell entered
/// while the pointer stays down is painted into the selection. Telemetry of
/// each finished gesture is appended so that a submission carries the
/// samples of the whole interaction.
///
/// Configurations loaded from storage may never have been validated, so the
/// side length is clamped to `1..=MAX_SIZE` when the grid is laid out.
#[derive(Debug, Clone)]
pub struct PatternGrid {
    config: PatternConfig,
    cells: Vec<Rect>,
    selected: BTreeSet<usize>,
    last_painted: Option<usize>,
    gesture: Gesture,
    samples: Vec<TelemetrySample>,
}

impl PatternGrid {
    /// Lays the grid out inside `area`
    ///
    /// # Arguments
    ///
    /// * `area` - The interaction region the cells are split from
    /// * `config` - Side length and answer pattern; an out-of-range side
    ///   length is clamped
    pub fn new(area: Rect, mut config: PatternConfig) -> Self {
        config.size = config.size.clamp(1, MAX_SIZE);
        let size = config.size;
        Self {
            cells: grid_cells(area, size * size, size),
            config,
            selected: BTreeSet::new(),
            last_painted: None,
            gesture: Gesture::default(),
            samples: Vec::new(),
        }
    }

    /// Grid side length
    pub fn size(&self) -> usize {
        self.config.size
    }

    /// Currently selected cells
    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    /// Flips one cell, returning whether it is now selected
    pub fn toggle(&mut self, cell: usize) -> bool {
        if cell >= self.cells.len() {
            return false;
        }
        if self.selected.remove(&cell) {
            false
        } else {
            self.selected.insert(cell)
        }
    }

    /// Adds one cell without ever removing it
    pub fn paint(&mut self, cell: usize) {
        if cell < self.cells.len() {
            self.selected.insert(cell);
        }
    }

    /// Clears the selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Compares the selection with the pattern
    pub fn submit(&self) -> Submission {
        Submission {
            selected: self.selected.iter().copied().collect_vec(),
            correct: self.selected == self.config.pattern,
            samples: self.samples.clone(),
        }
    }

    /// Cell under a point
    pub fn cell_at(&self, point: Point) -> Option<usize> {
        self.cells.iter().position(|cell| cell.contains(point))
    }
}

impl PointerInput for PatternGrid {
    type Output = ();

    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<()> {
        if !self.gesture.is_active() && self.cell_at(event.position).is_none() {
            return None;
        }
        match self.gesture.handle(event) {
            GestureStep::Started(position) => {
                self.last_painted = self.cell_at(position);
                if let Some(cell) = self.last_painted {
                    self.toggle(cell);
                }
                None
            }
            GestureStep::Moved(position) => {
                let cell = self.cell_at(position);
                if let Some(entered) = cell.filter(|_| cell != self.last_painted) {
                    self.last_painted = cell;
                    self.paint(entered);
                }
                None
            }
            GestureStep::Ended { samples, .. } => {
                self.last_painted = None;
                self.samples.extend(samples);
                Some(())
            }
            GestureStep::Ignored => None,
        }
    }
}

/// View model of the grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridView {
    /// Grid side length
    pub size: usize,
    /// Fill colour per cell in row-major order
    pub fills: Vec<String>,
}

impl Render for PatternGrid {
    type View = GridView;

    fn view(&self, style: &StyleTokens) -> GridView {
        GridView {
            size: self.config.size,
            fills: (0..self.cells.len())
                .map(|i| {
                    if self.selected.contains(&i) {
                        style.highlight.clone()
                    } else {
                        style.background.clone()
                    }
                })
                .collect_vec(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::telemetry::{PointerId, PointerPhase};

    fn grid(pattern: &[usize]) -> PatternGrid {
        PatternGrid::new(
            Rect::new(0., 0., 500., 500.),
            PatternConfig {
                size: 5,
                pattern: pattern.iter().copied().collect(),
            },
        )
    }

    fn center(cell: usize) -> Point {
        Point::new((cell % 5) as f64 * 100. + 50., (cell / 5) as f64 * 100. + 50.)
    }

    #[test]
    fn test_exact_match_any_order() {
        let mut grid = grid(&[0, 6, 12]);
        for cell in [12, 0, 6] {
            grid.toggle(cell);
        }
        assert!(grid.submit().correct);
    }

    #[test]
    fn test_subset_and_superset_incorrect() {
        let mut grid = grid(&[0, 6, 12]);
        grid.toggle(0);
        grid.toggle(6);
        assert!(!grid.submit().correct);
        grid.toggle(12);
        grid.toggle(13);
        assert!(!grid.submit().correct);
    }

    #[test]
    fn test_toggle_flips() {
        let mut grid = grid(&[]);
        assert!(grid.toggle(3));
        assert!(!grid.toggle(3));
        assert!(grid.selected().is_empty());
        assert!(!grid.toggle(25));
    }

    #[test]
    fn test_drag_paints_without_removing() {
        let mut grid = grid(&[1, 2, 3]);
        grid.toggle(2);
        let id = PointerId(1);
        grid.handle_pointer(&PointerEvent::new(id, PointerPhase::Down, center(1), 0));
        grid.handle_pointer(&PointerEvent::new(id, PointerPhase::Move, center(2), 20));
        grid.handle_pointer(&PointerEvent::new(id, PointerPhase::Move, center(3), 40));
        assert_eq!(
            grid.handle_pointer(&PointerEvent::new(id, PointerPhase::Up, center(3), 60)),
            Some(())
        );
        assert_eq!(grid.selected().iter().copied().collect_vec(), vec![1, 2, 3]);
        let submission = grid.submit();
        assert!(submission.correct);
        assert_eq!(submission.samples.len(), 4);
    }

    #[test]
    fn test_click_toggles_off() {
        let mut grid = grid(&[]);
        grid.toggle(7);
        let id = PointerId(1);
        grid.handle_pointer(&PointerEvent::new(id, PointerPhase::Down, center(7), 0));
        grid.handle_pointer(&PointerEvent::new(id, PointerPhase::Up, center(7), 10));
        assert!(grid.selected().is_empty());
    }

    #[test]
    fn test_pattern_validation() {
        let valid = PatternConfig {
            size: 3,
            pattern: [0, 8].into_iter().collect(),
        };
        assert!(valid.validate().is_ok());
        let outside = PatternConfig {
            size: 3,
            pattern: [9].into_iter().collect(),
        };
        assert!(outside.validate().is_err());
        let too_big = PatternConfig {
            size: MAX_SIZE + 1,
            pattern: BTreeSet::new(),
        };
        assert!(too_big.validate().is_err());
    }

    #[test]
    fn test_huge_size_reports_instead_of_overflowing() {
        let huge = PatternConfig {
            size: usize::MAX,
            pattern: [0].into_iter().collect(),
        };
        assert!(huge.validate().is_err());
        let squared_overflow = PatternConfig {
            size: 1 << (usize::BITS / 2),
            pattern: BTreeSet::new(),
        };
        assert!(squared_overflow.validate().is_err());
    }

    #[test]
    fn test_unvalidated_size_is_clamped() {
        let grid = PatternGrid::new(
            Rect::new(0., 0., 100., 100.),
            PatternConfig {
                size: usize::MAX,
                pattern: [0].into_iter().collect(),
            },
        );
        assert_eq!(grid.size(), MAX_SIZE);
        assert_eq!(grid.view(&StyleTokens::default()).fills.len(), MAX_SIZE * MAX_SIZE);
        let empty = PatternGrid::new(
            Rect::new(0., 0., 100., 100.),
            PatternConfig {
                size: 0,
                pattern: BTreeSet::new(),
            },
        );
        assert_eq!(empty.size(), 1);
    }

    #[test]
    fn test_view_fills() {
        let mut grid = grid(&[]);
        grid.toggle(4);
        let style = StyleTokens::default();
        let view = grid.view(&style);
        assert_eq!(view.fills.len(), 25);
        assert_eq!(view.fills[4], style.highlight);
        assert_eq!(view.fills[0], style.background);
    }
}
