//! Shared geometry and traits for mechanic widgets
//!
//! This module contains the pieces every widget needs: an axis-aligned
//! rectangle for layout and hit-testing, the drag phase enum, and the traits
//! that give widgets a uniform pointer and view interface.

use serde::{Deserialize, Serialize};

use crate::{
    design::StyleTokens,
    telemetry::{PointerEvent, Point},
};

/// Axis-aligned rectangle in logical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub w: f64,
    /// Height
    pub h: f64,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Centre point
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2., self.y + self.h / 2.)
    }

    /// Whether the point lies inside the rectangle, edges included
    pub fn contains(&self, point: Point) -> bool {
        (self.x..=self.right()).contains(&point.x) && (self.y..=self.bottom()).contains(&point.y)
    }

    /// Splits the rectangle into horizontal bands with the given percentages
    pub fn split_rows(&self, percents: &[u8]) -> Vec<Rect> {
        let mut top = self.y;
        percents
            .iter()
            .map(|percent| {
                let h = self.h * f64::from(*percent) / 100.;
                let band = Rect::new(self.x, top, self.w, h);
                top += h;
                band
            })
            .collect()
    }
}

/// Interaction phase of a drag-driven widget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// No pointer held
    #[default]
    Idle,
    /// A gesture is in progress
    Dragging,
}

/// Widgets driven by raw pointer events
///
/// Hosts forward every pointer event that lands on the interaction surface,
/// in order, and never interpret gestures themselves. Each widget decides
/// which events start, continue or end one of its interactions.
pub trait PointerInput {
    /// Value emitted when an interaction completes
    type Output;

    /// Feeds one pointer event, returning a result when an interaction completes
    ///
    /// # Arguments
    ///
    /// * `event` - The pointer event, with its position in surface coordinates
    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Self::Output>;
}

/// Widgets that can describe their presentation for the host renderer
pub trait Render {
    /// Serializable view model
    type View: Serialize;

    /// Builds the view model using explicit style tokens
    fn view(&self, style: &StyleTokens) -> Self::View;
}

/// Lays out `count` equal rows stacked inside `area`
pub fn stack_rows(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let h = area.h / count as f64;
    (0..count)
        .map(|i| Rect::new(area.x, area.y + h * i as f64, area.w, h))
        .collect()
}

/// Lays out `count` cells row-major in a grid with `columns` columns
pub fn grid_cells(area: Rect, count: usize, columns: usize) -> Vec<Rect> {
    let columns = columns.max(1);
    let rows = count.div_ceil(columns).max(1);
    let w = area.w / columns as f64;
    let h = area.h / rows as f64;
    (0..count)
        .map(|i| {
            let (row, col) = (i / columns, i % columns);
            Rect::new(area.x + w * col as f64, area.y + h * row as f64, w, h)
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10., 10., 100., 50.);
        assert!(rect.contains(Point::new(10., 10.)));
        assert!(rect.contains(Point::new(110., 60.)));
        assert!(!rect.contains(Point::new(110.1, 30.)));
        assert!(!rect.contains(Point::new(50., 9.)));
    }

    #[test]
    fn test_split_rows() {
        let rows = Rect::new(0., 0., 400., 800.).split_rows(&[30, 50, 20]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Rect::new(0., 0., 400., 240.));
        assert_eq!(rows[1], Rect::new(0., 240., 400., 400.));
        assert_eq!(rows[2], Rect::new(0., 640., 400., 160.));
    }

    #[test]
    fn test_grid_cells_row_major() {
        let cells = grid_cells(Rect::new(0., 0., 200., 200.), 4, 2);
        assert_eq!(cells[1], Rect::new(100., 0., 100., 100.));
        assert_eq!(cells[2], Rect::new(0., 100., 100., 100.));
        assert!(grid_cells(Rect::default(), 0, 3).is_empty());
    }

    #[test]
    fn test_stack_rows() {
        let rows = stack_rows(Rect::new(0., 0., 100., 300.), 3);
        assert_eq!(rows[2], Rect::new(0., 200., 100., 100.));
        assert!(stack_rows(Rect::default(), 0).is_empty());
    }
}
