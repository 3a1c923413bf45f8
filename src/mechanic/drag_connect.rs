//! Drag-connect graph matching
//!
//! Two fixed columns of nodes are shown: sources on the left and targets on
//! the right. A drag must start on a source node and commits a connection
//! when it ends within the hit box of a target node. Every source has at most
//! one outgoing connection, so dragging from a connected source again
//! replaces its edge; several sources may point at the same target.

use std::collections::BTreeMap;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::drag_connect::{HIT_RADIUS_X, HIT_RADIUS_Y},
    design::StyleTokens,
    scene::Choice,
    telemetry::{Gesture, GestureStep, Point, PointerEvent, PointerPhase, TelemetrySample},
};

use super::common::{PointerInput, Rect, Render, stack_rows};

/// Node labels and answer key of a drag-connect scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ConnectConfig {
    /// Left column labels
    #[garde(length(min = 1, max = crate::constants::scene::MAX_CHOICES),
        inner(length(chars, max = crate::constants::text::MAX_CHOICE_LENGTH))
    )]
    pub sources: Vec<String>,
    /// Right column labels
    #[garde(length(min = 1, max = crate::constants::scene::MAX_CHOICES),
        inner(length(chars, max = crate::constants::text::MAX_CHOICE_LENGTH))
    )]
    pub targets: Vec<String>,
    /// Expected `(source, target)` connections
    #[garde(
        length(max = crate::constants::scene::MAX_CHOICES),
        custom(validate_expected(self.sources.len(), self.targets.len()))
    )]
    pub expected: Vec<(usize, usize)>,
}

/// Checks the answer key against the node columns
///
/// Every edge must join existing nodes and each source appears at most once.
fn validate_expected(
    sources: usize,
    targets: usize,
) -> impl FnOnce(&Vec<(usize, usize)>, &()) -> garde::Result {
    move |expected, _| {
        if let Some((source, target)) = expected.iter().find(|(s, t)| *s >= sources || *t >= targets) {
            return Err(garde::Error::new(format!(
                "edge {source}->{target} is outside a {sources}x{targets} board"
            )));
        }
        match expected.iter().map(|(source, _)| source).duplicates().next() {
            Some(source) => Err(garde::Error::new(format!("source {source} is connected twice"))),
            None => Ok(()),
        }
    }
}

impl ConnectConfig {
    /// Builds an alignment exercise from scene choices
    ///
    /// Each choice becomes a source; the correct ones belong on the
    /// "Aligned" target and the rest on "Misaligned".
    pub fn from_choices(choices: &[Choice]) -> Self {
        Self {
            sources: choices.iter().map(|c| c.text().to_string()).collect_vec(),
            targets: vec!["Aligned".to_string(), "Misaligned".to_string()],
            expected: choices
                .iter()
                .enumerate()
                .map(|(i, c)| (i, usize::from(!c.is_correct())))
                .collect_vec(),
        }
    }
}

/// A connection committed by one drag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    /// Source node index
    pub source: usize,
    /// Target node index
    pub target: usize,
    /// Telemetry of the drag
    pub samples: Vec<TelemetrySample>,
}

/// Final state of a drag-connect board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matching {
    /// Committed `(source, target)` edges ordered by source
    pub connections: Vec<(usize, usize)>,
    /// Whether the edges equal the answer key exactly
    pub correct: bool,
    /// Telemetry of every committed drag, in order
    pub samples: Vec<TelemetrySample>,
}

/// Drag-connect widget state
///
/// Source nodes sit at one fifth of the width and target nodes at four
/// fifths, each column spread evenly over the full height. Hits are tested
/// against a rectangular box around each node; when several boxes overlap
/// the nearest node wins.
///
/// Connections are keyed by source. A drag that ends away from every target
/// leaves the board unchanged and records no telemetry.
#[derive(Debug, Clone)]
pub struct DragConnect {
    config: ConnectConfig,
    left: Vec<Point>,
    right: Vec<Point>,
    connections: BTreeMap<usize, usize>,
    dragging_from: Option<usize>,
    cursor: Option<Point>,
    gesture: Gesture,
    samples: Vec<TelemetrySample>,
}

impl DragConnect {
    /// Lays the two node columns out inside `area`
    pub fn new(area: Rect, config: ConnectConfig) -> Self {
        let column = |count: usize, fraction: f64| {
            stack_rows(area, count)
                .into_iter()
                .map(|row| Point::new(area.x + area.w * fraction, row.center().y))
                .collect_vec()
        };
        Self {
            left: column(config.sources.len(), 0.2),
            right: column(config.targets.len(), 0.8),
            config,
            connections: BTreeMap::new(),
            dragging_from: None,
            cursor: None,
            gesture: Gesture::default(),
            samples: Vec::new(),
        }
    }

    /// Centres of the source nodes
    pub fn sources(&self) -> &[Point] {
        &self.left
    }

    /// Centres of the target nodes
    pub fn targets(&self) -> &[Point] {
        &self.right
    }

    /// Committed connections keyed by source
    pub fn connections(&self) -> &BTreeMap<usize, usize> {
        &self.connections
    }

    /// Connects `source` to `target`, replacing any previous edge of `source`
    pub fn connect(&mut self, source: usize, target: usize) -> bool {
        if source >= self.left.len() || target >= self.right.len() {
            return false;
        }
        if let Some(previous) = self.connections.insert(source, target) {
            tracing::trace!(source, previous, target, "connection replaced");
        }
        true
    }

    /// Snapshot of the board with its correctness
    pub fn submit(&self) -> Matching {
        let expected: BTreeMap<usize, usize> = self.config.expected.iter().copied().collect();
        Matching {
            connections: self.connections.iter().map(|(s, t)| (*s, *t)).collect_vec(),
            correct: self.connections == expected,
            samples: self.samples.clone(),
        }
    }

    fn hit(nodes: &[Point], point: Point) -> Option<usize> {
        nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                (node.x - point.x).abs() <= HIT_RADIUS_X && (node.y - point.y).abs() <= HIT_RADIUS_Y
            })
            .min_by(|(_, a), (_, b)| a.distance(point).total_cmp(&b.distance(point)))
            .map(|(i, _)| i)
    }
}

impl PointerInput for DragConnect {
    type Output = Connection;

    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Connection> {
        if event.phase == PointerPhase::Down && !self.gesture.is_active() {
            self.dragging_from = Some(Self::hit(&self.left, event.position)?);
        }
        match self.gesture.handle(event) {
            GestureStep::Started(position) | GestureStep::Moved(position) => {
                self.cursor = Some(position);
                None
            }
            GestureStep::Ended {
                position, samples, ..
            } => {
                self.cursor = None;
                let source = self.dragging_from.take()?;
                let Some(target) = Self::hit(&self.right, position) else {
                    tracing::trace!(source, "drag dropped away from targets");
                    return None;
                };
                self.connect(source, target);
                self.samples.extend_from_slice(&samples);
                Some(Connection {
                    source,
                    target,
                    samples,
                })
            }
            GestureStep::Ignored => None,
        }
    }
}

/// View model of the board
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectView {
    /// Source nodes with labels
    pub sources: Vec<(Point, String)>,
    /// Target nodes with labels
    pub targets: Vec<(Point, String)>,
    /// Committed edges as line segments
    pub edges: Vec<(Point, Point)>,
    /// Edge being dragged, from its source to the pointer
    pub pending: Option<(Point, Point)>,
    /// Edge colour
    pub edge_color: String,
}

impl Render for DragConnect {
    type View = ConnectView;

    fn view(&self, style: &StyleTokens) -> ConnectView {
        let labelled = |points: &[Point], labels: &[String]| {
            points.iter().copied().zip(labels.iter().cloned()).collect_vec()
        };
        ConnectView {
            sources: labelled(&self.left, &self.config.sources),
            targets: labelled(&self.right, &self.config.targets),
            edges: self
                .connections
                .iter()
                .map(|(s, t)| (self.left[*s], self.right[*t]))
                .collect_vec(),
            pending: self
                .dragging_from
                .zip(self.cursor)
                .map(|(s, cursor)| (self.left[s], cursor)),
            edge_color: style.accent.clone(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::telemetry::PointerId;

    fn board() -> DragConnect {
        DragConnect::new(
            Rect::new(0., 0., 500., 300.),
            ConnectConfig {
                sources: vec!["Speed".into(), "Quality".into(), "Cost".into()],
                targets: vec!["Customer".into(), "Budget".into()],
                expected: vec![(0, 0), (1, 0), (2, 1)],
            },
        )
    }

    fn drag(board: &mut DragConnect, from: Point, to: Point, at_ms: u64) -> Option<Connection> {
        let id = PointerId(1);
        board.handle_pointer(&PointerEvent::new(id, PointerPhase::Down, from, at_ms));
        board.handle_pointer(&PointerEvent::new(id, PointerPhase::Move, to, at_ms + 20));
        board.handle_pointer(&PointerEvent::new(id, PointerPhase::Up, to, at_ms + 40))
    }

    #[test]
    fn test_layout() {
        let board = board();
        assert_eq!(board.sources()[0], Point::new(100., 50.));
        assert_eq!(board.targets()[1], Point::new(400., 225.));
    }

    #[test]
    fn test_connection_commits_within_hit_box() {
        let mut board = board();
        let (source, target) = (board.sources()[0], board.targets()[0]);
        let made = drag(&mut board, source, Point::new(target.x + 29., target.y - 19.), 0).unwrap();
        assert_eq!((made.source, made.target), (0, 0));
        assert_eq!(made.samples.len(), 3);
    }

    #[test]
    fn test_drop_outside_hit_box() {
        let mut board = board();
        let (source, target) = (board.sources()[0], board.targets()[0]);
        assert!(drag(&mut board, source, Point::new(target.x, target.y + 21.), 0).is_none());
        assert!(board.connections().is_empty());
    }

    #[test]
    fn test_drag_must_start_on_source() {
        let mut board = board();
        let (target, other) = (board.targets()[0], board.targets()[1]);
        assert!(drag(&mut board, Point::new(250., 50.), target, 0).is_none());
        assert!(drag(&mut board, other, target, 100).is_none());
        assert!(board.connections().is_empty());
    }

    #[test]
    fn test_redrag_replaces() {
        let mut board = board();
        let (source, t) = (board.sources()[1], board.targets().to_vec());
        drag(&mut board, source, t[0], 0);
        drag(&mut board, source, t[1], 100);
        assert_eq!(board.connections().len(), 1);
        assert_eq!(board.connections().get(&1), Some(&1));
    }

    #[test]
    fn test_many_to_one_and_submit() {
        let mut board = board();
        let (s, t) = (board.sources().to_vec(), board.targets().to_vec());
        drag(&mut board, s[0], t[0], 0);
        drag(&mut board, s[1], t[0], 100);
        assert!(!board.submit().correct);
        drag(&mut board, s[2], t[1], 200);
        let matching = board.submit();
        assert!(matching.correct);
        assert_eq!(matching.connections, vec![(0, 0), (1, 0), (2, 1)]);
        assert_eq!(matching.samples.len(), 9);
    }

    #[test]
    fn test_connect_rejects_unknown_nodes() {
        let mut board = board();
        assert!(!board.connect(5, 0));
        assert!(!board.connect(0, 5));
        assert!(board.connect(0, 1));
    }

    #[test]
    fn test_from_choices() {
        let config = ConnectConfig::from_choices(&[
            Choice::new("Listen first", true),
            Choice::new("Interrupt", false),
        ]);
        assert_eq!(config.expected, vec![(0, 0), (1, 1)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_answer_key_validation() {
        let config = |expected: Vec<(usize, usize)>| ConnectConfig {
            sources: vec!["Speed".into(), "Cost".into()],
            targets: vec!["Customer".into(), "Budget".into()],
            expected,
        };
        assert!(config(vec![(0, 1), (1, 1)]).validate().is_ok());
        assert!(config(vec![(2, 0)]).validate().is_err());
        assert!(config(vec![(0, 2)]).validate().is_err());
        assert!(config(vec![(0, 0), (0, 1)]).validate().is_err());
    }

    #[test]
    fn test_view_pending_edge() {
        let mut board = board();
        let from = board.sources()[2];
        board.handle_pointer(&PointerEvent::new(PointerId(1), PointerPhase::Down, from, 0));
        let view = board.view(&StyleTokens::default());
        assert_eq!(view.pending, Some((from, from)));
        assert!(view.edges.is_empty());
        assert_eq!(view.sources.len(), 3);
    }
}
