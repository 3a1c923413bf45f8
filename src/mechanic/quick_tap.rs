//! Quick tap buttons measuring decision latency
//!
//! The choices are listed as buttons. A latency timer starts the moment the
//! choice set becomes active, and the first tap records the chosen option and
//! the elapsed time. Every later tap is ignored until a different choice set
//! is activated.

use itertools::Itertools;
use serde::Serialize;

use crate::{
    design::StyleTokens,
    scene::{Choice, Id},
    telemetry::{PointerEvent, PointerPhase},
};

use super::common::{PointerInput, Rect, Render, stack_rows};

/// First tap of an activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tap {
    /// Index of the tapped button
    pub index: usize,
    /// Tapped option
    pub choice: Choice,
    /// Milliseconds between activation and the tap
    pub latency_ms: u64,
}

impl Tap {
    /// Whether the tapped option is the ground-truth answer
    pub fn is_correct(&self) -> bool {
        self.choice.is_correct()
    }
}

/// Quick tap widget state
///
/// Buttons are stacked in authored order. Only the first tap counts, and its
/// latency is measured from the moment the current choice
/// set was activated.
#[derive(Debug, Clone)]
pub struct QuickTap {
    area: Rect,
    choices: Vec<Choice>,
    started_at: u64,
    tapped: Option<Tap>,
}

impl QuickTap {
    /// Creates the widget and starts the latency timer at `at_ms`
    pub fn new(area: Rect, choices: Vec<Choice>, at_ms: u64) -> Self {
        Self {
            area,
            choices,
            started_at: at_ms,
            tapped: None,
        }
    }

    /// Activates a choice set, restarting the timer only when the set changed
    ///
    /// The set is identified by its choice IDs, so re-activating the same
    /// scene keeps the first tap and its timer.
    pub fn activate(&mut self, choices: Vec<Choice>, at_ms: u64) {
        if self.choice_ids() == choices.iter().map(Choice::id).collect_vec() {
            return;
        }
        self.choices = choices;
        self.started_at = at_ms;
        self.tapped = None;
    }

    /// Options in display order
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// The recorded first tap, if any
    pub fn tapped(&self) -> Option<&Tap> {
        self.tapped.as_ref()
    }

    /// Records a tap on a button, returning it only if it is the first
    pub fn tap(&mut self, index: usize, at_ms: u64) -> Option<Tap> {
        if self.tapped.is_some() {
            tracing::trace!(index, "ignoring tap after first decision");
            return None;
        }
        let choice = self.choices.get(index)?.clone();
        let tap = Tap {
            index,
            choice,
            latency_ms: at_ms.saturating_sub(self.started_at),
        };
        tracing::debug!(index, latency_ms = tap.latency_ms, "quick tap recorded");
        self.tapped = Some(tap.clone());
        Some(tap)
    }

    /// Button rectangles in display order
    pub fn buttons(&self) -> Vec<Rect> {
        stack_rows(self.area, self.choices.len())
    }

    fn choice_ids(&self) -> Vec<Id> {
        self.choices.iter().map(Choice::id).collect_vec()
    }
}

impl PointerInput for QuickTap {
    type Output = Tap;

    fn handle_pointer(&mut self, event: &PointerEvent) -> Option<Tap> {
        if event.phase != PointerPhase::Down {
            return None;
        }
        let index = self
            .buttons()
            .iter()
            .position(|button| button.contains(event.position))?;
        self.tap(index, event.at_ms)
    }
}

/// One button of the quick tap view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TapButton {
    /// Button label
    pub label: String,
    /// Button colour
    pub color: String,
    /// Whether the button accepts input
    pub enabled: bool,
}

impl Render for QuickTap {
    type View = Vec<TapButton>;

    fn view(&self, style: &StyleTokens) -> Vec<TapButton> {
        let chosen = self.tapped.as_ref().map(|tap| tap.index);
        self.choices
            .iter()
            .enumerate()
            .map(|(i, choice)| TapButton {
                label: choice.text().to_string(),
                color: if chosen == Some(i) {
                    style.highlight.clone()
                } else {
                    style.primary.clone()
                },
                enabled: chosen.is_none(),
            })
            .collect_vec()
    }
}
