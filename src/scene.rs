//! Scenes and choices as authored in the studio
//!
//! A scene is one question bound to one sub-competency. Its mechanic and
//! time limit come from the framework table and are read-only; authors edit
//! only the question text and the text, brand flag and visual of each
//! choice. Ground-truth correctness is fixed when the scene is created.

use std::{fmt::Display, str::FromStr};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay, skip_serializing_none};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    constants::scene::TIME_LIMITS,
    mechanic::{
        Mechanic, WidgetVariant, drag_connect::ConnectConfig, media::Media,
        pattern_grid::PatternConfig, scrub::ScrubConfig, tradeoff::TradeoffConfig,
    },
};

/// A unique identifier for scenes, choices and framework rows
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Errors raised while editing a scene
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A choice index did not refer to an existing choice
    #[error("choice index out of range")]
    ChoiceOutOfRange,
    /// A time limit other than 30, 45 or 60 seconds was requested
    #[error("unsupported time limit of {0} seconds")]
    UnsupportedTimeLimit(u64),
}

/// Time allowed for a scene, displayed to the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum TimeLimit {
    /// 30 seconds
    #[default]
    Short,
    /// 45 seconds
    Medium,
    /// 60 seconds
    Long,
}

impl TimeLimit {
    /// Every limit, shortest first
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];

    /// Length of the limit in seconds
    pub const fn seconds(self) -> u64 {
        TIME_LIMITS[self as usize]
    }

    /// Length of the limit in milliseconds
    pub const fn millis(self) -> u64 {
        self.seconds() * 1000
    }
}

impl TryFrom<u64> for TimeLimit {
    type Error = Error;

    fn try_from(seconds: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|limit| limit.seconds() == seconds)
            .ok_or(Error::UnsupportedTimeLimit(seconds))
    }
}

impl From<TimeLimit> for u64 {
    fn from(limit: TimeLimit) -> Self {
        limit.seconds()
    }
}

/// One answer option of a scene
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Choice {
    /// Stable identifier
    #[garde(skip)]
    id: Id,
    /// Text shown to the player
    #[garde(length(chars, min = 1, max = crate::constants::text::MAX_CHOICE_LENGTH))]
    text: String,
    /// Ground truth, hidden from the author and locked after creation
    #[garde(skip)]
    is_correct: bool,
    /// Whether the choice reflects the brand voice (display only, never scored)
    #[garde(skip)]
    brand_aligned: bool,
    /// Optional icon or image
    #[garde(dive)]
    media: Option<Media>,
}

impl Choice {
    /// Creates a choice with a fresh ID
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: Id::new(),
            text: text.into(),
            is_correct,
            brand_aligned: false,
            media: None,
        }
    }

    /// Returns the choice with its brand flag set
    #[must_use]
    pub fn brand_aligned(mut self, aligned: bool) -> Self {
        self.brand_aligned = aligned;
        self
    }

    /// Returns the choice with a visual attached
    #[must_use]
    pub fn with_media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    /// Stable identifier
    pub fn id(&self) -> Id {
        self.id
    }

    /// Text shown to the player
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this is the ground-truth answer
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// Whether the choice is marked as brand aligned
    pub fn is_brand_aligned(&self) -> bool {
        self.brand_aligned
    }

    /// Attached visual, if any
    pub fn media(&self) -> Option<&Media> {
        self.media.as_ref()
    }
}

/// Mechanic-specific tuning carried by a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MechanicParams {
    /// The widget's defaults apply
    #[default]
    Default,
    /// Target zone for a continuous scrub
    Scrub(#[garde(dive)] ScrubConfig),
    /// Grid size and correct pattern
    PatternGrid(#[garde(dive)] PatternConfig),
    /// Quadrant labels and the correct quadrant
    Tradeoff(#[garde(dive)] TradeoffConfig),
    /// Node labels and expected connections
    DragConnect(#[garde(dive)] ConnectConfig),
}

/// A question bound to a sub-competency, rendered through one mechanic
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Scene {
    /// Stable identifier
    #[garde(skip)]
    id: Id,
    /// Question shown above the interaction
    #[garde(length(chars, min = 1, max = crate::constants::scene::MAX_QUESTION_LENGTH))]
    question: String,
    /// Answer options
    #[garde(
        length(min = crate::constants::scene::MIN_CHOICES, max = crate::constants::scene::MAX_CHOICES),
        dive
    )]
    choices: Vec<Choice>,
    /// Displayed time limit (read-only)
    #[garde(skip)]
    time_limit: TimeLimit,
    /// Mechanic resolved from the framework (read-only)
    #[garde(skip)]
    mechanic: Mechanic,
    /// Sub-competency the scene assesses
    #[garde(skip)]
    sub_competency_id: Id,
    /// Mechanic tuning (read-only)
    #[serde(default)]
    #[garde(dive)]
    params: MechanicParams,
}

impl Scene {
    /// Creates a scene for a sub-competency
    pub fn new(
        sub_competency_id: Id,
        mechanic: Mechanic,
        time_limit: TimeLimit,
        question: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            id: Id::new(),
            question: question.into(),
            choices,
            time_limit,
            mechanic,
            sub_competency_id,
            params: MechanicParams::default(),
        }
    }

    /// Returns the scene with mechanic tuning attached
    #[must_use]
    pub fn with_params(mut self, params: MechanicParams) -> Self {
        self.params = params;
        self
    }

    /// Stable identifier
    pub fn id(&self) -> Id {
        self.id
    }

    /// Question text
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Answer options
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Displayed time limit
    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }

    /// Mechanic the scene is rendered through
    pub fn mechanic(&self) -> Mechanic {
        self.mechanic
    }

    /// Sub-competency the scene assesses
    pub fn sub_competency_id(&self) -> Id {
        self.sub_competency_id
    }

    /// Mechanic tuning
    pub fn params(&self) -> &MechanicParams {
        &self.params
    }

    /// Widget layout this scene renders with
    pub fn widget_variant(&self) -> WidgetVariant {
        WidgetVariant::for_mechanic(self.mechanic, self.choices.len())
    }

    /// Index of the first ground-truth choice
    pub fn correct_index(&self) -> Option<usize> {
        self.choices.iter().position(Choice::is_correct)
    }

    /// Replaces the question text
    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// Replaces the text of one choice
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChoiceOutOfRange`] if `index` is not a valid choice.
    pub fn set_choice_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), Error> {
        self.choice_mut(index)?.text = text.into();
        Ok(())
    }

    /// Replaces or clears the visual of one choice
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChoiceOutOfRange`] if `index` is not a valid choice.
    pub fn set_choice_media(&mut self, index: usize, media: Option<Media>) -> Result<(), Error> {
        self.choice_mut(index)?.media = media;
        Ok(())
    }

    /// Sets the brand flag of one choice
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChoiceOutOfRange`] if `index` is not a valid choice.
    pub fn set_brand_aligned(&mut self, index: usize, aligned: bool) -> Result<(), Error> {
        self.choice_mut(index)?.brand_aligned = aligned;
        Ok(())
    }

    /// Authoring warnings that block moving on, empty when the scene is playable
    pub fn warnings(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(report) => report
                .iter()
                .map(|(path, error)| format!("{path}: {error}"))
                .collect_vec(),
        }
    }

    fn choice_mut(&mut self, index: usize) -> Result<&mut Choice, Error> {
        self.choices.get_mut(index).ok_or(Error::ChoiceOutOfRange)
    }
}
