//! Competency framework table
//!
//! The framework is the read-only source of truth for what a scene assesses
//! and how it is played. Each row binds a sub-competency statement to a
//! competency together with its action cue, mechanic label and scoring
//! parameters. Mechanic labels are resolved into [`Mechanic`] exactly once,
//! when rows are ingested, so nothing downstream matches strings again.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    constants::{
        scene::{MAX_CHOICES, MAX_QUESTION_LENGTH},
        text::{MAX_CHOICE_LENGTH, MAX_CUE_LENGTH},
    },
    mechanic::Mechanic,
    scene::{Choice, Id, MechanicParams, Scene, TimeLimit},
    scoring::Thresholds,
};

/// Errors raised while loading or querying the framework
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The data was not a JSON array of framework rows
    #[error("malformed framework data: {0}")]
    Malformed(String),
    /// A row failed validation
    #[error("invalid framework row {row}: {reason}")]
    InvalidRow {
        /// Zero-based row index
        row: usize,
        /// Validation report
        reason: String,
    },
    /// No sub-competency with the requested ID exists
    #[error("unknown sub-competency")]
    UnknownSubCompetency,
}

/// Answer option seeded into scenes created from a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeedChoice {
    /// Option text
    #[garde(length(chars, min = 1, max = MAX_CHOICE_LENGTH))]
    pub text: String,
    /// Ground truth
    #[serde(default)]
    #[garde(skip)]
    pub is_correct: bool,
}

/// Sub-competency as stored in the framework data source
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SubCompetencyRow {
    /// Stable identifier, generated when absent
    #[serde(default)]
    #[garde(skip)]
    pub id: Id,
    /// Measurable skill statement
    #[garde(length(chars, min = 1, max = MAX_CUE_LENGTH))]
    pub statement: String,
    /// Instruction shown to the player
    #[garde(length(chars, min = 1, max = MAX_QUESTION_LENGTH))]
    pub action_cue: String,
    /// Free-text mechanic label
    #[serde(default)]
    #[garde(skip)]
    pub game_mechanic: Option<String>,
    /// Name of the validator used by the generated game
    #[serde(default)]
    #[garde(skip)]
    pub validator_type: Option<String>,
    /// Description of the game loop
    #[serde(default)]
    #[garde(length(chars, max = MAX_CUE_LENGTH))]
    pub game_loop: Option<String>,
    /// Time limit in seconds
    #[serde(default)]
    #[garde(skip)]
    pub time_limit: TimeLimit,
    /// Tier boundaries
    #[serde(default)]
    #[garde(dive)]
    pub scoring: Thresholds,
    /// Mechanic tuning
    #[serde(default)]
    #[garde(dive)]
    pub params: MechanicParams,
    /// Answer options for new scenes
    #[serde(default)]
    #[garde(length(max = MAX_CHOICES), dive)]
    pub choices: Vec<SeedChoice>,
}

/// One row of the framework table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FrameworkRow {
    /// Competency the sub-competency belongs to
    #[garde(length(chars, min = 1, max = MAX_CHOICE_LENGTH))]
    pub competency: String,
    /// The sub-competency itself
    #[garde(dive)]
    pub sub_competency: SubCompetencyRow,
}

/// An ingested sub-competency with its mechanic resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCompetency {
    competency: String,
    row: SubCompetencyRow,
    mechanic: Mechanic,
}

impl SubCompetency {
    fn ingest(row: FrameworkRow) -> Self {
        let mechanic = row
            .sub_competency
            .game_mechanic
            .as_deref()
            .map_or(Mechanic::MultiChoice, Mechanic::ingest);
        Self {
            competency: row.competency,
            row: row.sub_competency,
            mechanic,
        }
    }

    /// Stable identifier
    pub fn id(&self) -> Id {
        self.row.id
    }

    /// Owning competency
    pub fn competency(&self) -> &str {
        &self.competency
    }

    /// Skill statement
    pub fn statement(&self) -> &str {
        &self.row.statement
    }

    /// Instruction shown to the player
    pub fn action_cue(&self) -> &str {
        &self.row.action_cue
    }

    /// Mechanic label as written in the data source
    pub fn mechanic_label(&self) -> Option<&str> {
        self.row.game_mechanic.as_deref()
    }

    /// Resolved mechanic
    pub fn mechanic(&self) -> Mechanic {
        self.mechanic
    }

    /// Validator used by the generated game
    pub fn validator_type(&self) -> Option<&str> {
        self.row.validator_type.as_deref()
    }

    /// Game loop description
    pub fn game_loop(&self) -> Option<&str> {
        self.row.game_loop.as_deref()
    }

    /// Displayed time limit
    pub fn time_limit(&self) -> TimeLimit {
        self.row.time_limit
    }

    /// Tier boundaries
    pub fn scoring(&self) -> &Thresholds {
        &self.row.scoring
    }

    /// Creates a fresh scene assessing this sub-competency
    ///
    /// The question starts as the action cue. Rows without seed choices get
    /// numbered placeholders, two for binary mechanics and four otherwise,
    /// with the first one correct.
    pub fn new_scene(&self) -> Scene {
        let choices = if self.row.choices.is_empty() {
            let count = if self.mechanic == Mechanic::Binary { 2 } else { 4 };
            (1..=count)
                .map(|i| Choice::new(format!("Option {i}"), i == 1))
                .collect_vec()
        } else {
            self.row
                .choices
                .iter()
                .map(|seed| Choice::new(seed.text.clone(), seed.is_correct))
                .collect_vec()
        };
        Scene::new(
            self.row.id,
            self.mechanic,
            self.row.time_limit,
            self.row.action_cue.clone(),
            choices,
        )
        .with_params(self.row.params.clone())
    }
}

/// The loaded framework table
#[derive(Debug, Clone, Default)]
pub struct Framework {
    entries: Vec<SubCompetency>,
}

fn parse(json: &str) -> Result<Vec<SubCompetency>, Error> {
    let rows: Vec<FrameworkRow> =
        serde_json::from_str(json).map_err(|e| Error::Malformed(e.to_string()))?;
    rows.into_iter()
        .enumerate()
        .map(|(row, data)| {
            data.validate().map_err(|report| Error::InvalidRow {
                row,
                reason: report.to_string(),
            })?;
            Ok(SubCompetency::ingest(data))
        })
        .collect()
}

impl Framework {
    /// Loads a framework from a JSON array of rows
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the JSON does not parse and
    /// [`Error::InvalidRow`] for the first row failing validation.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(Self {
            entries: parse(json)?,
        })
    }

    /// Purges the table and reloads it from `json`, returning the row count
    ///
    /// The current table is kept untouched when the new data is rejected.
    ///
    /// # Errors
    ///
    /// Same as [`Framework::from_json`].
    pub fn sync(&mut self, json: &str) -> Result<usize, Error> {
        let entries = parse(json).inspect_err(|e| {
            tracing::warn!(error = %e, "framework sync rejected, keeping current table");
        })?;
        tracing::debug!(purged = self.entries.len(), loaded = entries.len(), "framework synced");
        self.entries = entries;
        Ok(self.entries.len())
    }

    /// Number of sub-competencies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks a sub-competency up by ID
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSubCompetency`] if no row has that ID.
    pub fn get(&self, id: Id) -> Result<&SubCompetency, Error> {
        self.entries
            .iter()
            .find(|entry| entry.id() == id)
            .ok_or(Error::UnknownSubCompetency)
    }

    /// Competency names in table order, without repeats
    pub fn competencies(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(SubCompetency::competency)
            .unique()
            .collect_vec()
    }

    /// Sub-competencies of one competency in table order
    pub fn for_competency<'a>(&'a self, competency: &'a str) -> impl Iterator<Item = &'a SubCompetency> {
        self.entries
            .iter()
            .filter(move |entry| entry.competency == competency)
    }

    /// Creates a scene for a sub-competency
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSubCompetency`] if no row has that ID.
    pub fn scene_for(&self, id: Id) -> Result<Scene, Error> {
        Ok(self.get(id)?.new_scene())
    }
}
