//! Competency tracks
//!
//! A track groups the scenes assessing one competency, one scene per
//! attached sub-competency, in the order the author arranged them. Each
//! track owns a fixed, contiguous slice of the game's scene indices so that
//! tracks can be edited independently without renumbering each other.

use std::ops::Range;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::track::SCENES_PER_TRACK,
    framework::SubCompetency,
    scene::{Id, Scene},
};

/// Errors raised while editing a track
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The track already holds the maximum number of scenes
    #[error("track is full")]
    Full,
    /// The sub-competency already has a scene in this track
    #[error("sub-competency is already attached")]
    AlreadyAttached,
    /// The sub-competency has no scene in this track
    #[error("sub-competency is not attached")]
    NotAttached,
    /// The sub-competency belongs to a different competency
    #[error("sub-competency belongs to another competency")]
    WrongCompetency,
    /// A scene position did not exist
    #[error("scene position out of range")]
    OutOfRange,
}

/// Ordered scenes of one competency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyTrack {
    competency: String,
    start_index: usize,
    scenes: Vec<Scene>,
}

impl CompetencyTrack {
    /// Creates an empty track whose scenes start at the global index `start_index`
    pub fn new(competency: impl Into<String>, start_index: usize) -> Self {
        Self {
            competency: competency.into(),
            start_index,
            scenes: Vec::new(),
        }
    }

    /// Competency assessed by the track
    pub fn competency(&self) -> &str {
        &self.competency
    }

    /// Scenes in play order
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Mutable access to one scene for text edits
    pub fn scene_mut(&mut self, position: usize) -> Option<&mut Scene> {
        self.scenes.get_mut(position)
    }

    /// Number of attached scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether no scene is attached
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Whether the track holds its full set of scenes
    pub fn is_complete(&self) -> bool {
        self.scenes.len() == SCENES_PER_TRACK
    }

    /// Global scene indices owned by the track, attached or not
    pub fn index_range(&self) -> Range<usize> {
        self.start_index..self.start_index + SCENES_PER_TRACK
    }

    /// Moves the track to a new slice of global indices
    pub fn set_start_index(&mut self, start_index: usize) {
        self.start_index = start_index;
    }

    /// Global index of the scene at `position`
    pub fn global_index(&self, position: usize) -> Option<usize> {
        (position < self.scenes.len()).then_some(self.start_index + position)
    }

    /// Sub-competencies with a scene in this track, in play order
    pub fn sub_competency_ids(&self) -> Vec<Id> {
        self.scenes.iter().map(Scene::sub_competency_id).collect_vec()
    }

    /// Creates and appends the scene for a sub-competency
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongCompetency`] for a sub-competency of another
    /// competency, [`Error::AlreadyAttached`] if it already has a scene here
    /// and [`Error::Full`] once the track holds its maximum.
    pub fn attach(&mut self, sub_competency: &SubCompetency) -> Result<&Scene, Error> {
        if sub_competency.competency() != self.competency {
            return Err(Error::WrongCompetency);
        }
        if self.position_of(sub_competency.id()).is_some() {
            return Err(Error::AlreadyAttached);
        }
        if self.scenes.len() >= SCENES_PER_TRACK {
            return Err(Error::Full);
        }
        self.scenes.push(sub_competency.new_scene());
        tracing::debug!(
            competency = %self.competency,
            scenes = self.scenes.len(),
            "scene attached"
        );
        Ok(&self.scenes[self.scenes.len() - 1])
    }

    /// Removes and returns the scene of a sub-competency
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAttached`] if the sub-competency has no scene here.
    pub fn detach(&mut self, sub_competency_id: Id) -> Result<Scene, Error> {
        let position = self
            .position_of(sub_competency_id)
            .ok_or(Error::NotAttached)?;
        Ok(self.scenes.remove(position))
    }

    /// Moves the scene at `from` so that it ends up at `to`
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if either position has no scene.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), Error> {
        if from >= self.scenes.len() || to >= self.scenes.len() {
            return Err(Error::OutOfRange);
        }
        let scene = self.scenes.remove(from);
        self.scenes.insert(to, scene);
        Ok(())
    }

    /// Validation warnings keyed by global scene index
    pub fn warnings(&self) -> Vec<(usize, Vec<String>)> {
        self.scenes
            .iter()
            .enumerate()
            .map(|(i, scene)| (self.start_index + i, scene.warnings()))
            .filter(|(_, warnings)| !warnings.is_empty())
            .collect_vec()
    }

    fn position_of(&self, sub_competency_id: Id) -> Option<usize> {
        self.scenes
            .iter()
            .position(|scene| scene.sub_competency_id() == sub_competency_id)
    }
}
