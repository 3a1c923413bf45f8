//! Authoring sessions
//!
//! An authoring session owns everything a studio user edits in memory: the
//! template's name and brand settings, and one competency track per chosen
//! competency. It talks to the outside world only through three
//! collaborator traits, so hosts can plug in their own backend and tests can
//! use in-memory fakes:
//!
//! * [`Persistence`] stores template records and uploaded assets,
//! * [`Auth`] reports the signed-in user,
//! * [`Generator`] turns an assembled template into playable markup.
//!
//! Failures of these collaborators are reported to the caller and never
//! leave the session half-updated: a failed upload keeps no reference to the
//! file, and a failed generation leaves the persisted template as it was.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    constants::template::{
        ASSET_CONTENT_TYPES, MAX_ASSET_BYTES, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
    },
    constants::track::SCENES_PER_TRACK,
    design::DesignSettings,
    framework::{self, Framework},
    mechanic::media::Media,
    scene::{Id, Scene},
    track::{self, CompetencyTrack},
};

type ValidationResult = garde::Result;

/// Failure reported by an external collaborator
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

/// Errors raised by session actions
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No user is signed in
    #[error("not signed in")]
    NotSignedIn,
    /// The template failed validation
    #[error("template is invalid: {0}")]
    Invalid(String),
    /// The asset was rejected before uploading
    #[error("asset rejected: {0}")]
    AssetRejected(String),
    /// The upload itself failed
    #[error("upload failed: {0}")]
    Upload(BackendError),
    /// Saving the template failed
    #[error("save failed: {0}")]
    Save(BackendError),
    /// Generating the game failed
    #[error("generation failed: {0}")]
    Generation(BackendError),
    /// No framework competency has that name
    #[error("unknown competency")]
    UnknownCompetency,
    /// No track exists at that position
    #[error("unknown track")]
    UnknownTrack,
    /// A track edit was refused
    #[error(transparent)]
    Track(#[from] track::Error),
    /// A framework lookup failed
    #[error(transparent)]
    Framework(#[from] framework::Error),
    /// A scene edit was refused
    #[error(transparent)]
    Scene(#[from] crate::scene::Error),
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-assigned identifier
    pub id: String,
}

/// Whether generated markup is thrown away or published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Ephemeral, opened for viewing only
    Preview,
    /// Persisted as the published game
    Commit,
}

fn validate_content_type(content_type: &str) -> ValidationResult {
    if ASSET_CONTENT_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(garde::Error::new(format!("unsupported content type {content_type}")))
    }
}

/// A binary file the user wants to upload
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Asset {
    /// Original file name
    #[garde(length(chars, min = 1, max = MAX_NAME_LENGTH))]
    pub file_name: String,
    /// MIME type
    #[garde(custom(|v, _| validate_content_type(v)))]
    pub content_type: String,
    /// File contents
    #[garde(length(min = 1, max = MAX_ASSET_BYTES))]
    pub bytes: Vec<u8>,
}

/// Scene configuration of a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct GameConfig {
    /// Every scene in global index order
    #[garde(dive)]
    pub scenes: Vec<Scene>,
}

/// Template as stored by the persistence backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TemplateRecord {
    /// Template name
    #[garde(length(chars, min = 1, max = MAX_NAME_LENGTH))]
    pub name: String,
    /// Free-text description
    #[garde(length(chars, max = MAX_DESCRIPTION_LENGTH))]
    pub description: String,
    /// Brand settings
    #[garde(dive)]
    pub design_settings: DesignSettings,
    /// Scenes
    #[garde(dive)]
    pub game_config: GameConfig,
    /// Sub-competencies with a scene, in play order
    #[garde(skip)]
    pub selected_sub_competencies: Vec<Id>,
    /// Whether a committed game exists
    #[garde(skip)]
    pub is_published: bool,
}

/// Storage for templates and assets
///
/// This trait abstracts the backend that keeps template records and the
/// images authors upload for choices and avatars. Implementations might
/// talk to a hosted database and object store, or keep everything in
/// memory for tests.
///
/// Calls are made on behalf of the signed-in [`User`]; the session never
/// reaches this trait without one.
pub trait Persistence {
    /// Creates the record when `id` is `None`, otherwise updates it, returning the record ID
    ///
    /// # Arguments
    ///
    /// * `owner` - The user the record belongs to
    /// * `id` - The ID returned by an earlier save, if any
    /// * `record` - The full template snapshot to store
    ///
    /// # Errors
    ///
    /// Returns the backend's failure message.
    fn save_template(
        &mut self,
        owner: &User,
        id: Option<&str>,
        record: &TemplateRecord,
    ) -> Result<String, BackendError>;

    /// Stores an asset and returns its public URL
    ///
    /// The asset has already passed size and content-type validation.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure message.
    fn upload_asset(&mut self, owner: &User, asset: &Asset) -> Result<String, BackendError>;

    /// Removes a previously uploaded asset
    ///
    /// Used to roll an upload back when attaching it to the template fails.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure message.
    fn delete_asset(&mut self, url: &str) -> Result<(), BackendError>;
}

/// Identity provider
pub trait Auth {
    /// The signed-in user, if any
    fn current_user(&self) -> Option<User>;
}

/// Game generation service
///
/// Turns a template snapshot into a playable, self-contained game. A
/// preview render is discarded after display, while a commit render marks
/// the template as published once the following save succeeds.
pub trait Generator {
    /// Renders a template into playable markup
    ///
    /// # Arguments
    ///
    /// * `record` - The template snapshot to render
    /// * `mode` - Whether the output is a throwaway preview or the committed game
    ///
    /// # Errors
    ///
    /// Returns the service's failure message.
    fn generate(
        &mut self,
        record: &TemplateRecord,
        mode: GenerationMode,
    ) -> Result<String, BackendError>;
}

/// In-memory state of one studio user's template
pub struct AuthoringSession<P, A, G> {
    persistence: P,
    auth: A,
    generator: G,
    framework: Framework,
    name: String,
    description: String,
    design: DesignSettings,
    tracks: Vec<CompetencyTrack>,
    template_id: Option<String>,
    published: bool,
    saved_at: Option<SystemTime>,
}

impl<P: Persistence, A: Auth, G: Generator> AuthoringSession<P, A, G> {
    /// Starts a new, unsaved template
    pub fn new(framework: Framework, persistence: P, auth: A, generator: G) -> Self {
        Self {
            persistence,
            auth,
            generator,
            framework,
            name: String::new(),
            description: String::new(),
            design: DesignSettings::default(),
            tracks: Vec::new(),
            template_id: None,
            published: false,
            saved_at: None,
        }
    }

    /// The framework scenes are created from
    pub fn framework(&self) -> &Framework {
        &self.framework
    }

    /// Persistence backend
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Mutable persistence backend
    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    /// Generation service
    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    /// Sets the template name and description
    pub fn set_details(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.name = name.into();
        self.description = description.into();
    }

    /// Brand settings
    pub fn design(&self) -> &DesignSettings {
        &self.design
    }

    /// Mutable brand settings
    pub fn design_mut(&mut self) -> &mut DesignSettings {
        &mut self.design
    }

    /// Tracks in order
    pub fn tracks(&self) -> &[CompetencyTrack] {
        &self.tracks
    }

    /// Backend ID once the template has been saved
    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    /// Whether a committed game exists
    pub fn is_published(&self) -> bool {
        self.published
    }

    /// When the template was last saved
    pub fn saved_at(&self) -> Option<SystemTime> {
        self.saved_at
    }

    /// Adds an empty track for a competency, returning its position
    ///
    /// Adding a competency that already has a track returns that track.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCompetency`] if the framework has no such competency.
    pub fn add_track(&mut self, competency: &str) -> Result<usize, Error> {
        if let Some(position) = self.track_position(competency) {
            return Ok(position);
        }
        if !self.framework.competencies().contains(&competency) {
            return Err(Error::UnknownCompetency);
        }
        let start = self.tracks.len() * SCENES_PER_TRACK;
        self.tracks.push(CompetencyTrack::new(competency, start));
        Ok(self.tracks.len() - 1)
    }

    /// Removes a track with all its scenes and renumbers the following tracks
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTrack`] if no track is at that position.
    pub fn remove_track(&mut self, position: usize) -> Result<CompetencyTrack, Error> {
        if position >= self.tracks.len() {
            return Err(Error::UnknownTrack);
        }
        let removed = self.tracks.remove(position);
        for (i, track) in self.tracks.iter_mut().enumerate() {
            track.set_start_index(i * SCENES_PER_TRACK);
        }
        Ok(removed)
    }

    /// Creates the scene for a sub-competency in its competency's track
    ///
    /// # Errors
    ///
    /// Fails if the sub-competency is unknown or its track refuses it.
    pub fn attach(&mut self, sub_competency_id: Id) -> Result<&Scene, Error> {
        let competency = self
            .framework
            .get(sub_competency_id)?
            .competency()
            .to_string();
        let position = self.add_track(&competency)?;
        let sub = self.framework.get(sub_competency_id)?;
        Ok(self.tracks[position].attach(sub)?)
    }

    /// Removes the scene of a sub-competency from whichever track holds it
    ///
    /// # Errors
    ///
    /// Returns [`track::Error::NotAttached`] if no track holds it.
    pub fn detach(&mut self, sub_competency_id: Id) -> Result<Scene, Error> {
        let track = self
            .tracks
            .iter_mut()
            .find(|track| track.sub_competency_ids().contains(&sub_competency_id))
            .ok_or(track::Error::NotAttached)?;
        Ok(track.detach(sub_competency_id)?)
    }

    /// Moves a scene within its track
    ///
    /// # Errors
    ///
    /// Fails on an unknown track or scene position.
    pub fn reorder(&mut self, track: usize, from: usize, to: usize) -> Result<(), Error> {
        Ok(self.track_mut(track)?.reorder(from, to)?)
    }

    /// Mutable access to a scene for text edits
    ///
    /// # Errors
    ///
    /// Fails on an unknown track or scene position.
    pub fn scene_mut(&mut self, track: usize, position: usize) -> Result<&mut Scene, Error> {
        self.track_mut(track)?
            .scene_mut(position)
            .ok_or(Error::Track(track::Error::OutOfRange))
    }

    /// Validation warnings of every scene, keyed by global scene index
    pub fn warnings(&self) -> Vec<(usize, Vec<String>)> {
        self.tracks.iter().flat_map(CompetencyTrack::warnings).collect_vec()
    }

    /// The template as it would be persisted
    pub fn record(&self) -> TemplateRecord {
        TemplateRecord {
            name: self.name.clone(),
            description: self.description.clone(),
            design_settings: self.design.clone(),
            game_config: GameConfig {
                scenes: self
                    .tracks
                    .iter()
                    .flat_map(|track| track.scenes().iter().cloned())
                    .collect_vec(),
            },
            selected_sub_competencies: self
                .tracks
                .iter()
                .flat_map(CompetencyTrack::sub_competency_ids)
                .collect_vec(),
            is_published: self.published,
        }
    }

    /// Uploads an image and shows it on one choice
    ///
    /// On any failure the choice keeps its previous visual and the uploaded
    /// file, if any, is deleted again.
    ///
    /// # Errors
    ///
    /// Fails when signed out, on an invalid asset or position, or when the
    /// upload fails.
    pub fn upload_choice_image(
        &mut self,
        track: usize,
        position: usize,
        choice: usize,
        asset: &Asset,
        alt: impl Into<String>,
    ) -> Result<String, Error> {
        let user = self.user()?;
        let previous = self
            .scene_mut(track, position)?
            .choices()
            .get(choice)
            .ok_or(crate::scene::Error::ChoiceOutOfRange)?
            .media()
            .cloned();
        let url = self.upload(&user, asset)?;
        let media = Media::Image {
            url: url.clone(),
            alt: alt.into(),
        };
        let scene = self.scene_mut(track, position)?;
        scene.set_choice_media(choice, Some(media))?;
        if let Err(report) = scene.choices()[choice].validate() {
            scene.set_choice_media(choice, previous)?;
            self.roll_back_upload(&url);
            return Err(Error::AssetRejected(report.to_string()));
        }
        Ok(url)
    }

    /// Uploads the brand avatar
    ///
    /// # Errors
    ///
    /// Fails when signed out, on an invalid asset, or when the upload fails.
    pub fn upload_avatar(&mut self, asset: &Asset) -> Result<String, Error> {
        let user = self.user()?;
        let url = self.upload(&user, asset)?;
        let previous = self.design.avatar_url.replace(url.clone());
        if let Err(report) = self.design.validate() {
            self.design.avatar_url = previous;
            self.roll_back_upload(&url);
            return Err(Error::AssetRejected(report.to_string()));
        }
        Ok(url)
    }

    /// Validates and saves the template, returning its backend ID
    ///
    /// # Errors
    ///
    /// Fails when signed out, when the template is invalid, or when the
    /// backend refuses the save.
    pub fn save(&mut self) -> Result<String, Error> {
        let record = self.validated_record()?;
        self.persist(&record)
    }

    /// Generates markup for viewing without touching persisted state
    ///
    /// # Errors
    ///
    /// Fails when signed out, when the template is invalid, or when
    /// generation fails.
    pub fn preview(&mut self) -> Result<String, Error> {
        let record = self.validated_record()?;
        self.generator
            .generate(&record, GenerationMode::Preview)
            .map_err(|e| {
                tracing::warn!(error = %e, "preview generation failed");
                Error::Generation(e)
            })
    }

    /// Generates the published game and saves the template as published
    ///
    /// Nothing is saved when generation fails; a failed save leaves the
    /// session unpublished so the commit can be retried.
    ///
    /// # Errors
    ///
    /// Fails when signed out, when the template is invalid, or when
    /// generation or saving fails.
    pub fn commit(&mut self) -> Result<String, Error> {
        let mut record = self.validated_record()?;
        let html = self
            .generator
            .generate(&record, GenerationMode::Commit)
            .map_err(|e| {
                tracing::warn!(error = %e, "commit generation failed, template left unchanged");
                Error::Generation(e)
            })?;
        record.is_published = true;
        self.persist(&record)?;
        self.published = true;
        Ok(html)
    }

    fn user(&self) -> Result<User, Error> {
        self.auth.current_user().ok_or(Error::NotSignedIn)
    }

    fn validated_record(&self) -> Result<TemplateRecord, Error> {
        self.user()?;
        let record = self.record();
        record
            .validate()
            .map_err(|report| Error::Invalid(report.to_string()))?;
        Ok(record)
    }

    fn persist(&mut self, record: &TemplateRecord) -> Result<String, Error> {
        let user = self.user()?;
        let id = self
            .persistence
            .save_template(&user, self.template_id.as_deref(), record)
            .map_err(|e| {
                tracing::warn!(error = %e, "template save failed");
                Error::Save(e)
            })?;
        self.template_id = Some(id.clone());
        self.saved_at = Some(SystemTime::now());
        Ok(id)
    }

    fn upload(&mut self, user: &User, asset: &Asset) -> Result<String, Error> {
        asset.validate().map_err(|report| {
            tracing::debug!(file = %asset.file_name, "asset rejected before upload");
            Error::AssetRejected(report.to_string())
        })?;
        self.persistence
            .upload_asset(user, asset)
            .map_err(|e| {
                tracing::warn!(error = %e, file = %asset.file_name, "asset upload failed");
                Error::Upload(e)
            })
    }

    fn roll_back_upload(&mut self, url: &str) {
        if let Err(e) = self.persistence.delete_asset(url) {
            tracing::warn!(error = %e, url, "failed to delete rolled back asset");
        }
    }

    fn track_position(&self, competency: &str) -> Option<usize> {
        self.tracks
            .iter()
            .position(|track| track.competency() == competency)
    }

    fn track_mut(&mut self, position: usize) -> Result<&mut CompetencyTrack, Error> {
        self.tracks.get_mut(position).ok_or(Error::UnknownTrack)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::framework::tests::fixture;

    #[derive(Default)]
    struct MemoryStore {
        templates: BTreeMap<String, TemplateRecord>,
        assets: BTreeMap<String, Vec<u8>>,
        fail_uploads: bool,
        fail_saves: bool,
        long_urls: bool,
    }

    impl Persistence for MemoryStore {
        fn save_template(
            &mut self,
            _owner: &User,
            id: Option<&str>,
            record: &TemplateRecord,
        ) -> Result<String, BackendError> {
            if self.fail_saves {
                return Err(BackendError("database unavailable".to_string()));
            }
            let id = id.map_or_else(|| format!("template-{}", self.templates.len()), str::to_string);
            self.templates.insert(id.clone(), record.clone());
            Ok(id)
        }

        fn upload_asset(&mut self, _owner: &User, asset: &Asset) -> Result<String, BackendError> {
            if self.fail_uploads {
                return Err(BackendError("network error".to_string()));
            }
            let url = if self.long_urls {
                format!("https://cdn.example.com/{}/{}", "x".repeat(3000), asset.file_name)
            } else {
                format!("https://cdn.example.com/{}", asset.file_name)
            };
            self.assets.insert(url.clone(), asset.bytes.clone());
            Ok(url)
        }

        fn delete_asset(&mut self, url: &str) -> Result<(), BackendError> {
            self.assets.remove(url);
            Ok(())
        }
    }

    struct SignedIn(bool);

    impl Auth for SignedIn {
        fn current_user(&self) -> Option<User> {
            self.0.then(|| User {
                id: "user-1".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct FakeGenerator {
        fail: bool,
        calls: Vec<GenerationMode>,
    }

    impl Generator for FakeGenerator {
        fn generate(
            &mut self,
            record: &TemplateRecord,
            mode: GenerationMode,
        ) -> Result<String, BackendError> {
            self.calls.push(mode);
            if self.fail {
                return Err(BackendError("generator timed out".to_string()));
            }
            Ok(format!(
                "<html>{} ({} scenes)</html>",
                record.name,
                record.game_config.scenes.len()
            ))
        }
    }

    type Session = AuthoringSession<MemoryStore, SignedIn, FakeGenerator>;

    fn session() -> Session {
        let mut session = AuthoringSession::new(
            fixture(),
            MemoryStore::default(),
            SignedIn(true),
            FakeGenerator::default(),
        );
        session.set_details("Onboarding", "First week scenarios");
        let ids = session
            .framework()
            .for_competency("Decision Making")
            .map(|sub| sub.id())
            .collect_vec();
        for id in ids {
            session.attach(id).unwrap();
        }
        session
    }

    fn png() -> Asset {
        Asset {
            file_name: "logo.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[test]
    fn test_attach_creates_tracks_in_order() {
        let mut session = session();
        let analytical = session
            .framework()
            .for_competency("Analytical Thinking")
            .next()
            .unwrap()
            .id();
        session.attach(analytical).unwrap();
        assert_eq!(session.tracks().len(), 2);
        assert_eq!(session.tracks()[0].competency(), "Decision Making");
        assert_eq!(session.tracks()[1].index_range(), 6..12);
        assert_eq!(session.record().game_config.scenes.len(), 3);
        assert_eq!(session.record().selected_sub_competencies.len(), 3);

        assert_eq!(
            session.attach(analytical).unwrap_err(),
            Error::Track(track::Error::AlreadyAttached)
        );
        assert_eq!(
            session.attach(Id::new()).unwrap_err(),
            Error::Framework(framework::Error::UnknownSubCompetency)
        );
    }

    #[test]
    fn test_remove_track_renumbers() {
        let mut session = session();
        session.add_track("Analytical Thinking").unwrap();
        assert_eq!(session.add_track("Decision Making"), Ok(0));
        assert_eq!(session.add_track("Juggling"), Err(Error::UnknownCompetency));
        session.remove_track(0).unwrap();
        assert_eq!(session.tracks()[0].index_range(), 0..6);
        assert_eq!(session.remove_track(3).unwrap_err(), Error::UnknownTrack);
    }

    #[test]
    fn test_detach_and_reorder() {
        let mut session = session();
        let ids = session.record().selected_sub_competencies;
        session.reorder(0, 0, 1).unwrap();
        assert_eq!(session.record().selected_sub_competencies, vec![ids[1], ids[0]]);
        session.detach(ids[0]).unwrap();
        assert_eq!(session.record().selected_sub_competencies, vec![ids[1]]);
        assert_eq!(
            session.detach(ids[0]).unwrap_err(),
            Error::Track(track::Error::NotAttached)
        );
        assert_eq!(session.reorder(4, 0, 0).unwrap_err(), Error::UnknownTrack);
    }

    #[test]
    fn test_save_requires_valid_template() {
        let mut session = session();
        session.scene_mut(0, 0).unwrap().set_question("");
        assert!(!session.warnings().is_empty());
        assert!(matches!(session.save(), Err(Error::Invalid(_))));
        assert!(session.persistence().templates.is_empty());

        session.scene_mut(0, 0).unwrap().set_question("Approve the refund?");
        let id = session.save().unwrap();
        assert_eq!(session.template_id(), Some(id.as_str()));
        assert!(session.saved_at().is_some());
        assert_eq!(session.save().unwrap(), id);
        assert_eq!(session.persistence().templates.len(), 1);
    }

    #[test]
    fn test_signed_out() {
        let mut session = AuthoringSession::new(
            fixture(),
            MemoryStore::default(),
            SignedIn(false),
            FakeGenerator::default(),
        );
        session.set_details("Name", "");
        assert_eq!(session.save(), Err(Error::NotSignedIn));
        assert_eq!(session.preview(), Err(Error::NotSignedIn));
        assert_eq!(session.upload_avatar(&png()), Err(Error::NotSignedIn));
    }

    #[test]
    fn test_upload_choice_image() {
        let mut session = session();
        let url = session.upload_choice_image(0, 0, 1, &png(), "Logo").unwrap();
        let scene = &session.tracks()[0].scenes()[0];
        assert_eq!(scene.choices()[1].media().and_then(Media::url), Some(url.as_str()));
        assert!(session.persistence().assets.contains_key(&url));
    }

    #[test]
    fn test_rejected_asset_is_never_uploaded() {
        let mut session = session();
        let mut svg = png();
        svg.content_type = "image/svg+xml".to_string();
        assert!(matches!(
            session.upload_choice_image(0, 0, 0, &svg, "Logo"),
            Err(Error::AssetRejected(_))
        ));
        let mut huge = png();
        huge.bytes = vec![0; MAX_ASSET_BYTES + 1];
        assert!(matches!(session.upload_avatar(&huge), Err(Error::AssetRejected(_))));
        assert!(session.persistence().assets.is_empty());
    }

    #[test]
    fn test_failed_upload_keeps_state() {
        let mut session = session();
        session.persistence_mut().fail_uploads = true;
        assert_eq!(
            session.upload_avatar(&png()),
            Err(Error::Upload(BackendError("network error".to_string())))
        );
        assert_eq!(session.design().avatar_url, None);
        assert!(session.tracks()[0].scenes()[0].choices()[0].media().is_none());
    }

    #[test]
    fn test_invalid_url_rolls_back() {
        let mut session = session();
        session.upload_choice_image(0, 0, 0, &png(), "First").unwrap();
        let before = session.tracks()[0].scenes()[0].choices()[0].media().cloned();
        session.persistence_mut().long_urls = true;
        let mut other = png();
        other.file_name = "other.png".to_string();
        assert!(matches!(
            session.upload_choice_image(0, 0, 0, &other, "Second"),
            Err(Error::AssetRejected(_))
        ));
        assert_eq!(session.tracks()[0].scenes()[0].choices()[0].media().cloned(), before);
        assert_eq!(session.persistence().assets.len(), 1);

        assert!(matches!(session.upload_avatar(&other), Err(Error::AssetRejected(_))));
        assert_eq!(session.design().avatar_url, None);
        assert_eq!(session.persistence().assets.len(), 1);
    }

    #[test]
    fn test_upload_to_missing_choice() {
        let mut session = session();
        assert_eq!(
            session.upload_choice_image(0, 0, 9, &png(), "Logo"),
            Err(Error::Scene(crate::scene::Error::ChoiceOutOfRange))
        );
        assert!(session.persistence().assets.is_empty());
    }

    #[test]
    fn test_preview_does_not_persist() {
        let mut session = session();
        let html = session.preview().unwrap();
        assert_eq!(html, "<html>Onboarding (2 scenes)</html>");
        assert!(session.persistence().templates.is_empty());
        assert!(!session.is_published());
    }

    #[test]
    fn test_commit_publishes() {
        let mut session = session();
        session.commit().unwrap();
        assert!(session.is_published());
        let id = session.template_id().unwrap().to_string();
        assert!(session.persistence().templates[&id].is_published);
    }

    #[test]
    fn test_failed_generation_keeps_persisted_state() {
        let mut session = session();
        let id = session.save().unwrap();
        let saved = session.persistence().templates[&id].clone();

        session.set_details("Renamed", "");
        session.generator_mut().fail = true;
        assert!(matches!(session.commit(), Err(Error::Generation(_))));
        assert_eq!(session.persistence().templates[&id], saved);
        assert!(!session.is_published());

        session.generator_mut().fail = false;
        session.commit().unwrap();
        assert_eq!(session.persistence().templates[&id].name, "Renamed");
        assert_eq!(
            session.generator_mut().calls,
            vec![GenerationMode::Commit, GenerationMode::Commit]
        );
    }

    #[test]
    fn test_failed_save_leaves_unpublished() {
        let mut session = session();
        session.persistence_mut().fail_saves = true;
        assert!(matches!(session.commit(), Err(Error::Save(_))));
        assert!(!session.is_published());
        assert_eq!(session.template_id(), None);
    }
}
