//! Scene assembly
//!
//! A playable scene is stitched together from three parts:
//!
//! * the **brain**, what the framework decides: mechanic, widget variant,
//!   time limit and scoring thresholds;
//! * the **soul**, what the player reads: skill statement, action cue and
//!   the authored question;
//! * the **layout contract**, a fixed vertical split of the viewport into
//!   cue, interaction and controls regions.
//!
//! The assembled [`SceneDescriptor`] carries the style tokens explicitly so
//! that every widget renders from the same brand settings.

use std::time::Duration;

use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{
    constants::layout::{CONTROLS_PERCENT, CUE_PERCENT, INTERACTION_PERCENT},
    design::{DesignSettings, StyleTokens},
    framework::{self, Framework},
    mechanic::{Mechanic, Outcome, Widget, WidgetVariant, common::Rect},
    scene::{Choice, Id, Scene, TimeLimit},
    scoring::{self, Score, Thresholds},
    track::CompetencyTrack,
};

/// Framework-driven behaviour of a scene
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Brain {
    /// Resolved mechanic
    pub mechanic: Mechanic,
    /// Widget the mechanic renders with
    pub variant: WidgetVariant,
    /// Displayed time limit
    pub time_limit: TimeLimit,
    /// Tier boundaries
    pub thresholds: Thresholds,
    /// Validator used by the generated game
    pub validator_type: Option<String>,
}

/// Player-facing narrative of a scene
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Soul {
    /// Skill statement
    pub statement: String,
    /// Instruction shown in the cue region
    pub action_cue: String,
    /// Authored question
    pub question: String,
    /// Game loop description
    pub game_loop: Option<String>,
}

/// Vertical regions of the scene viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutContract {
    /// Top band holding the action cue
    pub cue: Rect,
    /// Middle band holding the widget
    pub interaction: Rect,
    /// Bottom band holding submit and navigation controls
    pub controls: Rect,
}

impl LayoutContract {
    /// Splits a viewport 30/50/20 from top to bottom
    pub fn for_viewport(viewport: Rect) -> Self {
        let band = |top: f64, percent: u8| {
            Rect::new(viewport.x, top, viewport.w, viewport.h * f64::from(percent) / 100.)
        };
        let cue = band(viewport.y, CUE_PERCENT);
        let interaction = band(cue.bottom(), INTERACTION_PERCENT);
        let controls = band(interaction.bottom(), CONTROLS_PERCENT);
        Self {
            cue,
            interaction,
            controls,
        }
    }
}

/// A fully assembled, renderable scene
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    /// Global scene index
    pub index: usize,
    /// Scene identifier
    pub scene_id: Id,
    /// Framework-driven behaviour
    pub brain: Brain,
    /// Narrative
    pub soul: Soul,
    /// Viewport regions
    pub layout: LayoutContract,
    /// Resolved brand style
    pub style: StyleTokens,
    /// Answer options
    pub choices: Vec<Choice>,
    #[serde(skip)]
    scene: Scene,
}

impl SceneDescriptor {
    /// Builds the widget inside the interaction region, starting its timer at `at_ms`
    pub fn build_widget(&self, at_ms: u64) -> Widget {
        Widget::build(&self.scene, self.layout.interaction, at_ms)
    }

    /// Scores an outcome against this scene's time limit and thresholds
    pub fn score(&self, outcome: &Outcome, elapsed: Duration) -> Score {
        scoring::score_outcome(
            outcome,
            Duration::from_secs(self.brain.time_limit.seconds()),
            elapsed,
            &self.brain.thresholds,
        )
    }
}

/// Combines framework rows, authored scenes and brand settings
#[derive(Debug, Clone, Copy)]
pub struct SceneAssembler<'a> {
    framework: &'a Framework,
    design: &'a DesignSettings,
    dark_mode: bool,
    viewport: Rect,
}

impl<'a> SceneAssembler<'a> {
    /// Creates an assembler rendering into `viewport`
    pub fn new(framework: &'a Framework, design: &'a DesignSettings, dark_mode: bool, viewport: Rect) -> Self {
        Self {
            framework,
            design,
            dark_mode,
            viewport,
        }
    }

    /// Assembles one scene at a global index
    ///
    /// # Errors
    ///
    /// Returns [`framework::Error::UnknownSubCompetency`] if the scene's
    /// sub-competency is no longer in the framework.
    pub fn assemble(&self, scene: &Scene, index: usize) -> Result<SceneDescriptor, framework::Error> {
        let sub = self.framework.get(scene.sub_competency_id())?;
        Ok(SceneDescriptor {
            index,
            scene_id: scene.id(),
            brain: Brain {
                mechanic: scene.mechanic(),
                variant: scene.widget_variant(),
                time_limit: scene.time_limit(),
                thresholds: *sub.scoring(),
                validator_type: sub.validator_type().map(str::to_string),
            },
            soul: Soul {
                statement: sub.statement().to_string(),
                action_cue: sub.action_cue().to_string(),
                question: scene.question().to_string(),
                game_loop: sub.game_loop().map(str::to_string),
            },
            layout: LayoutContract::for_viewport(self.viewport),
            style: self.design.tokens(self.dark_mode),
            choices: scene.choices().to_vec(),
            scene: scene.clone(),
        })
    }

    /// Assembles every scene of a track in play order
    ///
    /// # Errors
    ///
    /// Same as [`SceneAssembler::assemble`].
    pub fn assemble_track(&self, track: &CompetencyTrack) -> Result<Vec<SceneDescriptor>, framework::Error> {
        track
            .scenes()
            .iter()
            .enumerate()
            .map(|(position, scene)| {
                let index = track.global_index(position).unwrap_or(position);
                self.assemble(scene, index)
            })
            .collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        framework::tests::fixture,
        mechanic::WidgetView,
        telemetry::{Point, PointerEvent, PointerId, PointerPhase},
    };

    #[test]
    fn test_layout_contract() {
        let layout = LayoutContract::for_viewport(Rect::new(0., 0., 390., 800.));
        assert_eq!(layout.cue, Rect::new(0., 0., 390., 240.));
        assert_eq!(layout.interaction, Rect::new(0., 240., 390., 400.));
        assert_eq!(layout.controls, Rect::new(0., 640., 390., 160.));
    }

    #[test]
    fn test_assemble_track() {
        let framework = fixture();
        let design = DesignSettings::default();
        let mut track = CompetencyTrack::new("Analytical Thinking", 6);
        for sub in framework.for_competency("Analytical Thinking") {
            track.attach(sub).unwrap();
        }
        let assembler = SceneAssembler::new(&framework, &design, true, Rect::new(0., 0., 400., 1000.));
        let scenes = assembler.assemble_track(&track).unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].index, 6);
        assert_eq!(scenes[1].index, 7);
        assert_eq!(scenes[0].brain.variant, WidgetVariant::ContinuousScrub);
        assert_eq!(scenes[1].brain.mechanic, Mechanic::PatternGrid);
        assert_eq!(scenes[0].soul.statement, "Estimates quantities under uncertainty");
        assert_eq!(scenes[0].brain.validator_type.as_deref(), Some("range"));
        assert!(scenes[0].style.dark_mode);
        assert_eq!(scenes[0].style.background, design.palette.text);
    }

    #[test]
    fn test_unknown_sub_competency() {
        let framework = fixture();
        let design = DesignSettings::default();
        let assembler = SceneAssembler::new(&framework, &design, false, Rect::default());
        let orphan = Scene::new(Id::new(), Mechanic::MultiChoice, TimeLimit::Short, "?", vec![]);
        assert_eq!(
            assembler.assemble(&orphan, 0),
            Err(framework::Error::UnknownSubCompetency)
        );
    }

    #[test]
    fn test_play_and_score() {
        let framework = fixture();
        let design = DesignSettings::default();
        let sub = framework.for_competency("Analytical Thinking").next().unwrap();
        let scene = sub.new_scene();
        let assembler = SceneAssembler::new(&framework, &design, false, Rect::new(0., 0., 100., 1000.));
        let descriptor = assembler.assemble(&scene, 0).unwrap();

        let mut widget = descriptor.build_widget(0);
        assert!(matches!(widget.view(&descriptor.style), WidgetView::Scrub(_)));
        let id = PointerId(1);
        widget.handle_pointer(&PointerEvent::new(id, PointerPhase::Down, Point::new(40., 500.), 1000));
        widget.handle_pointer(&PointerEvent::new(id, PointerPhase::Move, Point::new(70., 500.), 1100));
        let outcome = widget
            .handle_pointer(&PointerEvent::new(id, PointerPhase::Up, Point::new(70., 500.), 1200))
            .unwrap();
        assert!(outcome.is_correct());

        let score = descriptor.score(&outcome, Duration::from_secs(9));
        assert_eq!(score.tier, scoring::Tier::Level3);
        assert_eq!(score.metrics.time_limit, Duration::from_secs(45));
        assert_eq!(score.points, 900);
    }
}
