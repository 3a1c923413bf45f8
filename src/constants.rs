//! Configuration constants for the studio engine
//!
//! This module contains the limits and tuning values used throughout the
//! interaction engine so that widgets, validation rules and scoring share
//! one consistent set of boundaries.

/// Telemetry capture constants
pub mod telemetry {
    /// Minimum spacing in milliseconds between two accepted `move` samples (~60Hz)
    pub const SAMPLE_INTERVAL_MS: u64 = 16;
}

/// Scene authoring constants
pub mod scene {
    /// Minimum number of choices a playable scene must carry
    pub const MIN_CHOICES: usize = 2;
    /// Maximum number of choices a scene may carry
    pub const MAX_CHOICES: usize = 10;
    /// Maximum length of a question in characters
    pub const MAX_QUESTION_LENGTH: usize = 300;
    /// Time limits in seconds an author may see attached to a scene
    pub const TIME_LIMITS: [u64; 3] = [30, 45, 60];
    /// Maximum points awarded for a scene, decaying to half by the time limit
    pub const MAX_POINTS: u64 = 1000;
}

/// Competency track constants
pub mod track {
    /// Number of scenes in a complete track
    pub const SCENES_PER_TRACK: usize = 6;
}

/// Choice and label text constants
pub mod text {
    /// Maximum length of choice text in characters
    pub const MAX_CHOICE_LENGTH: usize = 200;
    /// Maximum length of an action cue or scenario text
    pub const MAX_CUE_LENGTH: usize = 500;
    /// Maximum length of an image or asset URL
    pub const MAX_URL_LENGTH: usize = 2048;
    /// Maximum length of alt text for accessibility
    pub const MAX_ALT_LENGTH: usize = 200;
}

/// Continuous scrub slider constants
pub mod scrub {
    /// Lowest slider value
    pub const MIN_VALUE: u8 = 0;
    /// Highest slider value
    pub const MAX_VALUE: u8 = 100;
    /// Distance from the target at which proximity feedback reaches zero
    pub const PROXIMITY_FALLOFF: f64 = 50.;
}

/// Swipe card constants
pub mod swipe {
    /// Horizontal offset in logical pixels that must be exceeded to commit a decision
    pub const THRESHOLD_PX: f64 = 80.;
}

/// Drag-connect constants
pub mod drag_connect {
    /// Horizontal hit radius around a target node in logical pixels
    pub const HIT_RADIUS_X: f64 = 30.;
    /// Vertical hit radius around a target node in logical pixels
    pub const HIT_RADIUS_Y: f64 = 20.;
}

/// Pattern grid constants
pub mod pattern_grid {
    /// Default side length of the grid
    pub const DEFAULT_SIZE: usize = 5;
    /// Largest supported side length
    pub const MAX_SIZE: usize = 10;
}

/// Trade-off matrix constants
pub mod tradeoff {
    /// Grab radius of the marker in logical pixels
    pub const MARKER_RADIUS: f64 = 24.;
    /// Share of the widget area given to the field, the rest is the tray
    pub const FIELD_PERCENT: u8 = 80;
}

/// Multi-choice grid layout constants
pub mod visual_grid {
    /// Choice counts up to this value are laid out in a single column
    pub const SINGLE_COLUMN_MAX: usize = 4;
}

/// Brand design constants
pub mod design {
    /// Maximum length of a font family name
    pub const MAX_FONT_LENGTH: usize = 100;
}

/// Layout contract constants, expressed in percent of viewport height
pub mod layout {
    /// Share of the viewport reserved for the action cue
    pub const CUE_PERCENT: u8 = 30;
    /// Share of the viewport reserved for the interaction surface
    pub const INTERACTION_PERCENT: u8 = 50;
    /// Share of the viewport reserved for controls
    pub const CONTROLS_PERCENT: u8 = 20;
}

/// Template record constants
pub mod template {
    /// Maximum length of a template name
    pub const MAX_NAME_LENGTH: usize = 200;
    /// Maximum length of a template description
    pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
    /// Largest accepted asset upload in bytes
    pub const MAX_ASSET_BYTES: usize = 5 * 1024 * 1024;
    /// Accepted asset content types
    pub const ASSET_CONTENT_TYPES: [&str; 4] =
        ["image/png", "image/jpeg", "image/webp", "image/gif"];
}
