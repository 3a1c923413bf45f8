//! Brand design settings and the style tokens handed to every widget
//!
//! Design settings are purely cosmetic. They are validated when authored and
//! turned into [`StyleTokens`], which each widget receives explicitly in its
//! `view` call instead of reading a global theme.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

type ValidationResult = garde::Result;

/// Validates that a colour is written as `#rgb` or `#rrggbb`
fn validate_hex_color(val: &str) -> ValidationResult {
    let Some(digits) = val.strip_prefix('#') else {
        return Err(garde::Error::new("colour must start with '#'"));
    };
    if matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!("'{val}' is not a hex colour")))
    }
}

/// Brand colour palette
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Palette {
    /// Main brand colour
    #[garde(custom(|v, _| validate_hex_color(v)))]
    pub primary: String,
    /// Supporting brand colour
    #[garde(custom(|v, _| validate_hex_color(v)))]
    pub secondary: String,
    /// Accent for interactive affordances
    #[garde(custom(|v, _| validate_hex_color(v)))]
    pub accent: String,
    /// Surface colour
    #[garde(custom(|v, _| validate_hex_color(v)))]
    pub background: String,
    /// Foreground text colour
    #[garde(custom(|v, _| validate_hex_color(v)))]
    pub text: String,
    /// Colour for selection and target feedback
    #[garde(custom(|v, _| validate_hex_color(v)))]
    pub highlight: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#6366f1".to_string(),
            secondary: "#8b5cf6".to_string(),
            accent: "#22d3ee".to_string(),
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
            highlight: "#facc15".to_string(),
        }
    }
}

/// Ambient particle effect drawn behind the game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleEffect {
    /// No particles
    #[default]
    None,
    /// Sparkle particles
    Sparkles,
    /// Confetti particles
    Confetti,
    /// Floating bubbles
    Bubbles,
    /// Falling snow
    Snow,
}

/// Brand design configuration authored for a template
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DesignSettings {
    /// Colour palette
    #[garde(dive)]
    pub palette: Palette,
    /// Font family name
    #[garde(length(chars, min = 1, max = crate::constants::design::MAX_FONT_LENGTH))]
    pub font: String,
    /// Background particle effect
    #[garde(skip)]
    pub particle_effect: ParticleEffect,
    /// Public URL of the brand avatar
    #[garde(length(max = crate::constants::text::MAX_URL_LENGTH))]
    pub avatar_url: Option<String>,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            font: "Inter".to_string(),
            particle_effect: ParticleEffect::default(),
            avatar_url: None,
        }
    }
}

impl DesignSettings {
    /// Resolves the style tokens a widget renders with
    ///
    /// Dark mode swaps the surface and text colours; every other token is
    /// taken from the palette as-is.
    pub fn tokens(&self, dark_mode: bool) -> StyleTokens {
        let palette = &self.palette;
        let (background, text) = if dark_mode {
            (palette.text.clone(), palette.background.clone())
        } else {
            (palette.background.clone(), palette.text.clone())
        };
        StyleTokens {
            dark_mode,
            primary: palette.primary.clone(),
            secondary: palette.secondary.clone(),
            accent: palette.accent.clone(),
            background,
            text,
            highlight: palette.highlight.clone(),
            font: self.font.clone(),
        }
    }
}

/// Concrete style values passed into each widget's view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleTokens {
    /// Whether the host is rendering in dark mode
    pub dark_mode: bool,
    /// Main brand colour
    pub primary: String,
    /// Supporting brand colour
    pub secondary: String,
    /// Accent colour
    pub accent: String,
    /// Surface colour after dark-mode resolution
    pub background: String,
    /// Text colour after dark-mode resolution
    pub text: String,
    /// Selection and target feedback colour
    pub highlight: String,
    /// Font family
    pub font: String,
}

impl Default for StyleTokens {
    fn default() -> Self {
        DesignSettings::default().tokens(false)
    }
}
