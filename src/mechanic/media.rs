//! Visual media attached to choices
//!
//! Choices may carry a small visual alongside their text: either a named
//! icon from the host's icon set or an uploaded image addressed by its
//! public URL.

use garde::Validate;
use serde::{Deserialize, Serialize};

/// Visual content that can accompany a choice
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Validate)]
#[serde(rename_all = "snake_case")]
pub enum Media {
    /// A named icon from the host icon set
    Icon {
        /// Icon name, e.g. `shield` or `clock`
        #[garde(length(chars, min = 1, max = 64))]
        name: String,
    },
    /// An uploaded image
    Image {
        /// Public URL issued by the asset store
        #[garde(length(min = 1, max = crate::constants::text::MAX_URL_LENGTH))]
        url: String,
        /// Alternative text for accessibility and display fallbacks
        #[garde(length(max = crate::constants::text::MAX_ALT_LENGTH))]
        alt: String,
    },
}

impl Media {
    /// Public URL of the image, if this is an image
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Image { url, .. } => Some(url),
            Self::Icon { .. } => None,
        }
    }
}
