//! Administrator-editable site content.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_BANNER_IMAGES, DEFAULT_TICKER_LINES};

/// Content persisted across reloads: news ticker lines and popup banners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedContent {
    /// Ordered ticker announcements
    pub ticker_lines: Vec<String>,
    /// Ordered banner image references (URL or `data:` URL)
    pub banner_images: Vec<String>,
}

impl PersistedContent {
    /// The documented default content.
    pub fn defaults() -> Self {
        Self {
            ticker_lines: DEFAULT_TICKER_LINES.iter().map(ToString::to_string).collect(),
            banner_images: DEFAULT_BANNER_IMAGES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl Default for PersistedContent {
    fn default() -> Self {
        Self::defaults()
    }
}

/// A banner image in the edit buffer.
///
/// Ids are assigned per session and never persisted; the stored form is
/// just the ordered list of sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerImage {
    /// Session-local identifier used for removal and replacement
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Image reference (URL or `data:` URL)
    pub source: String,
}

impl BannerImage {
    /// Creates a banner with a fresh id.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            source: source.into(),
        }
    }

    /// Wraps a persisted reference, deriving a display name from it.
    ///
    /// URLs are named after their last path segment; inline data gets
    /// `inline-image-N` with `N` counted from 1.
    pub fn from_reference(source: &str, index: usize) -> Self {
        let name = if source.starts_with("data:") {
            format!("inline-image-{}", index + 1)
        } else {
            source
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .unwrap_or(source)
                .to_string()
        };
        Self::new(name, source)
    }

    /// Returns true when the source is an inline `data:` URL.
    pub fn is_inline(&self) -> bool {
        self.source.starts_with("data:")
    }
}
