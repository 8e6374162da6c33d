//! Derived header theme signal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Light/dark display mode for the page header.
///
/// Never assigned directly: it is always recomputed from the visibility set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSignal {
    /// Light-contrast header over light sections
    Light,
    /// Dark-contrast header (initial state)
    #[default]
    Dark,
}

impl ThemeSignal {
    /// Returns true for [`ThemeSignal::Light`].
    pub const fn is_light(self) -> bool {
        matches!(self, Self::Light)
    }
}

impl fmt::Display for ThemeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}
