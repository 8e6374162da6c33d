//! Colors for the admin editor in dark and light terminals.

use ratatui::style::Color;

use crate::config::ThemeMode;
use crate::services::SessionState;

/// Semantic color theme for the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Borders, titles and emphasis
    pub primary: Color,
    /// Selection and focus
    pub accent: Color,
    /// Confirmations
    pub success: Color,
    /// Errors and destructive prompts
    pub error: Color,
    /// Unsaved-changes indicator
    pub warning: Color,
    /// Primary text
    pub text: Color,
    /// Help text and dim content
    pub text_muted: Color,
    /// Main background
    pub background: Color,
    /// Selection background
    pub highlight_bg: Color,
}

/// Theme variant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    /// Dark theme optimized for dark terminal backgrounds
    Dark,
    /// Light theme optimized for light terminal backgrounds
    Light,
}

impl Theme {
    /// Detects the OS theme and returns the matching Theme.
    #[must_use]
    pub fn detect() -> Self {
        match dark_light::detect() {
            Ok(dark_light::Mode::Light) => Self::light(),
            // Fall back to dark theme for dark mode, unspecified, or errors
            Ok(dark_light::Mode::Dark | dark_light::Mode::Unspecified) | Err(_) => Self::dark(),
        }
    }

    /// Resolves the configured preference.
    #[must_use]
    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Auto => Self::detect(),
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Theme for dark terminal backgrounds.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            primary: Color::Cyan,
            accent: Color::Yellow,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            text: Color::White,
            text_muted: Color::DarkGray,
            background: Color::Black,
            highlight_bg: Color::DarkGray,
        }
    }

    /// Theme for light terminal backgrounds.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            primary: Color::Blue,
            accent: Color::Rgb(180, 100, 0), // Dark orange for visibility
            success: Color::Rgb(0, 128, 0),
            error: Color::Red,
            warning: Color::Rgb(200, 100, 0),
            text: Color::Black,
            text_muted: Color::Gray,
            background: Color::White,
            highlight_bg: Color::Rgb(230, 230, 230),
        }
    }

    /// Returns the variant, judged by the background color.
    #[must_use]
    pub const fn variant(&self) -> ThemeVariant {
        match self.background {
            Color::White | Color::Rgb(255, 255, 255) => ThemeVariant::Light,
            _ => ThemeVariant::Dark,
        }
    }

    /// Color of the save-state badge.
    #[must_use]
    pub const fn state_color(&self, state: SessionState) -> Color {
        match state {
            SessionState::Clean => self.success,
            SessionState::Dirty => self.warning,
            SessionState::Saving => self.accent,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::detect()
    }
}
