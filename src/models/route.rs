//! Route state and top-level page views.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical location: path plus optional fragment, query string dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteState {
    /// Path component, always starting with `/`
    pub path: String,
    /// Fragment identifier without the leading `#`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl RouteState {
    /// Parses a location such as `/admin?tab=1#banners`.
    ///
    /// An empty path becomes `/` and an empty fragment is treated as absent.
    pub fn parse(location: &str) -> Self {
        let (before_fragment, fragment) = match location.split_once('#') {
            Some((head, frag)) => (head, Some(frag)),
            None => (location, None),
        };
        let path = before_fragment
            .split_once('?')
            .map_or(before_fragment, |(path, _)| path);

        let path = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            path,
            fragment: fragment
                .filter(|frag| !frag.is_empty())
                .map(ToString::to_string),
        }
    }

    /// Top-level view selected by this route.
    pub fn view(&self) -> PageView {
        PageView::from_path(&self.path)
    }
}

impl Default for RouteState {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            fragment: None,
        }
    }
}

impl fmt::Display for RouteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fragment {
            Some(fragment) => write!(f, "{}#{}", self.path, fragment),
            None => write!(f, "{}", self.path),
        }
    }
}

/// Top-level view rendered by the page shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageView {
    /// Marketing home page with all tracked sections
    Home,
    /// Full gallery page
    Gallery,
    /// Content administration panel
    Admin,
    /// Administrator login
    Login,
}

impl PageView {
    /// Maps a path to its view; unknown paths render the home page.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/view-gallery" => Self::Gallery,
            "/admin" => Self::Admin,
            "/login" => Self::Login,
            _ => Self::Home,
        }
    }

    /// Canonical path of the view.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Gallery => "/view-gallery",
            Self::Admin => "/admin",
            Self::Login => "/login",
        }
    }
}
