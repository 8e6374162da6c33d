//! View-state coordination: visibility, theme and header state.
//!
//! The coordinator owns the [`VisibilityTracker`] and recomputes the
//! [`ThemeSignal`] synchronously after every visibility change, so the header
//! receives the theme as an explicit value instead of reading shared state.

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::theme::ThemeRules;
use super::visibility::{RegionHandle, VisibilityTracker};
use crate::config::Config;
use crate::models::{NamedRegion, PageView, ThemeSignal, VisibilitySet};

type ThemeListener = Box<dyn FnMut(ThemeSignal)>;

/// Whether the page has scrolled past the header threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    threshold_px: f64,
    scrolled: bool,
}

impl ScrollState {
    /// Creates a state switching at `threshold_px`.
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold_px,
            scrolled: false,
        }
    }

    /// Records a new vertical offset; returns true when the scrolled flag flipped.
    pub fn update(&mut self, offset_px: f64) -> bool {
        let scrolled = offset_px > self.threshold_px;
        let changed = scrolled != self.scrolled;
        self.scrolled = scrolled;
        changed
    }

    /// Current flag.
    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }
}

/// Everything the header needs to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderState {
    /// Contrast style
    pub theme: ThemeSignal,
    /// Page scrolled past the threshold
    pub scrolled: bool,
    /// Section links scroll in place instead of navigating home first
    pub home_page: bool,
}

/// Owns region visibility and the derived theme.
pub struct ViewStateCoordinator {
    tracker: VisibilityTracker,
    rules: ThemeRules,
    theme: ThemeSignal,
    theme_listeners: Vec<ThemeListener>,
    scroll: ScrollState,
    intro_active: bool,
}

impl ViewStateCoordinator {
    /// Registers `regions` and starts with the dark theme.
    pub fn new(regions: &[NamedRegion], scroll_threshold_px: f64) -> Result<Self> {
        let mut coordinator = Self {
            tracker: VisibilityTracker::new(),
            rules: ThemeRules::default(),
            theme: ThemeSignal::Dark,
            theme_listeners: Vec::new(),
            scroll: ScrollState::new(scroll_threshold_px),
            intro_active: true,
        };
        for region in regions {
            coordinator.register(region.clone())?;
        }
        Ok(coordinator)
    }

    /// Builds a coordinator from the configured regions and scroll threshold.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.regions.named_regions(),
            f64::from(config.navigation.scroll_threshold_px),
        )
    }

    /// Adds a region and its group memberships.
    pub fn register(&mut self, region: NamedRegion) -> Result<RegionHandle> {
        let rules_for = region.clone();
        let handle = self.tracker.register_region(region)?;
        self.rules.add(&rules_for);
        Ok(handle)
    }

    /// Removes a region; the theme is recomputed without it.
    pub fn unregister(&mut self, handle: RegionHandle) -> bool {
        let Some(region) = self.tracker.unregister(handle) else {
            return false;
        };
        self.rules.remove(region.id.as_str());
        self.refresh_theme();
        true
    }

    /// Handle of a registered region.
    pub fn handle(&self, id: &str) -> Option<RegionHandle> {
        self.tracker.handle_of(id)
    }

    /// Forwards a region measurement; returns the new visibility on a crossing.
    pub fn observe(&mut self, handle: RegionHandle, ratio: f64) -> Option<bool> {
        let changed = self.tracker.observe(handle, ratio)?;
        self.refresh_theme();
        Some(changed)
    }

    /// Subscribes to visibility crossings of one region.
    pub fn on_region_change(&mut self, id: &str, listener: impl FnMut(bool) + 'static) -> Result<()> {
        self.tracker.on_change(id, listener)
    }

    /// Subscribes to theme changes.
    pub fn on_theme_change(&mut self, listener: impl FnMut(ThemeSignal) + 'static) {
        self.theme_listeners.push(Box::new(listener));
    }

    fn refresh_theme(&mut self) {
        let theme = self.rules.derive(self.tracker.visibility());
        if theme == self.theme {
            return;
        }

        debug!("Theme changed: {} -> {}", self.theme, theme);
        self.theme = theme;
        for listener in &mut self.theme_listeners {
            listener(theme);
        }
    }

    /// Current derived theme.
    pub fn theme(&self) -> ThemeSignal {
        self.theme
    }

    /// Current visibility set.
    pub fn visibility(&self) -> &VisibilitySet {
        self.tracker.visibility()
    }

    /// Records the page scroll offset.
    pub fn update_scroll(&mut self, offset_px: f64) -> bool {
        self.scroll.update(offset_px)
    }

    /// Marks the intro animation as finished.
    pub fn finish_intro(&mut self) {
        self.intro_active = false;
    }

    /// Whether the intro animation is still covering the page.
    pub fn intro_active(&self) -> bool {
        self.intro_active
    }

    /// Header rendering state for `view`.
    ///
    /// The intro keeps the home header dark, and the gallery page always uses
    /// the light header.
    pub fn header_state(&self, view: PageView) -> HeaderState {
        let theme = match view {
            PageView::Home if self.intro_active => ThemeSignal::Dark,
            PageView::Home => self.theme,
            PageView::Gallery => ThemeSignal::Light,
            PageView::Admin | PageView::Login => ThemeSignal::Dark,
        };
        HeaderState {
            theme,
            scrolled: self.scroll.is_scrolled(),
            home_page: view == PageView::Home,
        }
    }
}

impl fmt::Debug for ViewStateCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewStateCoordinator")
            .field("tracker", &self.tracker)
            .field("theme", &self.theme)
            .field("scroll", &self.scroll)
            .field("intro_active", &self.intro_active)
            .finish_non_exhaustive()
    }
}
