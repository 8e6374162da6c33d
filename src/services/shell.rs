//! Page shell wiring router, view state, fragment scrolling and the popup.

use anyhow::Result;
use std::time::Instant;

use super::coordinator::{HeaderState, ViewStateCoordinator};
use super::popup::PopupCarousel;
use super::router::{LocationHost, MemoryHistory, NavigateOptions, PseudoRouter};
use super::scroll::{FragmentScroller, ScrollHost, ScrollOutcome};
use crate::config::Config;
use crate::models::{PageView, PersistedContent, RouteState};

/// Top-level page state driven by a host event loop.
#[derive(Debug)]
pub struct PageShell<H: LocationHost + std::fmt::Debug = MemoryHistory> {
    router: PseudoRouter<H>,
    view_state: ViewStateCoordinator,
    scroller: FragmentScroller,
    popup: PopupCarousel,
}

impl<H: LocationHost + std::fmt::Debug> PageShell<H> {
    /// Assembles a shell from its parts.
    pub fn new(
        router: PseudoRouter<H>,
        view_state: ViewStateCoordinator,
        scroller: FragmentScroller,
        popup: PopupCarousel,
    ) -> Self {
        Self {
            router,
            view_state,
            scroller,
            popup,
        }
    }

    /// Builds a shell over `host` using configured regions and timings.
    pub fn from_config(config: &Config, host: H, content: &PersistedContent) -> Result<Self> {
        Ok(Self::new(
            PseudoRouter::new(host),
            ViewStateCoordinator::from_config(config)?,
            FragmentScroller::new(config.navigation.fragment_retry()),
            PopupCarousel::new(content.banner_images.clone()),
        ))
    }

    /// The router.
    pub fn router(&self) -> &PseudoRouter<H> {
        &self.router
    }

    /// Mutable router access, e.g. for subscriptions.
    pub fn router_mut(&mut self) -> &mut PseudoRouter<H> {
        &mut self.router
    }

    /// Visibility and theme state.
    pub fn view_state(&self) -> &ViewStateCoordinator {
        &self.view_state
    }

    /// Mutable visibility and theme state.
    pub fn view_state_mut(&mut self) -> &mut ViewStateCoordinator {
        &mut self.view_state
    }

    /// The banner popup.
    pub fn popup(&self) -> &PopupCarousel {
        &self.popup
    }

    /// Mutable banner popup.
    pub fn popup_mut(&mut self) -> &mut PopupCarousel {
        &mut self.popup
    }

    /// View selected by the current path.
    pub fn view(&self) -> PageView {
        self.router.view()
    }

    /// Header state for the current view.
    pub fn header(&self) -> HeaderState {
        self.view_state.header_state(self.view())
    }

    /// Whether the banner popup is showing.
    pub fn shows_popup(&self) -> bool {
        self.popup.is_visible_on(self.view())
    }

    /// Scrolls to the fragment of the initial location, if any.
    pub fn start(&mut self, host: &mut dyn ScrollHost, now: Instant) -> ScrollOutcome {
        let route = self.router.route().clone();
        self.scroller.on_route_change(&route, host, now)
    }

    /// Navigates and scrolls to the new fragment.
    ///
    /// Returns `None` when the route did not change.
    pub fn navigate(
        &mut self,
        location: &str,
        options: NavigateOptions,
        host: &mut dyn ScrollHost,
        now: Instant,
    ) -> Option<ScrollOutcome> {
        if !self.router.navigate(location, options) {
            return None;
        }
        let route = self.router.route().clone();
        Some(self.scroller.on_route_change(&route, host, now))
    }

    /// Handles a native back/forward event.
    pub fn pop_state(&mut self, host: &mut dyn ScrollHost, now: Instant) -> Option<ScrollOutcome> {
        if !self.router.handle_pop_state() {
            return None;
        }
        let route = self.router.route().clone();
        Some(self.scroller.on_route_change(&route, host, now))
    }

    /// Follows a header link to a home page section.
    ///
    /// On the home page the section is scrolled to in place. Elsewhere the
    /// router first navigates to `/#section`.
    pub fn follow_section_link(
        &mut self,
        section: &str,
        host: &mut dyn ScrollHost,
        now: Instant,
    ) -> ScrollOutcome {
        if self.view() == PageView::Home {
            let target = RouteState {
                path: PageView::Home.path().to_string(),
                fragment: Some(section.to_string()),
            };
            return self.scroller.on_route_change(&target, host, now);
        }

        let location = format!("{}#{}", PageView::Home.path(), section);
        self.navigate(&location, NavigateOptions::default(), host, now)
            .unwrap_or(ScrollOutcome::NoFragment)
    }

    /// Runs a pending fragment retry when due.
    pub fn tick(&mut self, host: &mut dyn ScrollHost, now: Instant) -> Option<ScrollOutcome> {
        self.scroller.poll(host, now)
    }
}
