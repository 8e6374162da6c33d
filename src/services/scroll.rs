//! Scroll-to-fragment with a single delayed retry.
//!
//! The scroller is driven with explicit timestamps so the host decides how
//! time passes; call [`FragmentScroller::poll`] from the event loop.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::RouteState;

/// Host capable of scrolling a region into view.
pub trait ScrollHost {
    /// Smooth-scrolls to the region with `id`; returns false if it is not mounted.
    fn scroll_into_view(&mut self, id: &str) -> bool;
}

/// Result of a scroll attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// The route has no fragment
    NoFragment,
    /// The target was scrolled into view
    Scrolled(String),
    /// The target is not mounted yet; one retry is pending
    RetryScheduled(String),
    /// The retry found nothing either; the scroll was dropped
    Abandoned(String),
}

#[derive(Debug, Clone)]
struct PendingScroll {
    target: String,
    due: Instant,
}

/// Scrolls to route fragments, retrying once after a fixed delay.
#[derive(Debug, Clone)]
pub struct FragmentScroller {
    retry_delay: Duration,
    pending: Option<PendingScroll>,
}

impl FragmentScroller {
    /// Creates a scroller with the given retry delay.
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            retry_delay,
            pending: None,
        }
    }

    /// Attempts to scroll to the fragment of a newly entered route.
    ///
    /// Any retry pending for an earlier route is cancelled.
    pub fn on_route_change(
        &mut self,
        route: &RouteState,
        host: &mut dyn ScrollHost,
        now: Instant,
    ) -> ScrollOutcome {
        self.pending = None;

        let Some(target) = route.fragment.as_deref() else {
            return ScrollOutcome::NoFragment;
        };

        if host.scroll_into_view(target) {
            return ScrollOutcome::Scrolled(target.to_string());
        }

        debug!(
            "Fragment target '{}' not mounted, retrying in {:?}",
            target, self.retry_delay
        );
        self.pending = Some(PendingScroll {
            target: target.to_string(),
            due: now + self.retry_delay,
        });
        ScrollOutcome::RetryScheduled(target.to_string())
    }

    /// Runs the pending retry once it is due.
    ///
    /// Returns `None` while nothing is due.
    pub fn poll(&mut self, host: &mut dyn ScrollHost, now: Instant) -> Option<ScrollOutcome> {
        if self.pending.as_ref().is_none_or(|pending| now < pending.due) {
            return None;
        }
        let pending = self.pending.take()?;

        if host.scroll_into_view(&pending.target) {
            Some(ScrollOutcome::Scrolled(pending.target))
        } else {
            debug!("Fragment target '{}' never mounted, giving up", pending.target);
            Some(ScrollOutcome::Abandoned(pending.target))
        }
    }

    /// When the pending retry is due, if there is one.
    pub fn next_retry(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    /// Drops any pending retry.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
