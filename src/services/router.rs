//! Path tracking over a host location/history.
//!
//! Every programmatic navigation goes through [`PseudoRouter::navigate`], and
//! native back/forward events are fed in through
//! [`PseudoRouter::handle_pop_state`]. Both paths re-read the host location,
//! so the router's [`RouteState`] never diverges from what the host reports
//! and subscribers hear about every change through one channel.

use std::fmt;
use tracing::debug;

use crate::models::{PageView, RouteState};

/// Location and history primitives of the embedding host.
pub trait LocationHost {
    /// Current location (`/path?query#fragment`).
    fn location(&self) -> String;

    /// Pushes a new history entry.
    fn push(&mut self, location: &str);

    /// Replaces the current history entry.
    fn replace(&mut self, location: &str);

    /// Moves `delta` entries through history; returns false at either end.
    fn go(&mut self, delta: isize) -> bool;
}

/// In-memory history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryHistory {
    /// Starts a history with a single entry.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Index of the current entry.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl LocationHost for MemoryHistory {
    fn location(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn push(&mut self, location: &str) {
        // Pushing drops any forward entries
        self.entries.truncate(self.cursor + 1);
        self.entries.push(location.to_string());
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, location: &str) {
        self.entries[self.cursor] = location.to_string();
    }

    fn go(&mut self, delta: isize) -> bool {
        match self.cursor.checked_add_signed(delta) {
            Some(target) if target < self.entries.len() => {
                self.cursor = target;
                true
            }
            _ => false,
        }
    }
}

/// Options for [`PseudoRouter::navigate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one
    pub replace: bool,
}

impl NavigateOptions {
    /// Options that replace the current entry.
    pub fn replace() -> Self {
        Self { replace: true }
    }
}

/// Token returned by [`PseudoRouter::on_path_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type PathListener = Box<dyn FnMut(&RouteState)>;

/// Tracks the logical path and fragment of a [`LocationHost`].
pub struct PseudoRouter<H: LocationHost = MemoryHistory> {
    host: H,
    current: RouteState,
    listeners: Vec<(SubscriptionId, PathListener)>,
    next_subscription: u64,
}

impl<H: LocationHost> PseudoRouter<H> {
    /// Wraps a host, reading its current location.
    pub fn new(host: H) -> Self {
        let current = RouteState::parse(&host.location());
        Self {
            host,
            current,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Logical path of the current location, without query or fragment.
    pub fn current_path(&self) -> &str {
        &self.current.path
    }

    /// Fragment of the current location, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.current.fragment.as_deref()
    }

    /// Full route state.
    pub fn route(&self) -> &RouteState {
        &self.current
    }

    /// Page view selected by the current path.
    pub fn view(&self) -> PageView {
        self.current.view()
    }

    /// The wrapped host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the wrapped host.
    ///
    /// Moving through history here must be followed by
    /// [`handle_pop_state`](Self::handle_pop_state), as a browser would
    /// deliver a popstate event.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Updates the host location and notifies subscribers.
    ///
    /// A location starting with `#` keeps the current path. Returns whether
    /// the route changed.
    pub fn navigate(&mut self, location: &str, options: NavigateOptions) -> bool {
        let target = if location.starts_with('#') {
            format!("{}{}", self.current.path, location)
        } else {
            location.to_string()
        };

        debug!(
            "Navigating to {} ({})",
            target,
            if options.replace { "replace" } else { "push" }
        );
        if options.replace {
            self.host.replace(&target);
        } else {
            self.host.push(&target);
        }

        self.sync()
    }

    /// Programmatic redirect that replaces the current history entry.
    pub fn redirect(&mut self, location: &str) -> bool {
        self.navigate(location, NavigateOptions::replace())
    }

    /// Goes one entry back; returns false when already at the start.
    pub fn back(&mut self) -> bool {
        if !self.host.go(-1) {
            return false;
        }
        self.handle_pop_state();
        true
    }

    /// Goes one entry forward; returns false when already at the end.
    pub fn forward(&mut self) -> bool {
        if !self.host.go(1) {
            return false;
        }
        self.handle_pop_state();
        true
    }

    /// Handles a native back/forward notification from the host.
    pub fn handle_pop_state(&mut self) -> bool {
        self.sync()
    }

    /// Subscribes to route changes from any source.
    pub fn on_path_change(&mut self, listener: impl FnMut(&RouteState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a subscription; returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn sync(&mut self) -> bool {
        let next = RouteState::parse(&self.host.location());
        if next == self.current {
            return false;
        }

        debug!("Route changed: {} -> {}", self.current, next);
        self.current = next;
        for (_, listener) in &mut self.listeners {
            listener(&self.current);
        }
        true
    }
}

impl<H: LocationHost + fmt::Debug> fmt::Debug for PseudoRouter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PseudoRouter")
            .field("host", &self.host)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
