//! Viewport visibility tracking for named page regions.
//!
//! The host measures how much of each mounted region intersects the viewport
//! and reports the ratio through [`VisibilityTracker::observe`]. The tracker
//! turns ratios into threshold crossings, keeps the [`VisibilitySet`] current
//! and fires change listeners at most once per state change.

use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::models::{NamedRegion, RegionId, VisibilitySet};

/// Opaque handle attaching a registered region to a renderable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionHandle(u64);

impl fmt::Display for RegionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

type ChangeListener = Box<dyn FnMut(bool)>;

struct TrackedRegion {
    region: NamedRegion,
    visible: bool,
}

/// Returns whether an intersection `ratio` counts as visible for `threshold`.
///
/// A region with no intersecting pixels is never visible, even with a zero
/// threshold.
pub fn crosses_threshold(ratio: f64, threshold: f64) -> bool {
    ratio > 0.0 && ratio >= threshold
}

/// Tracks the visibility of an extensible set of named regions.
#[derive(Default)]
pub struct VisibilityTracker {
    regions: HashMap<RegionHandle, TrackedRegion>,
    handles: HashMap<RegionId, RegionHandle>,
    set: VisibilitySet,
    listeners: HashMap<RegionId, Vec<ChangeListener>>,
    next_handle: u64,
}

impl VisibilityTracker {
    /// Creates a tracker with no regions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins observing `id` with the given threshold ratio.
    pub fn register(&mut self, id: impl Into<RegionId>, threshold: f64) -> Result<RegionHandle> {
        self.register_region(NamedRegion::new(id, threshold))
    }

    /// Begins observing a fully described region.
    ///
    /// The region starts hidden and appears in the visibility set right away.
    pub fn register_region(&mut self, region: NamedRegion) -> Result<RegionHandle> {
        if region.id.as_str().is_empty() {
            anyhow::bail!("Region id cannot be empty");
        }
        if !(0.0..=1.0).contains(&region.threshold) {
            anyhow::bail!(
                "Region '{}' threshold {} must be between 0 and 1",
                region.id,
                region.threshold
            );
        }
        if self.handles.contains_key(region.id.as_str()) {
            anyhow::bail!("Region '{}' is already registered", region.id);
        }

        let handle = RegionHandle(self.next_handle);
        self.next_handle += 1;

        debug!("Registered {} as {}", region.id, handle);
        self.handles.insert(region.id.clone(), handle);
        self.set.set(region.id.clone(), false);
        self.regions.insert(
            handle,
            TrackedRegion {
                region,
                visible: false,
            },
        );

        Ok(handle)
    }

    /// Stops observing a region and drops its entry and listeners.
    ///
    /// Returns the region that was removed; unknown or already removed
    /// handles are ignored.
    pub fn unregister(&mut self, handle: RegionHandle) -> Option<NamedRegion> {
        let tracked = self.regions.remove(&handle)?;
        let id = tracked.region.id.as_str();

        self.handles.remove(id);
        self.set.remove(id);
        self.listeners.remove(id);
        debug!("Unregistered {}", tracked.region.id);

        Some(tracked.region)
    }

    /// Subscribes to visibility crossings of `id` in either direction.
    pub fn on_change(&mut self, id: &str, listener: impl FnMut(bool) + 'static) -> Result<()> {
        let Some(handle) = self.handles.get(id) else {
            anyhow::bail!("Region '{id}' is not registered");
        };
        let region_id = self.regions[handle].region.id.clone();

        self.listeners
            .entry(region_id)
            .or_default()
            .push(Box::new(listener));
        Ok(())
    }

    /// Reports a new intersection ratio for a region.
    ///
    /// Returns the new visibility when the region crossed its threshold,
    /// `None` when nothing changed or the handle is no longer tracked.
    pub fn observe(&mut self, handle: RegionHandle, ratio: f64) -> Option<bool> {
        let Some(tracked) = self.regions.get_mut(&handle) else {
            debug!("Ignoring measurement for inert {}", handle);
            return None;
        };

        let visible = crosses_threshold(ratio, tracked.region.threshold);
        if visible == tracked.visible {
            return None;
        }
        tracked.visible = visible;

        let id = tracked.region.id.clone();
        debug!("Region {} is now {}", id, if visible { "visible" } else { "hidden" });
        self.set.set(id.clone(), visible);

        if let Some(listeners) = self.listeners.get_mut(id.as_str()) {
            for listener in listeners.iter_mut() {
                listener(visible);
            }
        }

        Some(visible)
    }

    /// Current visibility of all registered regions.
    pub fn visibility(&self) -> &VisibilitySet {
        &self.set
    }

    /// Looks up the handle of a registered region.
    pub fn handle_of(&self, id: &str) -> Option<RegionHandle> {
        self.handles.get(id).copied()
    }

    /// Returns the region behind a handle.
    pub fn region(&self, handle: RegionHandle) -> Option<&NamedRegion> {
        self.regions.get(&handle).map(|tracked| &tracked.region)
    }

    /// Iterates over all registered regions.
    pub fn regions(&self) -> impl Iterator<Item = &NamedRegion> {
        self.regions.values().map(|tracked| &tracked.region)
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl fmt::Debug for VisibilityTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityTracker")
            .field("set", &self.set)
            .field("listeners", &self.listeners.values().map(Vec::len).sum::<usize>())
            .finish_non_exhaustive()
    }
}
