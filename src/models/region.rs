//! Named page regions and their visibility set.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Identifier of a tracked page region (e.g. "admissions").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Creates a region id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A region registered for visibility tracking.
///
/// # Validation
///
/// - id must be non-empty
/// - threshold must lie in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRegion {
    /// Unique identifier
    pub id: RegionId,
    /// Fraction of the region that must intersect the viewport to count as visible
    pub threshold: f64,
    /// Semantic groups the region belongs to
    #[serde(default)]
    pub groups: Vec<String>,
}

impl NamedRegion {
    /// Creates a region without group membership.
    pub fn new(id: impl Into<RegionId>, threshold: f64) -> Self {
        Self {
            id: id.into(),
            threshold,
            groups: Vec::new(),
        }
    }

    /// Adds the region to a semantic group.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Checks whether the region belongs to `group`.
    pub fn is_in(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Current visibility of every registered region.
///
/// Every registered id stays present (with `false` while hidden) until it is
/// explicitly unregistered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySet {
    entries: HashMap<RegionId, bool>,
}

impl VisibilitySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `id` is registered and currently visible.
    pub fn is_visible(&self, id: &str) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Returns whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterates over the currently visible region ids.
    pub fn visible(&self) -> impl Iterator<Item = &RegionId> {
        self.entries
            .iter()
            .filter_map(|(id, visible)| (*visible).then_some(id))
    }

    /// Iterates over every registered id with its visibility.
    pub fn iter(&self) -> impl Iterator<Item = (&RegionId, bool)> {
        self.entries.iter().map(|(id, visible)| (id, *visible))
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no region is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records the visibility of a region, returning the previous value.
    pub fn set(&mut self, id: RegionId, visible: bool) -> Option<bool> {
        self.entries.insert(id, visible)
    }

    /// Drops a region from the set.
    pub fn remove(&mut self, id: &str) -> Option<bool> {
        self.entries.remove(id)
    }
}

impl<I: Into<RegionId>> FromIterator<(I, bool)> for VisibilitySet {
    fn from_iter<T: IntoIterator<Item = (I, bool)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(id, v)| (id.into(), v)).collect(),
        }
    }
}
