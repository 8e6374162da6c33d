//! Header theme derivation from region visibility.

use std::collections::HashSet;

use crate::constants::{DARK_OVERRIDE_GROUP, LIGHT_GROUP};
use crate::models::{NamedRegion, RegionId, ThemeSignal, VisibilitySet};

/// Derives the header theme from the visible regions.
///
/// The theme is light when any light-background region is visible and no
/// dark-override region is. Dark-override always wins, and an empty set
/// (nothing observed yet) is dark.
pub fn derive_theme(
    visibility: &VisibilitySet,
    light: &HashSet<RegionId>,
    dark_override: &HashSet<RegionId>,
) -> ThemeSignal {
    if visibility.visible().any(|id| dark_override.contains(id)) {
        return ThemeSignal::Dark;
    }

    if visibility.visible().any(|id| light.contains(id)) {
        ThemeSignal::Light
    } else {
        ThemeSignal::Dark
    }
}

/// Group membership used by [`derive_theme`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeRules {
    light: HashSet<RegionId>,
    dark_override: HashSet<RegionId>,
}

impl ThemeRules {
    /// Creates rules from explicit membership sets.
    pub fn new(light: HashSet<RegionId>, dark_override: HashSet<RegionId>) -> Self {
        Self {
            light,
            dark_override,
        }
    }

    /// Collects membership from the groups declared on each region.
    pub fn from_regions<'a>(regions: impl IntoIterator<Item = &'a NamedRegion>) -> Self {
        let mut rules = Self::default();
        for region in regions {
            rules.add(region);
        }
        rules
    }

    /// Adds a region's declared memberships.
    pub fn add(&mut self, region: &NamedRegion) {
        if region.is_in(LIGHT_GROUP) {
            self.light.insert(region.id.clone());
        }
        if region.is_in(DARK_OVERRIDE_GROUP) {
            self.dark_override.insert(region.id.clone());
        }
    }

    /// Drops a region from both groups.
    pub fn remove(&mut self, id: &str) {
        self.light.remove(id);
        self.dark_override.remove(id);
    }

    /// Light-background members.
    pub fn light(&self) -> &HashSet<RegionId> {
        &self.light
    }

    /// Dark-override members.
    pub fn dark_override(&self) -> &HashSet<RegionId> {
        &self.dark_override
    }

    /// Applies [`derive_theme`] with these memberships.
    pub fn derive(&self, visibility: &VisibilitySet) -> ThemeSignal {
        derive_theme(visibility, &self.light, &self.dark_override)
    }
}
