//! Data models for regions, routes, theme and editable content.
//!
//! This module contains all the core data structures used throughout the application.
//! Models are designed to be independent of UI and business logic.

pub mod contact;
pub mod content;
pub mod region;
pub mod route;
pub mod theme;

// Re-export all model types
pub use contact::{ContactField, ContactSubmission};
pub use content::{BannerImage, PersistedContent};
pub use region::{NamedRegion, RegionId, VisibilitySet};
pub use route::{PageView, RouteState};
pub use theme::ThemeSignal;
