//! Application-wide constants.
//!
//! This module defines the application name, storage keys and the default
//! content shown before an administrator has saved anything.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Campus View";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "campus-view";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "CampusView";

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "CAMPUS_VIEW_CONFIG_DIR";

/// Storage key holding the JSON-encoded ticker lines.
pub const TICKER_KEY: &str = "tickerItems";

/// Storage key holding the JSON-encoded banner image references.
pub const BANNER_KEY: &str = "popupImages";

/// Text given to a freshly added ticker line.
pub const NEW_TICKER_LINE: &str = "New item...";

/// Ticker lines shown until an administrator saves their own.
pub const DEFAULT_TICKER_LINES: &[&str] = &[
    "🎓 Admissions are open for 2026-2027!",
    "🌿 Clean Campus, Green Campus — Join Our Eco Initiative!",
    "📞 For Admissions & Queries, Contact: +91-8121153138.",
    "🎓 Consistently Achieved 100% Results in Board Examinations!",
];

/// Popup banner images shown until an administrator saves their own.
pub const DEFAULT_BANNER_IMAGES: &[&str] = &[
    "/images/Pamphlet-1-2025.png",
    "/images/Pamphlet-2-2025.png",
];

/// Region group whose members have a light background.
pub const LIGHT_GROUP: &str = "light-background";

/// Region group whose members force the dark header whenever visible.
pub const DARK_OVERRIDE_GROUP: &str = "dark-override";
