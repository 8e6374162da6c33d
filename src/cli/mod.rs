//! CLI command handlers for Campus View.
//!
//! This module provides headless, scriptable access to the site content
//! (ticker lines and popup banners) and to the header theme rules, for
//! automation and testing.

pub mod banner;
pub mod common;
pub mod config;
pub mod content;
pub mod reset;
pub mod theme;
pub mod ticker;

// Re-export types used by main.rs and tests
pub use banner::BannerArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use content::ContentArgs;
pub use reset::ResetArgs;
pub use theme::ThemeArgs;
pub use ticker::TickerArgs;
