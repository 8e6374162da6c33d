//! Campus View Library
//!
//! This library provides the view-state and content-persistence engine behind
//! a school website: region visibility tracking, header theme derivation, a
//! pseudo-router with fragment scrolling, and an admin editing session for the
//! news ticker and popup banners backed by local storage.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod services;
#[cfg(feature = "ratatui")]
pub mod tui;
#[cfg(feature = "web")]
pub mod web;
