//! Shared CLI plumbing: error type, exit codes and session helpers.

use serde::Serialize;
use std::fmt;

use crate::config::Config;
use crate::services::{ContentEditorSession, EditorError, SaveOutcome};

/// Process exit codes used by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Invalid input or configuration
    ValidationError = 1,
    /// File system or serialization failure
    IoError = 2,
}

impl ExitCode {
    /// Numeric process exit code.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    kind: ExitCode,
    message: String,
}

impl CliError {
    /// Invalid input (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::ValidationError,
            message: message.into(),
        }
    }

    /// I/O failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::IoError,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        self.kind
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<EditorError> for CliError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::SaveFailed(_) => Self::io(err.to_string()),
            _ => Self::validation(err.to_string()),
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Loads and validates the configuration.
pub fn load_config() -> CliResult<Config> {
    let config = Config::load()
        .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
    config
        .validate()
        .map_err(|e| CliError::validation(format!("Invalid configuration: {e:#}")))?;
    Ok(config)
}

/// Opens an editor session over the configured storage.
pub fn open_session() -> CliResult<ContentEditorSession> {
    let config = load_config()?;
    ContentEditorSession::from_config(&config)
        .map_err(|e| CliError::io(format!("Failed to open content storage: {e:#}")))
}

/// Saves a session and prints the confirmation line.
pub fn save_session(session: &mut ContentEditorSession) -> CliResult<()> {
    match session.save()? {
        SaveOutcome::Saved { at } => {
            println!("Saved at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            Ok(())
        }
        SaveOutcome::AlreadySaving => Err(CliError::io("Another save is still in progress")),
    }
}

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Shortens inline `data:` URLs for terminal output.
pub fn display_source(source: &str) -> String {
    if !source.starts_with("data:") {
        return source.to_string();
    }
    let header = source.split(',').next().unwrap_or(source);
    format!("{header},… ({} bytes)", source.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation("x").exit_code().code(), 1);
        assert_eq!(CliError::io("x").exit_code().code(), 2);
        assert_eq!(ExitCode::Success.code(), 0);
    }

    #[test]
    fn test_editor_errors_map_to_exit_codes() {
        let save: CliError = EditorError::SaveFailed("disk full".into()).into();
        assert_eq!(save.exit_code(), ExitCode::IoError);

        let range: CliError = EditorError::LineOutOfRange { index: 9, len: 2 }.into();
        assert_eq!(range.exit_code(), ExitCode::ValidationError);
    }

    #[test]
    fn test_display_source_truncates_inline_data() {
        assert_eq!(display_source("/images/a.png"), "/images/a.png");
        let shown = display_source("data:image/png;base64,AAAAAAAA");
        assert!(shown.starts_with("data:image/png;base64,…"));
    }
}
