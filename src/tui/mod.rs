//! Terminal admin editor for ticker lines and popup banners.
//!
//! This module contains the terminal setup, the main event loop and the
//! widgets used to edit site content from a terminal.

// Allow intentional type casts for terminal coordinates
#![allow(clippy::cast_possible_truncation)]

pub mod admin_editor;
pub mod theme;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use crate::config::Config;
use crate::services::ContentEditorSession;

pub use admin_editor::{AdminEditor, InputMode, Pane, StatusMessage};
pub use theme::{Theme, ThemeVariant};

/// Setup terminal for TUI
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore terminal to normal state
pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main event loop
pub fn run_tui(
    editor: &mut AdminEditor,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        // Pick up a finished background save
        editor.poll_save();

        terminal.draw(|f| admin_editor::render(f, editor))?;

        // Poll for events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    editor.handle_key(key);
                }
            }
        }

        if editor.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Opens the configured content and runs the editor until the user quits.
pub fn run_admin_editor(config: &Config) -> Result<()> {
    let session = ContentEditorSession::from_config(config)?;
    let theme = Theme::from_mode(config.ui.theme_mode);
    let mut editor = AdminEditor::new(session, theme);

    let mut terminal = setup_terminal()?;
    let result = run_tui(&mut editor, &mut terminal);
    restore_terminal(terminal)?;

    result
}
