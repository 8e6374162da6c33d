//! Admin editor state and input handling.
//!
//! Saves run on a worker thread and report back over a channel that the
//! event loop polls, so the interface keeps responding while the remote
//! mirror is slow. Edits made during a save leave the session dirty.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::debug;
use uuid::Uuid;

use super::theme::{Theme, ThemeVariant};
use crate::constants::APP_NAME;
use crate::services::{
    Confirmation, ContentEditorSession, EditorError, ImageUpload, SaveOutcome, SaveTicket,
};

/// Which list has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    /// News ticker lines
    Ticker,
    /// Popup banner images
    Banners,
}

/// What keystrokes currently mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Navigating the lists
    Normal,
    /// Typing the text of a ticker line
    EditLine {
        /// Line being edited
        index: usize,
        /// Text typed so far
        buffer: String,
    },
    /// Typing the path of an image file
    BannerPath {
        /// Banner to replace, or `None` to add a new one
        replace: Option<Uuid>,
        /// Path typed so far
        buffer: String,
    },
    /// Waiting for y/n before resetting to defaults
    ConfirmReset,
    /// Waiting for y/n before quitting with unsaved edits
    ConfirmQuit,
}

/// One-line message shown above the help bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Message text
    pub text: String,
    /// Render as an error
    pub is_error: bool,
}

struct PendingSave {
    ticket: SaveTicket,
    result: Receiver<Result<(), String>>,
}

/// Terminal editor over a [`ContentEditorSession`].
pub struct AdminEditor {
    session: ContentEditorSession,
    theme: Theme,
    pane: Pane,
    selected: usize,
    mode: InputMode,
    status: Option<StatusMessage>,
    pending_save: Option<PendingSave>,
    should_quit: bool,
}

impl AdminEditor {
    /// Wraps a session.
    pub fn new(session: ContentEditorSession, theme: Theme) -> Self {
        Self {
            session,
            theme,
            pane: Pane::Ticker,
            selected: 0,
            mode: InputMode::Normal,
            status: None,
            pending_save: None,
            should_quit: false,
        }
    }

    /// The underlying session.
    pub fn session(&self) -> &ContentEditorSession {
        &self.session
    }

    /// Colors in use.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Switches between the dark and light palettes.
    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme.variant() {
            ThemeVariant::Dark => Theme::light(),
            ThemeVariant::Light => Theme::dark(),
        };
    }

    /// Focused pane.
    pub fn pane(&self) -> Pane {
        self.pane
    }

    /// Selected row in the focused pane.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Current input mode.
    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    /// Current status message.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Whether the user asked to leave.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    fn report(&mut self, result: Result<(), EditorError>, success: &str) {
        match result {
            Ok(()) => self.set_status(success),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn pane_len(&self) -> usize {
        match self.pane {
            Pane::Ticker => self.session.ticker_lines().len(),
            Pane::Banners => self.session.banners().len(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.pane_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn selected_banner(&self) -> Option<Uuid> {
        self.session.banners().get(self.selected).map(|b| b.id)
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Starts a background save unless one is already running.
    pub fn start_save(&mut self) {
        let Some(ticket) = self.session.begin_save() else {
            self.set_status("Save already in progress");
            return;
        };

        let writer = self.session.writer();
        let snapshot = ticket.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(writer.write(&snapshot));
        });

        debug!("Background save started");
        self.pending_save = Some(PendingSave { ticket, result: rx });
        self.set_status("Saving...");
    }

    /// Applies the result of a finished background save.
    ///
    /// Returns true when a save completed during this call.
    pub fn poll_save(&mut self) -> bool {
        let result = match &self.pending_save {
            Some(pending) => match pending.result.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => Err("Save worker stopped unexpectedly".to_string()),
            },
            None => return false,
        };

        let Some(pending) = self.pending_save.take() else {
            return false;
        };
        match self.session.complete_save(pending.ticket, result) {
            Ok(SaveOutcome::Saved { at }) => {
                let local = at.with_timezone(&chrono::Local);
                self.set_status(format!("Saved at {}", local.format("%H:%M:%S")));
            }
            Ok(SaveOutcome::AlreadySaving) => {}
            Err(e) => self.set_error(e.to_string()),
        }
        true
    }

    /// Whether a background save is running.
    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Handles one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode.clone() {
            InputMode::Normal => self.handle_normal(key),
            InputMode::EditLine { index, buffer } => self.handle_edit_line(key, index, buffer),
            InputMode::BannerPath { replace, buffer } => self.handle_banner_path(key, replace, buffer),
            InputMode::ConfirmReset => self.handle_confirm_reset(key),
            InputMode::ConfirmQuit => self.handle_confirm_quit(key),
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.session.is_dirty() || self.is_saving() {
                    self.mode = InputMode::ConfirmQuit;
                    self.set_error("Unsaved changes. Quit anyway? (y/n)");
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.pane = match self.pane {
                    Pane::Ticker => Pane::Banners,
                    Pane::Banners => Pane::Ticker,
                };
                self.selected = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.pane_len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('e') if self.pane == Pane::Ticker => {
                if let Some(text) = self.session.ticker_lines().get(self.selected) {
                    self.mode = InputMode::EditLine {
                        index: self.selected,
                        buffer: text.clone(),
                    };
                }
            }
            KeyCode::Char('a') => match self.pane {
                Pane::Ticker => {
                    let index = self.session.add_ticker_line();
                    self.selected = index;
                    self.mode = InputMode::EditLine {
                        index,
                        buffer: self.session.ticker_lines()[index].clone(),
                    };
                }
                Pane::Banners => {
                    self.mode = InputMode::BannerPath {
                        replace: None,
                        buffer: String::new(),
                    };
                }
            },
            KeyCode::Char('r') if self.pane == Pane::Banners => {
                if let Some(id) = self.selected_banner() {
                    self.mode = InputMode::BannerPath {
                        replace: Some(id),
                        buffer: String::new(),
                    };
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected(),
            KeyCode::Char('s') => self.start_save(),
            KeyCode::Char('R') => {
                self.mode = InputMode::ConfirmReset;
                self.set_error("Reset ticker and banners to defaults? (y/n)");
            }
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('u') => {
                let result = self.session.discard_changes();
                self.clamp_selection();
                self.report(result, "Changes discarded");
            }
            _ => {}
        }
    }

    fn remove_selected(&mut self) {
        let result = match self.pane {
            Pane::Ticker => self.session.remove_ticker_line(self.selected).map(|_| ()),
            Pane::Banners => match self.selected_banner() {
                Some(id) => self.session.remove_image(id).map(|_| ()),
                None => return,
            },
        };
        self.clamp_selection();
        self.report(result, "Removed");
    }

    fn handle_edit_line(&mut self, key: KeyEvent, index: usize, mut buffer: String) {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.set_status("Edit cancelled");
            }
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                let result = self.session.update_ticker_line(index, buffer);
                self.report(result, "Ticker line updated");
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = InputMode::EditLine { index, buffer };
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                buffer.push(c);
                self.mode = InputMode::EditLine { index, buffer };
            }
            _ => {}
        }
    }

    fn handle_banner_path(&mut self, key: KeyEvent, replace: Option<Uuid>, mut buffer: String) {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.set_status("Upload cancelled");
            }
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                let path = buffer.trim();
                if path.is_empty() {
                    self.set_error("No file given");
                    return;
                }
                let upload = match ImageUpload::from_path(Path::new(path)) {
                    Ok(upload) => upload,
                    Err(e) => {
                        self.set_error(format!("{e:#}"));
                        return;
                    }
                };
                match replace {
                    Some(id) => {
                        let result = self.session.replace_image(id, &upload);
                        self.report(result, "Banner replaced");
                    }
                    None => {
                        let result = self.session.add_image(&upload).map(|_| ());
                        if result.is_ok() {
                            self.selected = self.session.banners().len() - 1;
                        }
                        self.report(result, "Banner added");
                    }
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = InputMode::BannerPath { replace, buffer };
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                buffer.push(c);
                self.mode = InputMode::BannerPath { replace, buffer };
            }
            _ => {}
        }
    }

    fn handle_confirm_reset(&mut self, key: KeyEvent) {
        self.mode = InputMode::Normal;
        let confirmation = Confirmation::from(matches!(key.code, KeyCode::Char('y' | 'Y')));
        match self.session.reset_to_defaults(confirmation) {
            Ok(()) => {
                self.clamp_selection();
                self.set_status("Content reset to defaults");
            }
            Err(EditorError::ResetNotConfirmed) => self.set_status("Reset cancelled"),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn handle_confirm_quit(&mut self, key: KeyEvent) {
        self.mode = InputMode::Normal;
        if matches!(key.code, KeyCode::Char('y' | 'Y')) {
            self.should_quit = true;
        } else {
            self.status = None;
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Draws the editor.
pub fn render(f: &mut Frame, editor: &AdminEditor) {
    let theme = &editor.theme;
    let full_bg = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(full_bg, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(6),    // Lists
            Constraint::Length(3), // Input / status
            Constraint::Length(1), // Help
        ])
        .split(f.area());

    render_title(f, chunks[0], editor, theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let ticker: Vec<String> = editor.session.ticker_lines().to_vec();
    render_list(f, columns[0], "News Ticker", &ticker, editor, Pane::Ticker, theme);

    let banners: Vec<String> = editor
        .session
        .banners()
        .iter()
        .map(|b| {
            if b.is_inline() {
                format!("{} (embedded)", b.name)
            } else {
                format!("{} ({})", b.name, b.source)
            }
        })
        .collect();
    render_list(f, columns[1], "Popup Banners", &banners, editor, Pane::Banners, theme);

    render_input(f, chunks[2], editor, theme);
    render_help(f, chunks[3], editor, theme);
}

fn render_title(f: &mut Frame, area: Rect, editor: &AdminEditor, theme: &Theme) {
    let state = editor.session.state();
    let mut spans = vec![
        Span::styled(
            format!(" {APP_NAME} Admin "),
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{state}]"),
            Style::default().fg(theme.state_color(state)),
        ),
    ];
    if let Some(at) = editor.session.last_saved() {
        let local = at.with_timezone(&chrono::Local);
        spans.push(Span::styled(
            format!("  last saved {}", local.format("%H:%M:%S")),
            Style::default().fg(theme.text_muted),
        ));
    }

    let title = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary)),
    );
    f.render_widget(title, area);
}

fn render_list(
    f: &mut Frame,
    area: Rect,
    title: &str,
    items: &[String],
    editor: &AdminEditor,
    pane: Pane,
    theme: &Theme,
) {
    let focused = editor.pane == pane;
    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let selected = focused && index == editor.selected;
            let style = if selected {
                Style::default()
                    .fg(theme.accent)
                    .bg(theme.highlight_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            Line::from(Span::styled(format!("{:>2}. {}", index, item), style))
        })
        .collect();

    let border = if focused { theme.accent } else { theme.text_muted };
    let list = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(format!(" {title} ({}) ", items.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(list, area);
}

fn render_input(f: &mut Frame, area: Rect, editor: &AdminEditor, theme: &Theme) {
    let (label, content, style) = match &editor.mode {
        InputMode::EditLine { index, buffer } => (
            format!(" Line {index} "),
            format!("{buffer}_"),
            Style::default().fg(theme.text),
        ),
        InputMode::BannerPath { replace, buffer } => (
            if replace.is_some() {
                " Replacement image file ".to_string()
            } else {
                " Image file to add ".to_string()
            },
            format!("{buffer}_"),
            Style::default().fg(theme.text),
        ),
        _ => match &editor.status {
            Some(status) if status.is_error => (
                " Status ".to_string(),
                status.text.clone(),
                Style::default().fg(theme.error),
            ),
            Some(status) => (
                " Status ".to_string(),
                status.text.clone(),
                Style::default().fg(theme.success),
            ),
            None => (" Status ".to_string(), String::new(), Style::default()),
        },
    };

    let input = Paragraph::new(content).style(style).block(
        Block::default()
            .title(label)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary)),
    );
    f.render_widget(input, area);
}

fn render_help(f: &mut Frame, area: Rect, editor: &AdminEditor, theme: &Theme) {
    let help = match editor.mode {
        InputMode::EditLine { .. } | InputMode::BannerPath { .. } => "Enter: confirm  Esc: cancel",
        InputMode::ConfirmReset | InputMode::ConfirmQuit => "y: yes  any other key: no",
        InputMode::Normal => match editor.pane {
            Pane::Ticker => {
                "Tab: banners  ↑↓: select  Enter: edit  a: add  d: remove  s: save  u: undo all  R: reset  t: theme  q: quit"
            }
            Pane::Banners => {
                "Tab: ticker  ↑↓: select  a: add file  r: replace  d: remove  s: save  u: undo all  R: reset  t: theme  q: quit"
            }
        },
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(theme.text_muted)),
        area,
    );
}
