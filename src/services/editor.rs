//! Admin content editor session.
//!
//! A session holds an edit buffer over the persisted ticker lines and banner
//! images. Edits only touch the buffer; [`ContentEditorSession::save`] pushes
//! the buffer to the optional remote sink and then to local storage.
//!
//! # State machine
//!
//! ```text
//! Clean --edit--> Dirty --save--> Saving --ok--> Clean
//!                   ^                |
//!                   +-----failure----+
//! ```
//!
//! Only one save may be in flight. Edits made while saving keep the session
//! dirty after the save completes.
//!
//! # Write order
//!
//! A save writes the remote sink first and local storage second. A local
//! failure after a successful remote write leaves the remote copy ahead of
//! local storage until the next successful save; local storage itself is
//! never left half-written (see [`PersistentStore::try_save_content`]).

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::sink::{BannerPayload, ContentSink, TickerPayload};
use super::storage::PersistentStore;
use super::upload::{ImageUpload, UploadPolicy, UploadRejection};
use crate::constants::NEW_TICKER_LINE;
use crate::models::{BannerImage, PersistedContent};

/// Where the edit buffer stands relative to persisted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Buffer matches persisted content
    #[default]
    Clean,
    /// Buffer has unsaved edits
    Dirty,
    /// A save is in flight
    Saving,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "saved"),
            Self::Dirty => write!(f, "unsaved changes"),
            Self::Saving => write!(f, "saving"),
        }
    }
}

/// Result of a successful call to [`ContentEditorSession::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Content was written
    Saved {
        /// When the save completed
        at: DateTime<Utc>,
    },
    /// Another save was already running; nothing was written
    AlreadySaving,
}

/// Explicit answer to the reset confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The administrator confirmed
    Confirmed,
    /// The administrator declined or was never asked
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Editor operation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Ticker line index out of bounds
    LineOutOfRange {
        /// Requested index
        index: usize,
        /// Number of lines in the buffer
        len: usize,
    },
    /// No banner with this id in the buffer
    UnknownImage(Uuid),
    /// Upload refused; the buffer is unchanged
    Upload(UploadRejection),
    /// Save failed; edits are kept and the session is dirty again
    SaveFailed(String),
    /// Operation not allowed while a save is in flight
    SaveInProgress,
    /// `complete_save` called without a save in flight
    NoSaveInFlight,
    /// `complete_save` called with a ticket from an earlier save
    StaleSaveTicket,
    /// Reset attempted without confirmation
    ResetNotConfirmed,
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineOutOfRange { index, len } => {
                write!(f, "Ticker line {index} does not exist ({len} lines)")
            }
            Self::UnknownImage(id) => write!(f, "Banner image {id} not found"),
            Self::Upload(rejection) => write!(f, "{rejection}"),
            Self::SaveFailed(message) => write!(f, "Failed to save changes: {message}"),
            Self::SaveInProgress => write!(f, "A save is already in progress"),
            Self::NoSaveInFlight => write!(f, "No save is in progress"),
            Self::StaleSaveTicket => write!(f, "Save ticket does not belong to the save in progress"),
            Self::ResetNotConfirmed => write!(f, "Reset to defaults requires confirmation"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Upload(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<UploadRejection> for EditorError {
    fn from(rejection: UploadRejection) -> Self {
        Self::Upload(rejection)
    }
}

/// Snapshot handed out by [`ContentEditorSession::begin_save`].
#[derive(Debug, Clone)]
pub struct SaveTicket {
    sequence: u64,
    revision: u64,
    content: PersistedContent,
}

impl SaveTicket {
    /// Content being saved.
    pub fn content(&self) -> &PersistedContent {
        &self.content
    }
}

/// Write path of a session, detachable so a save can run off the UI thread.
#[derive(Clone)]
pub struct SaveWriter {
    store: PersistentStore,
    sink: Option<Arc<dyn ContentSink>>,
    remote_lock: Arc<Mutex<()>>,
    timeout: Duration,
}

impl SaveWriter {
    /// Writes a ticket's content to the remote sink (if any) and local storage.
    ///
    /// A remote write that does not finish within the save timeout counts as
    /// a failure. Remote writes are serialized, so a timed-out write still
    /// finishes before the next one starts.
    pub fn write(&self, ticket: &SaveTicket) -> Result<(), String> {
        if let Some(sink) = &self.sink {
            push_remote(
                Arc::clone(sink),
                Arc::clone(&self.remote_lock),
                ticket.content.clone(),
                self.timeout,
            )?;
        }

        self.store
            .try_save_content(&ticket.content)
            .map_err(|e| format!("{e:#}"))
    }
}

/// Edit buffer over persisted content.
pub struct ContentEditorSession {
    writer: SaveWriter,
    uploads: UploadPolicy,
    persisted: PersistedContent,
    ticker_lines: Vec<String>,
    banners: Vec<BannerImage>,
    state: SessionState,
    revision: u64,
    save_sequence: u64,
    last_saved: Option<DateTime<Utc>>,
}

impl ContentEditorSession {
    /// Opens a session over the content currently in `store`.
    pub fn mount(store: PersistentStore, uploads: UploadPolicy, save_timeout: Duration) -> Self {
        let persisted = store.load_content();
        let mut session = Self {
            writer: SaveWriter {
                store,
                sink: None,
                remote_lock: Arc::new(Mutex::new(())),
                timeout: save_timeout,
            },
            uploads,
            persisted: PersistedContent::defaults(),
            ticker_lines: Vec::new(),
            banners: Vec::new(),
            state: SessionState::Clean,
            revision: 0,
            save_sequence: 0,
            last_saved: None,
        };
        session.load_buffer(persisted);
        session
    }

    /// Opens a session using the configured storage, upload and timeout settings.
    pub fn from_config(config: &crate::config::Config) -> anyhow::Result<Self> {
        let store = PersistentStore::in_dir(config.storage_dir()?, config.storage.quota_bytes);
        let mut session = Self::mount(
            store,
            UploadPolicy::new(config.uploads.max_bytes),
            config.editor.save_timeout(),
        );
        if let Some(dir) = &config.paths.remote_mirror_dir {
            session = session.with_sink(Arc::new(super::sink::DirectorySink::new(dir)));
        }
        Ok(session)
    }

    /// Mirrors saves to a remote sink before writing local storage.
    pub fn with_sink(mut self, sink: Arc<dyn ContentSink>) -> Self {
        self.writer.sink = Some(sink);
        self
    }

    fn load_buffer(&mut self, content: PersistedContent) {
        self.ticker_lines = content.ticker_lines.clone();
        self.banners = content
            .banner_images
            .iter()
            .enumerate()
            .map(|(index, source)| BannerImage::from_reference(source, index))
            .collect();
        self.persisted = content;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Ticker lines in the buffer.
    pub fn ticker_lines(&self) -> &[String] {
        &self.ticker_lines
    }

    /// Banner images in the buffer.
    pub fn banners(&self) -> &[BannerImage] {
        &self.banners
    }

    /// Content as last persisted.
    pub fn persisted(&self) -> &PersistedContent {
        &self.persisted
    }

    /// The buffer in its persisted shape.
    pub fn buffer_content(&self) -> PersistedContent {
        PersistedContent {
            ticker_lines: self.ticker_lines.clone(),
            banner_images: self.banners.iter().map(|b| b.source.clone()).collect(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while there are unsaved edits (including edits made during a save).
    pub fn is_dirty(&self) -> bool {
        match self.state {
            SessionState::Clean => false,
            SessionState::Dirty => true,
            SessionState::Saving => self.buffer_content() != self.persisted,
        }
    }

    /// When the last successful save completed in this session.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Upload rules in effect.
    pub fn upload_policy(&self) -> UploadPolicy {
        self.uploads
    }

    fn mark_dirty(&mut self) {
        self.revision += 1;
        if self.state != SessionState::Saving {
            self.state = SessionState::Dirty;
        }
    }

    // ========================================================================
    // Ticker edits
    // ========================================================================

    /// Replaces the text of one ticker line.
    pub fn update_ticker_line(&mut self, index: usize, text: impl Into<String>) -> Result<(), EditorError> {
        let len = self.ticker_lines.len();
        let line = self
            .ticker_lines
            .get_mut(index)
            .ok_or(EditorError::LineOutOfRange { index, len })?;
        *line = text.into();
        self.mark_dirty();
        Ok(())
    }

    /// Appends a placeholder ticker line, returning its index.
    pub fn add_ticker_line(&mut self) -> usize {
        self.ticker_lines.push(NEW_TICKER_LINE.to_string());
        self.mark_dirty();
        self.ticker_lines.len() - 1
    }

    /// Removes a ticker line, returning its text.
    pub fn remove_ticker_line(&mut self, index: usize) -> Result<String, EditorError> {
        if index >= self.ticker_lines.len() {
            return Err(EditorError::LineOutOfRange {
                index,
                len: self.ticker_lines.len(),
            });
        }
        let removed = self.ticker_lines.remove(index);
        self.mark_dirty();
        Ok(removed)
    }

    // ========================================================================
    // Banner edits
    // ========================================================================

    /// Validates and appends an uploaded image, returning its id.
    pub fn add_image(&mut self, upload: &ImageUpload) -> Result<Uuid, EditorError> {
        let banner = self.uploads.accept(upload)?;
        let id = banner.id;
        debug!("Added banner '{}' ({} bytes)", banner.name, upload.bytes.len());
        self.banners.push(banner);
        self.mark_dirty();
        Ok(id)
    }

    /// Appends a banner that references an existing URL.
    ///
    /// Inline `data:` references go through the same checks as uploads.
    pub fn add_image_reference(&mut self, source: impl Into<String>) -> Result<Uuid, EditorError> {
        let source = source.into();
        self.uploads.validate_reference(&source)?;
        let banner = BannerImage::from_reference(&source, self.banners.len());
        let id = banner.id;
        self.banners.push(banner);
        self.mark_dirty();
        Ok(id)
    }

    /// Removes a banner, returning it.
    pub fn remove_image(&mut self, id: Uuid) -> Result<BannerImage, EditorError> {
        let position = self.position_of(id)?;
        let removed = self.banners.remove(position);
        self.mark_dirty();
        Ok(removed)
    }

    /// Swaps a banner's image for a new upload, keeping its id and position.
    pub fn replace_image(&mut self, id: Uuid, upload: &ImageUpload) -> Result<(), EditorError> {
        let position = self.position_of(id)?;
        let replacement = self.uploads.accept(upload)?;

        let banner = &mut self.banners[position];
        banner.name = replacement.name;
        banner.source = replacement.source;
        self.mark_dirty();
        Ok(())
    }

    fn position_of(&self, id: Uuid) -> Result<usize, EditorError> {
        self.banners
            .iter()
            .position(|banner| banner.id == id)
            .ok_or(EditorError::UnknownImage(id))
    }

    /// Replaces every ticker line at once.
    pub fn set_ticker_lines(&mut self, lines: Vec<String>) {
        self.ticker_lines = lines;
        self.mark_dirty();
    }

    /// Replaces every banner with the given references.
    ///
    /// Inline `data:` references go through the same checks as uploads; the
    /// buffer is left untouched if any of them is rejected.
    pub fn set_banner_images(&mut self, sources: Vec<String>) -> Result<(), EditorError> {
        for source in &sources {
            self.uploads.validate_reference(source)?;
        }
        self.banners = sources
            .iter()
            .enumerate()
            .map(|(index, source)| BannerImage::from_reference(source, index))
            .collect();
        self.mark_dirty();
        Ok(())
    }

    /// Throws away unsaved edits.
    pub fn discard_changes(&mut self) -> Result<(), EditorError> {
        if self.state == SessionState::Saving {
            return Err(EditorError::SaveInProgress);
        }
        self.load_buffer(self.persisted.clone());
        self.revision += 1;
        self.state = SessionState::Clean;
        Ok(())
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Enters `Saving` and snapshots the buffer.
    ///
    /// Returns `None` when a save is already in flight.
    pub fn begin_save(&mut self) -> Option<SaveTicket> {
        if self.state == SessionState::Saving {
            debug!("Save requested while another save is in flight");
            return None;
        }

        self.state = SessionState::Saving;
        self.save_sequence += 1;
        Some(SaveTicket {
            sequence: self.save_sequence,
            revision: self.revision,
            content: self.buffer_content(),
        })
    }

    /// Handle for running the write of a [`SaveTicket`] elsewhere.
    pub fn writer(&self) -> SaveWriter {
        self.writer.clone()
    }

    /// Leaves `Saving` with the outcome of a write.
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), String>,
    ) -> Result<SaveOutcome, EditorError> {
        if self.state != SessionState::Saving {
            return Err(EditorError::NoSaveInFlight);
        }
        if ticket.sequence != self.save_sequence {
            return Err(EditorError::StaleSaveTicket);
        }

        if let Err(message) = result {
            warn!("Save failed, keeping edits: {}", message);
            self.state = SessionState::Dirty;
            return Err(EditorError::SaveFailed(message));
        }

        let at = Utc::now();
        self.persisted = ticket.content;
        self.last_saved = Some(at);
        self.state = if self.revision == ticket.revision {
            SessionState::Clean
        } else {
            SessionState::Dirty
        };
        info!(
            "Saved {} ticker lines and {} banners",
            self.persisted.ticker_lines.len(),
            self.persisted.banner_images.len()
        );

        Ok(SaveOutcome::Saved { at })
    }

    /// Saves the buffer; a second call while saving is a no-op.
    pub fn save(&mut self) -> Result<SaveOutcome, EditorError> {
        let Some(ticket) = self.begin_save() else {
            return Ok(SaveOutcome::AlreadySaving);
        };
        let result = self.writer.write(&ticket);
        self.complete_save(ticket, result)
    }

    /// Clears stored content and reloads the defaults into buffer and persisted copy.
    pub fn reset_to_defaults(&mut self, confirmation: Confirmation) -> Result<(), EditorError> {
        if confirmation != Confirmation::Confirmed {
            return Err(EditorError::ResetNotConfirmed);
        }
        if self.state == SessionState::Saving {
            return Err(EditorError::SaveInProgress);
        }

        self.writer.store.clear_content();
        let defaults = self.writer.store.load_content();
        self.load_buffer(defaults);
        self.revision += 1;
        self.state = SessionState::Clean;
        info!("Content reset to defaults");
        Ok(())
    }
}

impl fmt::Debug for ContentEditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentEditorSession")
            .field("state", &self.state)
            .field("ticker_lines", &self.ticker_lines.len())
            .field("banners", &self.banners.len())
            .field("remote", &self.writer.sink.is_some())
            .field("last_saved", &self.last_saved)
            .finish_non_exhaustive()
    }
}

fn push_remote(
    sink: Arc<dyn ContentSink>,
    lock: Arc<Mutex<()>>,
    content: PersistedContent,
    timeout: Duration,
) -> Result<(), String> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = match lock.lock() {
            Ok(_guard) => sink
                .write_ticker(&TickerPayload {
                    ticker_lines: content.ticker_lines,
                })
                .and_then(|()| {
                    sink.write_banners(&BannerPayload {
                        banner_images: content.banner_images,
                    })
                }),
            Err(_) => Err("Remote write lock poisoned".to_string()),
        };
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(format!(
            "Remote write timed out after {}ms",
            timeout.as_millis()
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err("Remote write stopped without a result".to_string())
        }
    }
}
