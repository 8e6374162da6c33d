//! Service layer for view state and content persistence.
//!
//! This module contains the stateful engines (storage, visibility, routing,
//! editing) and the collaborator traits they are wired to.

pub mod contact;
pub mod coordinator;
pub mod editor;
pub mod popup;
pub mod router;
pub mod scroll;
pub mod shell;
pub mod sink;
pub mod storage;
pub mod theme;
pub mod upload;
pub mod visibility;

// Re-export commonly used types and functions
pub use contact::{submit_contact, ContactError, FormSink, LogSink, OutboxSink};
pub use coordinator::{HeaderState, ScrollState, ViewStateCoordinator};
pub use editor::{
    Confirmation, ContentEditorSession, EditorError, SaveOutcome, SaveTicket, SaveWriter,
    SessionState,
};
pub use popup::PopupCarousel;
pub use router::{LocationHost, MemoryHistory, NavigateOptions, PseudoRouter, SubscriptionId};
pub use scroll::{FragmentScroller, ScrollHost, ScrollOutcome};
pub use shell::PageShell;
pub use sink::{BannerPayload, ContentSink, DirectorySink, TickerPayload};
pub use storage::{FileBackend, KeyValueBackend, MemoryBackend, PersistentStore};
pub use theme::{derive_theme, ThemeRules};
pub use upload::{decode_data_url, encode_data_url, ImageUpload, UploadPolicy, UploadRejection};
pub use visibility::{crosses_threshold, RegionHandle, VisibilityTracker};
