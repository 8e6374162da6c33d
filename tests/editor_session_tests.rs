//! Integration tests for the content editor session against real storage
//! and a recording remote sink.

use std::sync::Arc;
use std::time::Duration;

use campus_view::config::Config;
use campus_view::constants::{DEFAULT_BANNER_IMAGES, DEFAULT_TICKER_LINES};
use campus_view::models::PersistedContent;
use campus_view::services::{
    Confirmation, ContentEditorSession, EditorError, ImageUpload, KeyValueBackend, MemoryBackend,
    PersistentStore, SaveOutcome, SessionState, UploadPolicy, UploadRejection,
};
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

fn session_in(dir: &TempDir) -> ContentEditorSession {
    ContentEditorSession::mount(
        PersistentStore::in_dir(dir.path().join("storage"), 0),
        UploadPolicy::default(),
        Duration::from_secs(2),
    )
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_fresh_storage_loads_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let session = session_in(&temp_dir);

    assert_eq!(session.state(), SessionState::Clean);
    assert_eq!(session.ticker_lines(), DEFAULT_TICKER_LINES);
    let sources: Vec<&str> = session.banners().iter().map(|b| b.source.as_str()).collect();
    assert_eq!(sources, DEFAULT_BANNER_IMAGES);
}

#[test]
fn test_corrupt_storage_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let storage = temp_dir.path().join("storage");
    std::fs::create_dir_all(&storage).unwrap();
    std::fs::write(storage.join("tickerItems.json"), "{not json").unwrap();

    let session = session_in(&temp_dir);
    assert_eq!(session.ticker_lines(), DEFAULT_TICKER_LINES);
}

#[test]
fn test_from_config_uses_configured_storage() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());

    let mut session = ContentEditorSession::from_config(&config).unwrap();
    session.set_ticker_lines(vec!["Configured".to_string()]);
    session.save().unwrap();

    let stored = PersistentStore::in_dir(temp_dir.path().join("storage"), 0).load_content();
    assert_eq!(stored.ticker_lines, vec!["Configured"]);
}

// ============================================================================
// Saving
// ============================================================================

#[test]
fn test_saved_edits_survive_a_new_session() {
    let temp_dir = TempDir::new().unwrap();

    let mut session = session_in(&temp_dir);
    session.update_ticker_line(0, "Sports day on Friday").unwrap();
    let index = session.add_ticker_line();
    session.update_ticker_line(index, "Library closed Monday").unwrap();
    session.add_image(&png_upload("fair.png", 64)).unwrap();
    assert!(session.is_dirty());

    let outcome = session.save().unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert_eq!(session.state(), SessionState::Clean);
    assert!(session.last_saved().is_some());

    let reopened = session_in(&temp_dir);
    assert_eq!(reopened.ticker_lines()[0], "Sports day on Friday");
    assert_eq!(reopened.ticker_lines().last().unwrap(), "Library closed Monday");
    assert_eq!(reopened.banners().len(), DEFAULT_BANNER_IMAGES.len() + 1);
    assert!(reopened.banners().last().unwrap().is_inline());
}

#[test]
fn test_ticker_edit_scenario_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(&temp_dir);
    session.set_ticker_lines(vec!["A".to_string(), "B".to_string()]);
    session.save().unwrap();

    assert_eq!(session.add_ticker_line(), 2);
    assert_eq!(session.ticker_lines(), ["A", "B", "New item..."]);
    session.update_ticker_line(2, "C").unwrap();
    assert_eq!(session.ticker_lines(), ["A", "B", "C"]);
    session.remove_ticker_line(0).unwrap();
    assert_eq!(session.ticker_lines(), ["B", "C"]);
    session.save().unwrap();

    let stored = PersistentStore::in_dir(temp_dir.path().join("storage"), 0);
    assert_eq!(stored.load("tickerItems", Vec::<String>::new()), ["B", "C"]);
}

#[test]
fn test_unsaved_edits_are_not_persisted() {
    let temp_dir = TempDir::new().unwrap();

    let mut session = session_in(&temp_dir);
    session.remove_ticker_line(0).unwrap();
    drop(session);

    assert_eq!(session_in(&temp_dir).ticker_lines(), DEFAULT_TICKER_LINES);
}

#[test]
fn test_save_mirrors_to_remote_sink() {
    let temp_dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::new(SinkBehavior::Accept));
    let mut session = session_in(&temp_dir).with_sink(sink.clone());

    session.set_ticker_lines(vec!["One".to_string(), "Two".to_string()]);
    session.save().unwrap();

    let tickers = sink.tickers();
    assert_eq!(tickers.len(), 1);
    assert_eq!(tickers[0].ticker_lines, vec!["One", "Two"]);
    assert_eq!(sink.banners()[0].banner_images, DEFAULT_BANNER_IMAGES);
}

#[test]
fn test_remote_failure_keeps_edits_dirty() {
    let temp_dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::new(SinkBehavior::Fail));
    let mut session = session_in(&temp_dir).with_sink(sink.clone());

    session.update_ticker_line(1, "Will retry").unwrap();
    let err = session.save().unwrap_err();
    assert!(matches!(err, EditorError::SaveFailed(ref msg) if msg.contains("unavailable")));
    assert_eq!(session.state(), SessionState::Dirty);
    assert_eq!(session.ticker_lines()[1], "Will retry");

    // Local storage was not touched
    assert_eq!(session_in(&temp_dir).ticker_lines(), DEFAULT_TICKER_LINES);

    sink.set_behavior(SinkBehavior::Accept);
    session.save().unwrap();
    assert_eq!(session.state(), SessionState::Clean);
    assert_eq!(session_in(&temp_dir).ticker_lines()[1], "Will retry");
}

#[test]
fn test_slow_remote_write_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::new(SinkBehavior::Slow(Duration::from_millis(500))));
    let mut session = ContentEditorSession::mount(
        PersistentStore::in_dir(temp_dir.path().join("storage"), 0),
        UploadPolicy::default(),
        Duration::from_millis(50),
    )
    .with_sink(sink);

    session.set_ticker_lines(vec!["Slow".to_string()]);
    let err = session.save().unwrap_err();
    assert!(err.to_string().contains("timed out"));
    assert_eq!(session.state(), SessionState::Dirty);
}

#[test]
fn test_edits_during_save_stay_dirty() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(&temp_dir);

    let ticket = session.begin_save().unwrap();
    assert_eq!(session.state(), SessionState::Saving);
    assert!(session.begin_save().is_none());
    assert!(matches!(session.save().unwrap(), SaveOutcome::AlreadySaving));

    session.update_ticker_line(0, "Typed while saving").unwrap();
    assert_eq!(session.state(), SessionState::Saving);

    let result = session.writer().write(&ticket);
    session.complete_save(ticket, result).unwrap();
    assert_eq!(session.state(), SessionState::Dirty);
    assert_eq!(session.persisted().ticker_lines, DEFAULT_TICKER_LINES);
}

#[test]
fn test_quota_exceeded_is_a_save_failure() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = ContentEditorSession::mount(
        PersistentStore::in_dir(temp_dir.path().join("storage"), 256),
        UploadPolicy::default(),
        Duration::from_secs(1),
    );

    session.add_image(&png_upload("huge.png", 4096)).unwrap();
    assert!(matches!(session.save(), Err(EditorError::SaveFailed(_))));
    assert!(session.is_dirty());
}

#[test]
fn test_failed_save_leaves_storage_untouched() {
    let backend = Arc::new(MemoryBackend::with_quota(300));
    let store = PersistentStore::new(backend.clone());
    let mut session =
        ContentEditorSession::mount(store.clone(), UploadPolicy::default(), Duration::from_secs(1));

    session.set_ticker_lines(vec!["NEW".to_string()]);
    session
        .set_banner_images(vec![format!("/images/{}.png", "x".repeat(400))])
        .unwrap();

    let err = session.save().unwrap_err();
    assert!(err.to_string().contains("popupImages"));
    assert_eq!(session.state(), SessionState::Dirty);

    // A reload sees what was there before the save, not half of the new content
    assert_eq!(store.load_content(), PersistedContent::defaults());
    assert_eq!(backend.get("tickerItems").unwrap(), None);
    let reloaded = ContentEditorSession::mount(store, UploadPolicy::default(), Duration::from_secs(1));
    assert_eq!(reloaded.ticker_lines(), DEFAULT_TICKER_LINES);
}

// ============================================================================
// Uploads
// ============================================================================

#[test]
fn test_rejected_upload_leaves_buffer_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = ContentEditorSession::mount(
        PersistentStore::in_dir(temp_dir.path().join("storage"), 0),
        UploadPolicy::new(100),
        Duration::from_secs(1),
    );

    let err = session.add_image(&png_upload("big.png", 101)).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Upload(UploadRejection::TooLarge { size: 101, max_bytes: 100 })
    ));
    assert_eq!(session.state(), SessionState::Clean);
    assert_eq!(session.banners().len(), DEFAULT_BANNER_IMAGES.len());
}

#[test]
fn test_text_file_upload_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(&temp_dir);
    let before = session.banners().to_vec();

    let notes = ImageUpload::new(b"meeting notes".to_vec(), "text/plain", "notes.txt");
    let err = session.add_image(&notes).unwrap_err();

    assert!(matches!(err, EditorError::Upload(UploadRejection::NotAnImage { .. })));
    assert_eq!(session.banners(), before.as_slice());
    assert_eq!(session.state(), SessionState::Clean);
}

#[test]
fn test_non_image_data_reference_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(&temp_dir);
    let before = session.banners().to_vec();

    let err = session
        .add_image_reference("data:text/plain;base64,aGVsbG8gd29ybGQ=")
        .unwrap_err();

    assert!(matches!(err, EditorError::Upload(UploadRejection::NotAnImage { .. })));
    assert_eq!(session.banners(), before.as_slice());
    assert_eq!(session.state(), SessionState::Clean);

    // Plain URLs are still accepted
    session.add_image_reference("/images/exam-schedule.png").unwrap();
    assert_eq!(session.banners().len(), before.len() + 1);
}

#[test]
fn test_replace_image_keeps_position() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(&temp_dir);

    let first = session.banners()[0].id;
    session.replace_image(first, &png_upload("new.png", 32)).unwrap();
    assert_eq!(session.banners()[0].id, first);
    assert_eq!(session.banners()[0].name, "new.png");
    assert!(session.banners()[0].source.starts_with("data:image/png;base64,"));
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_reset_requires_confirmation() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(&temp_dir);
    session.set_ticker_lines(vec!["Custom".to_string()]);
    session.save().unwrap();
    let storage = temp_dir.path().join("storage");
    assert!(storage.join("tickerItems.json").exists());
    assert!(storage.join("popupImages.json").exists());

    let err = session.reset_to_defaults(Confirmation::Declined).unwrap_err();
    assert_eq!(err, EditorError::ResetNotConfirmed);
    assert_eq!(session.ticker_lines(), ["Custom"]);

    session.reset_to_defaults(Confirmation::Confirmed).unwrap();
    assert!(!storage.join("tickerItems.json").exists());
    assert!(!storage.join("popupImages.json").exists());
    assert_eq!(session.ticker_lines(), DEFAULT_TICKER_LINES);
    assert_eq!(session.persisted(), &PersistedContent::defaults());
    assert_eq!(session_in(&temp_dir).ticker_lines(), DEFAULT_TICKER_LINES);
}

#[test]
fn test_config_defaults_match_upload_policy() {
    let config = Config::default();
    assert_eq!(config.uploads.max_bytes, UploadPolicy::default().max_bytes());
}
