//! End-to-end tests for the content commands: `ticker`, `banner`, `content`,
//! `reset` and `theme`.

use std::path::Path;
use std::process::{Command, Output};

use campus_view::constants::{DEFAULT_BANNER_IMAGES, DEFAULT_TICKER_LINES};
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

fn campus_view_bin() -> String {
    std::env::var("CARGO_BIN_EXE_campus-view")
        .unwrap_or_else(|_| "target/release/campus-view".to_string())
}

fn run(args: &[&str], config_dir: &Path) -> Output {
    Command::new(campus_view_bin())
        .env("CAMPUS_VIEW_CONFIG_DIR", config_dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn run_ok(args: &[&str], config_dir: &Path) -> String {
    let output = run(args, config_dir);
    assert_eq!(
        output.status.code(),
        Some(0),
        "{:?} failed. stderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn ticker_json(config_dir: &Path) -> Vec<String> {
    serde_json::from_str(&run_ok(&["ticker", "list", "--json"], config_dir)).unwrap()
}

// ============================================================================
// Ticker
// ============================================================================

#[test]
fn test_ticker_list_defaults() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(ticker_json(temp_dir.path()), DEFAULT_TICKER_LINES);
}

#[test]
fn test_ticker_add_set_remove() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let out = run_ok(&["ticker", "add", "Annual day on 12th"], dir);
    assert!(out.contains("Added ticker line [4]"));
    assert!(out.contains("Saved at"));

    run_ok(&["ticker", "set", "0", "Admissions closing soon"], dir);
    let out = run_ok(&["ticker", "remove", "1"], dir);
    assert!(out.contains(DEFAULT_TICKER_LINES[1]));

    let lines = ticker_json(dir);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Admissions closing soon");
    assert_eq!(lines[3], "Annual day on 12th");
}

#[test]
fn test_ticker_add_without_text_uses_placeholder() {
    let temp_dir = TempDir::new().unwrap();
    run_ok(&["ticker", "add"], temp_dir.path());
    assert_eq!(ticker_json(temp_dir.path()).last().unwrap(), "New item...");
}

#[test]
fn test_ticker_set_out_of_range_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = run(&["ticker", "set", "9", "Nope"], temp_dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(ticker_json(temp_dir.path()), DEFAULT_TICKER_LINES);
}

// ============================================================================
// Banners
// ============================================================================

#[test]
fn test_banner_add_file_and_url() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let image = write_png(dir, "sports-day.png", 128);

    run_ok(&["banner", "add", image.to_str().unwrap()], dir);
    run_ok(&["banner", "add", "--url", "/images/exam-schedule.png"], dir);

    let banners: serde_json::Value =
        serde_json::from_str(&run_ok(&["banner", "list", "--json"], dir)).unwrap();
    let banners = banners.as_array().unwrap();
    assert_eq!(banners.len(), DEFAULT_BANNER_IMAGES.len() + 2);
    // Only the reference is persisted, so reloaded inline images get generated names
    assert_eq!(banners[2]["name"], "inline-image-3");
    assert!(banners[2]["source"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(banners[3]["source"], "/images/exam-schedule.png");
}

#[test]
fn test_banner_rejects_non_image() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let notes = dir.join("notes.txt");
    std::fs::write(&notes, "not an image").unwrap();

    let output = run(&["banner", "add", notes.to_str().unwrap()], dir);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Please select an image file"));
}

#[test]
fn test_banner_url_rejects_non_image_data() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let output = run(
        &["banner", "add", "--url", "data:text/plain;base64,aGVsbG8gd29ybGQ="],
        dir,
    );
    assert_eq!(output.status.code(), Some(1));

    let banners: serde_json::Value =
        serde_json::from_str(&run_ok(&["banner", "list", "--json"], dir)).unwrap();
    assert_eq!(banners.as_array().unwrap().len(), DEFAULT_BANNER_IMAGES.len());
    assert!(!dir.join("storage/popupImages.json").exists());
}

#[test]
fn test_banner_rejects_oversized_image() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let mut config = test_config(dir);
    config.uploads.max_bytes = 64;
    write_config(dir, &config);
    let image = write_png(dir, "poster.png", 65);

    let output = run(&["banner", "add", image.to_str().unwrap()], dir);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("maximum limit of 64 bytes"));
}

#[test]
fn test_banner_remove_and_replace_by_index() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let image = write_png(dir, "replacement.png", 64);

    run_ok(&["banner", "replace", "1", image.to_str().unwrap()], dir);
    run_ok(&["banner", "remove", "0"], dir);

    let banners: serde_json::Value =
        serde_json::from_str(&run_ok(&["banner", "list", "--json"], dir)).unwrap();
    let banners = banners.as_array().unwrap();
    assert_eq!(banners.len(), 1);
    assert!(banners[0]["source"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    let output = run(&["banner", "remove", "5"], dir);
    assert_eq!(output.status.code(), Some(1));
}

// ============================================================================
// Content, reset and theme
// ============================================================================

#[test]
fn test_content_show_json() {
    let temp_dir = TempDir::new().unwrap();
    let content: serde_json::Value =
        serde_json::from_str(&run_ok(&["content", "show", "--json"], temp_dir.path())).unwrap();

    assert_eq!(content["state"], "clean");
    assert_eq!(content["tickerLines"].as_array().unwrap().len(), 4);
    assert_eq!(content["bannerImages"][0]["inline"], false);
}

#[test]
fn test_reset_requires_yes() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    run_ok(&["ticker", "remove", "0"], dir);

    let output = run(&["reset"], dir);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--yes"));
    assert_eq!(ticker_json(dir).len(), 3);

    run_ok(&["reset", "--yes"], dir);
    assert_eq!(ticker_json(dir), DEFAULT_TICKER_LINES);
}

#[test]
fn test_theme_derivation() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    assert_eq!(run_ok(&["theme"], dir).trim(), "dark");
    assert_eq!(run_ok(&["theme", "--visible", "contact"], dir).trim(), "light");
    assert_eq!(
        run_ok(&["theme", "--visible", "contact,testimonials"], dir).trim(),
        "dark"
    );

    let output = run(&["theme", "--visible", "cafeteria"], dir);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_saves_are_mirrored_when_configured() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let mirror = dir.join("mirror");
    let mut config = test_config(dir);
    config.paths.remote_mirror_dir = Some(mirror.clone());
    write_config(dir, &config);

    run_ok(&["ticker", "set", "2", "Call us"], dir);

    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(mirror.join("ticker.json")).unwrap())
            .unwrap();
    assert_eq!(payload["tickerLines"][2], "Call us");
    assert!(mirror.join("banners.json").exists());
}
