//! Shared test fixtures for integration tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use campus_view::config::{Config, PathConfig};
use campus_view::services::{BannerPayload, ContentSink, ImageUpload, TickerPayload};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Smallest valid PNG header, padded to `size` bytes.
pub fn png_bytes(size: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(size.max(bytes.len()), 0);
    bytes
}

/// An in-memory PNG upload.
pub fn png_upload(name: &str, size: usize) -> ImageUpload {
    ImageUpload::new(png_bytes(size), "image/png", name)
}

/// Writes a PNG file into `dir` and returns its path.
pub fn write_png(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, png_bytes(size)).expect("Failed to write test image");
    path
}

/// Configuration keeping every path inside `root`.
pub fn test_config(root: &Path) -> Config {
    Config {
        paths: PathConfig {
            storage_dir: Some(root.join("storage")),
            remote_mirror_dir: None,
            contact_outbox: None,
        },
        ..Config::default()
    }
}

/// Writes `config.toml` into `config_dir`.
pub fn write_config(config_dir: &Path, config: &Config) {
    fs::create_dir_all(config_dir).expect("Failed to create config dir");
    let toml = toml::to_string_pretty(config).expect("Failed to serialize config");
    fs::write(config_dir.join("config.toml"), toml).expect("Failed to write config");
}

/// How a [`RecordingSink`] answers writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkBehavior {
    /// Accept every write
    Accept,
    /// Refuse every write
    Fail,
    /// Accept after sleeping
    Slow(Duration),
}

/// Content sink that records what it was given.
#[derive(Debug)]
pub struct RecordingSink {
    behavior: Mutex<SinkBehavior>,
    tickers: Mutex<Vec<TickerPayload>>,
    banners: Mutex<Vec<BannerPayload>>,
}

impl RecordingSink {
    pub fn new(behavior: SinkBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            tickers: Mutex::new(Vec::new()),
            banners: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behavior(&self, behavior: SinkBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn tickers(&self) -> Vec<TickerPayload> {
        self.tickers.lock().unwrap().clone()
    }

    pub fn banners(&self) -> Vec<BannerPayload> {
        self.banners.lock().unwrap().clone()
    }

    fn answer(&self) -> Result<(), String> {
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            SinkBehavior::Accept => Ok(()),
            SinkBehavior::Fail => Err("remote store unavailable".to_string()),
            SinkBehavior::Slow(delay) => {
                thread::sleep(delay);
                Ok(())
            }
        }
    }
}

impl ContentSink for RecordingSink {
    fn write_ticker(&self, payload: &TickerPayload) -> Result<(), String> {
        self.answer()?;
        self.tickers.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn write_banners(&self, payload: &BannerPayload) -> Result<(), String> {
        self.answer()?;
        self.banners.lock().unwrap().push(payload.clone());
        Ok(())
    }
}
