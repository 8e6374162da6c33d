//! Remote content sink: the optional write path mirroring saved content.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Ticker write payload (`{ "tickerLines": [...] }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerPayload {
    /// Ordered ticker lines
    pub ticker_lines: Vec<String>,
}

/// Banner write payload (`{ "bannerImages": [...] }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerPayload {
    /// Ordered banner image references
    pub banner_images: Vec<String>,
}

/// Remote store accepting saved content.
///
/// Errors are plain messages; the editor session surfaces them as save
/// failures.
pub trait ContentSink: Send + Sync {
    /// Writes the ticker lines.
    fn write_ticker(&self, payload: &TickerPayload) -> Result<(), String>;

    /// Writes the banner images.
    fn write_banners(&self, payload: &BannerPayload) -> Result<(), String>;
}

/// Sink writing `ticker.json` and `banners.json` into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates a sink for `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_json<T: Serialize>(&self, file_name: &str, payload: &T) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir).context(format!(
            "Failed to create mirror directory: {}",
            self.dir.display()
        ))?;

        let path = self.dir.join(file_name);
        let json = serde_json::to_string_pretty(payload).context("Failed to serialize payload")?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .context(format!("Failed to write temp file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .context(format!("Failed to rename temp file to: {}", path.display()))?;
        Ok(())
    }
}

impl ContentSink for DirectorySink {
    fn write_ticker(&self, payload: &TickerPayload) -> Result<(), String> {
        self.write_json("ticker.json", payload)
            .map_err(|e| format!("{e:#}"))
    }

    fn write_banners(&self, payload: &BannerPayload) -> Result<(), String> {
        self.write_json("banners.json", payload)
            .map_err(|e| format!("{e:#}"))
    }
}
