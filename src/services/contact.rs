//! Contact form delivery.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::{ContactField, ContactSubmission};

/// Remote form sink accepting contact submissions.
pub trait FormSink: Send + Sync {
    /// Delivers one submission.
    fn submit(&self, form: &ContactSubmission) -> Result<(), String>;
}

/// Sink that only records submissions in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl FormSink for LogSink {
    fn submit(&self, form: &ContactSubmission) -> Result<(), String> {
        info!("Contact form submitted by {} <{}>", form.name, form.email);
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboxEntry<'a> {
    received_at: DateTime<Utc>,
    #[serde(flatten)]
    form: &'a ContactSubmission,
}

/// Sink appending one JSON object per line to an outbox file.
#[derive(Debug, Clone)]
pub struct OutboxSink {
    path: PathBuf,
}

impl OutboxSink {
    /// Creates a sink appending to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Outbox file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, form: &ContactSubmission) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create outbox directory: {}", parent.display()))?;
        }

        let line = serde_json::to_string(&OutboxEntry {
            received_at: Utc::now(),
            form,
        })
        .context("Failed to serialize submission")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("Failed to open outbox: {}", self.path.display()))?;
        writeln!(file, "{line}").context("Failed to append to outbox")?;
        Ok(())
    }
}

impl FormSink for OutboxSink {
    fn submit(&self, form: &ContactSubmission) -> Result<(), String> {
        self.append(form).map_err(|e| format!("{e:#}"))
    }
}

/// Contact submission failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// Required fields were blank
    MissingFields(Vec<ContactField>),
    /// The form sink refused or failed
    Delivery(String),
}

impl fmt::Display for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields(fields) => {
                let messages: Vec<String> = fields.iter().map(ToString::to_string).collect();
                write!(f, "{}", messages.join("; "))
            }
            Self::Delivery(message) => write!(f, "Failed to send message: {message}"),
        }
    }
}

impl std::error::Error for ContactError {}

/// Checks required fields and hands the form to `sink`.
pub fn submit_contact(form: &ContactSubmission, sink: &dyn FormSink) -> Result<(), ContactError> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        return Err(ContactError::MissingFields(missing));
    }
    sink.submit(form).map_err(ContactError::Delivery)
}
