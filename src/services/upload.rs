//! Banner image upload validation and inline encoding.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::models::BannerImage;

/// Raw upload as delivered by a file picker or drop surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File contents
    pub bytes: Vec<u8>,
    /// Declared MIME type (may be empty)
    pub mime_type: String,
    /// Original file name
    pub file_name: String,
}

impl ImageUpload {
    /// Creates an upload from its three parts.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Reads a local file, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).context(format!("Failed to read image: {}", path.display()))?;
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(bytes, mime_type, file_name))
    }

    /// Declared MIME type, or one guessed from the file name when none was given.
    pub fn effective_mime_type(&self) -> String {
        let declared = self.mime_type.trim();
        if !declared.is_empty() {
            return declared.to_ascii_lowercase();
        }
        mime_guess::from_path(&self.file_name)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default()
    }
}

/// Why an upload was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    /// No bytes were supplied
    Empty,
    /// The MIME type is not `image/*`
    NotAnImage {
        /// The offending type (empty when unknown)
        mime_type: String,
    },
    /// The file exceeds the configured maximum
    TooLarge {
        /// Upload size in bytes
        size: u64,
        /// Maximum accepted size in bytes
        max_bytes: u64,
    },
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "The selected file is empty."),
            Self::NotAnImage { mime_type } if mime_type.is_empty() => {
                write!(f, "Please select an image file.")
            }
            Self::NotAnImage { mime_type } => {
                write!(f, "Please select an image file ('{mime_type}' is not an image).")
            }
            Self::TooLarge { max_bytes, .. } => write!(
                f,
                "File size exceeds the maximum limit of {}.",
                format_size(*max_bytes)
            ),
        }
    }
}

impl std::error::Error for UploadRejection {}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Validation rules for banner uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    max_bytes: u64,
}

impl UploadPolicy {
    /// Accepts images up to `max_bytes`.
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Maximum accepted size in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks an upload, returning its resolved MIME type.
    pub fn validate(&self, upload: &ImageUpload) -> Result<String, UploadRejection> {
        if upload.bytes.is_empty() {
            return Err(UploadRejection::Empty);
        }

        let mime_type = upload.effective_mime_type();
        if !mime_type.starts_with("image/") {
            return Err(UploadRejection::NotAnImage { mime_type });
        }

        let size = upload.bytes.len() as u64;
        if size > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                size,
                max_bytes: self.max_bytes,
            });
        }

        Ok(mime_type)
    }

    /// Checks a stored banner reference.
    ///
    /// Plain URLs only need to be non-empty; inline `data:` URLs are decoded
    /// and validated like an upload.
    pub fn validate_reference(&self, source: &str) -> Result<(), UploadRejection> {
        if source.trim().is_empty() {
            return Err(UploadRejection::Empty);
        }
        match decode_data_url(source) {
            Some(upload) => self.validate(&upload).map(|_| ()),
            None if source.starts_with("data:") => Err(UploadRejection::NotAnImage {
                mime_type: String::new(),
            }),
            None => Ok(()),
        }
    }

    /// Validates an upload and turns it into an inline banner.
    pub fn accept(&self, upload: &ImageUpload) -> Result<BannerImage, UploadRejection> {
        let mime_type = self.validate(upload)?;
        let name = if upload.file_name.trim().is_empty() {
            "uploaded-image".to_string()
        } else {
            upload.file_name.clone()
        };
        Ok(BannerImage::new(name, encode_data_url(&mime_type, &upload.bytes)))
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(2 * 1024 * 1024)
    }
}

/// Encodes bytes as an embeddable `data:` URL.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Decodes a base64 `data:` URL back into an upload.
///
/// Returns `None` for anything that is not a well-formed base64 data URL.
pub fn decode_data_url(source: &str) -> Option<ImageUpload> {
    let rest = source.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some(ImageUpload::new(bytes, mime_type, ""))
}
