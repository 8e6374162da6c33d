//! Contact form submission.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A contact form submission forwarded to the remote form sink.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactSubmission {
    /// Sender name (required)
    #[serde(default)]
    pub name: String,
    /// Phone number (optional)
    #[serde(default)]
    pub phone: String,
    /// Email address (required)
    #[serde(default)]
    pub email: String,
    /// Message body (required)
    #[serde(default)]
    pub message: String,
}

/// Form fields that can fail the presence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    /// `name`
    Name,
    /// `email`
    Email,
    /// `message`
    Message,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "Name is required"),
            Self::Email => write!(f, "Email is required"),
            Self::Message => write!(f, "Message is required"),
        }
    }
}

impl ContactSubmission {
    /// Returns the required fields that are blank, in form order.
    pub fn missing_fields(&self) -> Vec<ContactField> {
        [
            (ContactField::Name, &self.name),
            (ContactField::Email, &self.email),
            (ContactField::Message, &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}
