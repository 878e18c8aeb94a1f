//! Remote failure classification
//!
//! The Gemini API reports credential problems only through its error text,
//! so this adapter is the one place that matches on message substrings.
//! Everything downstream works with [`FailureKind`].

use crate::error::Error;

use super::messages::Message;

/// Marker for a model that does not exist for this key
const MODEL_NOT_FOUND_MARKER: &str = "Requested entity was not found.";

/// Markers for a rejected key, matched case-sensitively
const KEY_REJECTED_MARKERS: &[&str] = &["API_KEY_INVALID", "API key not valid"];

/// Markers for a permission failure, matched on lowercased text
const PERMISSION_MARKERS: &[&str] = &["permission denied", "permission_denied"];

/// Why a credential was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialIssue {
    /// The key cannot see the model (often an invalid or restricted key)
    ModelNotFound,
    /// The key is invalid or lacks permission
    KeyRejected,
}

/// Structured kind of a failed restoration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidCredential(CredentialIssue),
    ModelRefusal,
    Unclassified,
}

/// A failure with its kind and the original detail text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl ClassifiedFailure {
    /// Credential selection should follow this failure
    pub fn requires_credential(&self) -> bool {
        matches!(self.kind, FailureKind::InvalidCredential(_))
    }

    /// Status line message for this failure
    pub fn message(&self) -> Message {
        match self.kind {
            FailureKind::InvalidCredential(CredentialIssue::ModelNotFound) => Message::ModelNotFound,
            FailureKind::InvalidCredential(CredentialIssue::KeyRejected) => Message::InvalidApiKey,
            FailureKind::ModelRefusal => Message::ModelRefused,
            FailureKind::Unclassified => Message::Failure(self.detail.clone()),
        }
    }

    pub fn into_error(self) -> Error {
        match self.kind {
            FailureKind::InvalidCredential(_) => Error::InvalidCredential(self.detail),
            FailureKind::ModelRefusal => Error::ModelRefusal(self.detail),
            FailureKind::Unclassified => Error::Unclassified(self.detail),
        }
    }
}

/// Look for credential markers in a remote error message
pub fn classify_message(text: &str) -> Option<CredentialIssue> {
    if text.contains(MODEL_NOT_FOUND_MARKER) {
        return Some(CredentialIssue::ModelNotFound);
    }

    let lowered = text.to_lowercase();
    if KEY_REJECTED_MARKERS.iter().any(|m| text.contains(m))
        || PERMISSION_MARKERS.iter().any(|m| lowered.contains(m))
    {
        return Some(CredentialIssue::KeyRejected);
    }

    None
}

/// Classify any error raised by a restoration attempt
pub fn classify(error: Error) -> ClassifiedFailure {
    match error {
        Error::ModelRefusal(detail) => ClassifiedFailure {
            kind: FailureKind::ModelRefusal,
            detail,
        },
        Error::InvalidCredential(detail) => ClassifiedFailure {
            kind: FailureKind::InvalidCredential(
                classify_message(&detail).unwrap_or(CredentialIssue::KeyRejected),
            ),
            detail,
        },
        other => {
            let detail = match other {
                Error::Unclassified(text) | Error::RemoteApi(text) => text,
                other => other.to_string(),
            };
            let kind = classify_message(&detail)
                .map(FailureKind::InvalidCredential)
                .unwrap_or(FailureKind::Unclassified);
            ClassifiedFailure { kind, detail }
        }
    }
}
