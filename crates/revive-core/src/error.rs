//! Error types for Revive

use thiserror::Error;

/// Result type alias using Revive's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Revive error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Intake errors (E001-E099)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No image selected. Upload a photo before restoring.")]
    MissingInput,

    // Credential errors (E100-E199)
    #[error("API key is not configured. Set GEMINI_API_KEY or API_KEY.")]
    MissingCredential,

    #[error("API key rejected: {0}")]
    InvalidCredential(String),

    #[error("Credential selection dialog is unavailable in this environment")]
    CredentialDialogUnavailable,

    // Remote errors (E200-E299)
    #[error("Model returned no image: {0}")]
    ModelRefusal(String),

    #[error("{0}")]
    Unclassified(String),

    #[error("{0}")]
    RemoteApi(String),

    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    // Controller errors (E300-E399)
    #[error("A restoration is already in progress")]
    RestorationInProgress,

    #[error("No restoration is in progress")]
    NoRestorationInProgress,

    // File errors (E400-E499)
    #[error("Failed to read image: {0}")]
    ImageReadError(String),

    #[error("Failed to save image: {0}")]
    ImageSaveError(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E001",
            Self::MissingInput => "E002",
            Self::MissingCredential => "E100",
            Self::InvalidCredential(_) => "E101",
            Self::CredentialDialogUnavailable => "E102",
            Self::ModelRefusal(_) => "E200",
            Self::Unclassified(_) => "E201",
            Self::RemoteApi(_) => "E202",
            Self::NetworkError(_) => "E203",
            Self::RestorationInProgress => "E300",
            Self::NoRestorationInProgress => "E301",
            Self::ImageReadError(_) => "E400",
            Self::ImageSaveError(_) => "E401",
            Self::ConfigError(_) => "E600",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MissingCredential | Self::CredentialDialogUnavailable => {
                Some("export GEMINI_API_KEY=<your key>".to_string())
            }
            Self::InvalidCredential(_) => Some("revive doctor".to_string()),
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::ConfigError(_) => Some("revive config list".to_string()),
            _ => None,
        }
    }

    /// Whether the credential-selection flow should follow this error
    pub fn requires_credential(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::InvalidCredential(_))
    }
}
