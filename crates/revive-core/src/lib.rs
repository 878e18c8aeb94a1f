//! Revive Core Library
//!
//! This crate provides the core functionality for Revive, including:
//! - Restoration controller (file intake, restore, download) and its view model
//! - Error taxonomy and the remote-failure classification adapter
//! - Gemini image client (image + prompt + strength in, restored image out)
//! - Configuration with environment-only API keys
//! - Health checks shared by the CLI and the web host

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod image;
pub mod restoration;

pub use error::{Error, Result};


/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::restoration::{
        CredentialPrompt, FileUpload, ImageRestorer, RestorationController, RestorationState,
    };
}
