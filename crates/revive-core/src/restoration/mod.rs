//! Restoration workflow
//!
//! A single controller binds the page controls to two external
//! capabilities (credential selection, image restoration) and walks the
//! `idle -> file_selected -> restoring -> done | error` state machine.

pub mod classify;
mod capability;
mod controller;
mod messages;
mod selection;
mod state;
mod view;

pub use capability::{CredentialPrompt, ImageRestorer, NoCredentialDialog};
pub use classify::{ClassifiedFailure, CredentialIssue, FailureKind};
pub use controller::{
    ControllerOptions, DownloadArtifact, PendingRestoration, RestorationController,
};
pub use messages::{Locale, Message};
pub use selection::{FileUpload, SelectedFile};
pub use state::RestorationState;
pub use view::{StatusKind, StatusLine, ViewState};
