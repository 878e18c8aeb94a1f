//! Restoration controller
//!
//! Owns the selected photo, the credential, the state machine and the view
//! model. All user actions go through its methods.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::image::{DEFAULT_MODEL_ID, RestorationRequest, RestoredImage, Strength};

use super::capability::{CredentialPrompt, ImageRestorer};
use super::classify::classify;
use super::messages::{Locale, Message};
use super::selection::{FileUpload, SelectedFile};
use super::state::RestorationState;
use super::view::ViewState;

/// Settings fixed for the lifetime of a controller
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub model: String,
    pub locale: Locale,
    pub strength: Strength,
    pub download_file_name: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_ID.to_string(),
            locale: Locale::default(),
            strength: Strength::default(),
            download_file_name: "restored_image.png".to_string(),
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.restoration.model.clone(),
            locale: config.ui.locale,
            strength: config.restoration.strength(),
            download_file_name: config.restoration.download_file_name.clone(),
        }
    }
}

/// An attempt that passed its preconditions and awaits the remote call
pub struct PendingRestoration {
    pub attempt_id: Uuid,
    pub request: RestorationRequest,
    credential: Zeroizing<String>,
}

impl std::fmt::Debug for PendingRestoration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRestoration")
            .field("attempt_id", &self.attempt_id)
            .field("model", &self.request.model)
            .field("strength", &self.request.strength)
            .finish()
    }
}

impl PendingRestoration {
    /// Invoke the restoration capability
    pub async fn run<R: ImageRestorer + ?Sized>(&self, restorer: &R) -> Result<RestoredImage> {
        restorer.restore_image(&self.request, &self.credential).await
    }
}

/// Restored image packaged for saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    /// Write into `dir` under the fixed file name
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        self.save_as(&path)?;
        Ok(path)
    }

    /// Write to an explicit path
    pub fn save_as(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::ImageSaveError(format!("Failed to create directory: {}", e)))?;
        }
        std::fs::write(path, &self.bytes)
            .map_err(|e| Error::ImageSaveError(format!("{}: {}", path.display(), e)))
    }
}

/// Orchestrates intake, restoration and download
pub struct RestorationController<R, P> {
    restorer: Arc<R>,
    prompt: P,
    credential: Option<Zeroizing<String>>,
    selected: Option<SelectedFile>,
    restored: Option<RestoredImage>,
    state: RestorationState,
    view: ViewState,
    strength: Strength,
    options: ControllerOptions,
}

impl<R, P> std::fmt::Debug for RestorationController<R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestorationController")
            .field("state", &self.state)
            .field("has_credential", &self.credential.is_some())
            .field("has_selection", &self.selected.is_some())
            .field("strength", &self.strength)
            .finish()
    }
}

impl<R: ImageRestorer, P: CredentialPrompt> RestorationController<R, P> {
    pub fn new(restorer: R, prompt: P, options: ControllerOptions) -> Self {
        Self::with_shared_restorer(Arc::new(restorer), prompt, options)
    }

    pub fn with_shared_restorer(restorer: Arc<R>, prompt: P, options: ControllerOptions) -> Self {
        let strength = options.strength;
        Self {
            restorer,
            prompt,
            credential: None,
            selected: None,
            restored: None,
            state: RestorationState::Idle,
            view: ViewState::new(strength.value()),
            strength,
            options,
        }
    }

    /// Start with a credential already known, e.g. from the environment
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        if let Some(value) = credential {
            self.set_credential(value);
        }
        self
    }

    /// Store a credential; blank values are ignored
    pub fn set_credential(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        self.credential = Some(Zeroizing::new(value.trim().to_string()));
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn state(&self) -> RestorationState {
        self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn restored_image(&self) -> Option<&RestoredImage> {
        self.restored.as_ref()
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    pub fn locale(&self) -> Locale {
        self.options.locale
    }

    pub fn restorer(&self) -> Arc<R> {
        Arc::clone(&self.restorer)
    }

    /// Move the slider; out-of-range values are clamped
    pub fn set_strength(&mut self, value: i64) -> Strength {
        self.strength = Strength::new(value);
        self.view.strength = self.strength.value();
        self.strength
    }

    /// Take a new photo
    pub fn accept_file(&mut self, upload: FileUpload) -> Result<()> {
        if self.state.is_busy() {
            self.show_error(Message::RestorationInProgress);
            return Err(Error::RestorationInProgress);
        }

        let selected = match SelectedFile::from_upload(upload) {
            Ok(selected) => selected,
            Err(e) => {
                warn!(error = %e, "Rejected upload");
                self.show_error(Message::InvalidFile);
                return Err(e);
            }
        };

        info!(
            mime_type = %selected.mime_type(),
            size_bytes = selected.bytes().len(),
            file_name = selected.file_name().unwrap_or("-"),
            "Photo selected"
        );

        self.view.original_preview = Some(selected.preview_data_uri());
        self.selected = Some(selected);
        self.restored = None;
        self.view.restored_image = None;
        self.view.restored_placeholder_visible = true;
        self.view.restore_enabled = true;
        self.view.download_enabled = false;
        self.show_info(Message::FileReady);
        self.transition(RestorationState::FileSelected);
        Ok(())
    }

    /// Run one restoration attempt end to end
    pub async fn restore(&mut self) -> Result<RestoredImage> {
        let pending = self.begin_restore().await?;
        let outcome = pending.run(self.restorer.as_ref()).await;
        self.finish_restore(outcome).await
    }

    /// Check preconditions and enter `Restoring`
    ///
    /// Hosts that share the controller behind a lock call this, release the
    /// lock for [`PendingRestoration::run`], then call
    /// [`finish_restore`](Self::finish_restore).
    pub async fn begin_restore(&mut self) -> Result<PendingRestoration> {
        if self.state.is_busy() {
            warn!("Rejected overlapping restoration");
            return Err(Error::RestorationInProgress);
        }

        if self.selected.is_none() {
            self.show_error(Message::NoFileSelected);
            return Err(Error::MissingInput);
        }

        let Some(credential) = self.credential.clone() else {
            self.show_error(Message::MissingCredential);
            self.request_credential().await;
            return Err(Error::MissingCredential);
        };

        let Some(selected) = self.selected.as_ref() else {
            return Err(Error::MissingInput);
        };
        let request = RestorationRequest::new(selected.base64(), selected.mime_type(), self.strength)
            .with_model(self.options.model.clone())
            .with_locale(self.options.locale);

        let attempt_id = Uuid::new_v4();
        info!(
            attempt_id = %attempt_id,
            model = %request.model,
            mime_type = %request.mime_type,
            strength = request.strength.value(),
            "Restoring photo"
        );

        self.show_info(Message::Restoring);
        self.restored = None;
        self.view.restored_image = None;
        self.view.restored_placeholder_visible = false;
        self.view.busy = true;
        self.view.download_enabled = false;
        self.view.set_controls_enabled(false);
        self.transition(RestorationState::Restoring);

        Ok(PendingRestoration {
            attempt_id,
            request,
            credential,
        })
    }

    /// Record the outcome of an attempt and restore interactivity
    ///
    /// Fails with [`Error::NoRestorationInProgress`] unless an attempt
    /// started by [`begin_restore`](Self::begin_restore) is pending.
    pub async fn finish_restore(
        &mut self,
        outcome: Result<RestoredImage>,
    ) -> Result<RestoredImage> {
        if !self.state.is_busy() {
            warn!(state = %self.state, "Outcome without a restoration in progress");
            return Err(Error::NoRestorationInProgress);
        }

        let result = match outcome {
            Ok(image) => {
                info!(
                    model = %image.model_used,
                    time_ms = image.generation_time_ms,
                    size_bytes = image.size_bytes(),
                    "Photo restored"
                );
                self.view.restored_image = Some(image.data_uri.clone());
                self.view.restored_placeholder_visible = false;
                self.view.download_enabled = true;
                self.restored = Some(image.clone());
                self.show_success(Message::RestoreSucceeded);
                self.transition(RestorationState::Done);
                Ok(image)
            }
            Err(e) => {
                let failure = classify(e);
                error!(kind = ?failure.kind, detail = %failure.detail, "Restoration failed");
                self.show_error(failure.message());
                self.view.restored_placeholder_visible = true;
                self.transition(RestorationState::Error);
                Err(failure)
            }
        };

        self.view.busy = false;
        self.view.set_controls_enabled(true);

        match result {
            Ok(image) => Ok(image),
            Err(failure) => {
                if failure.requires_credential() {
                    self.request_credential().await;
                }
                Err(failure.into_error())
            }
        }
    }

    /// Package the restored image, if any
    pub fn download(&self) -> Option<DownloadArtifact> {
        let image = self.restored.as_ref()?;
        Some(DownloadArtifact {
            file_name: self.options.download_file_name.clone(),
            mime_type: image.mime_type.clone(),
            bytes: image.bytes.clone(),
        })
    }

    async fn request_credential(&mut self) {
        match self.prompt.open_credential_dialog().await {
            Ok(Some(credential)) => {
                info!("Credential selected");
                self.set_credential(credential);
            }
            Ok(None) => debug!("Credential dialog dismissed"),
            Err(Error::CredentialDialogUnavailable) => {
                self.show_error(Message::CredentialDialogUnavailable);
            }
            Err(e) => {
                warn!(error = %e, "Credential dialog failed");
                self.show_error(Message::CredentialDialogUnavailable);
            }
        }
    }

    fn transition(&mut self, next: RestorationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    fn show_info(&mut self, message: Message) {
        let text = message.render(self.options.locale);
        self.view.show_info(text);
    }

    fn show_success(&mut self, message: Message) {
        let text = message.render(self.options.locale);
        self.view.show_success(text);
    }

    fn show_error(&mut self, message: Message) {
        let text = message.render(self.options.locale);
        self.view.show_error(text);
    }
}
