//! External capabilities the controller depends on

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::image::{GeminiClient, RestorationRequest, RestoredImage};

/// Remote image restoration
#[async_trait]
pub trait ImageRestorer: Send + Sync {
    /// Restore the photo in `request`, authorized by `credential`
    async fn restore_image(
        &self,
        request: &RestorationRequest,
        credential: &str,
    ) -> Result<RestoredImage>;
}

/// Host dialog that lets the user pick a credential
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// Show the dialog
    ///
    /// Returns the chosen credential, `None` if the user dismissed it, or
    /// [`Error::CredentialDialogUnavailable`] when the host has no dialog.
    async fn open_credential_dialog(&self) -> Result<Option<String>>;
}

#[async_trait]
impl ImageRestorer for GeminiClient {
    async fn restore_image(
        &self,
        request: &RestorationRequest,
        credential: &str,
    ) -> Result<RestoredImage> {
        self.restore(request, credential).await
    }
}

#[async_trait]
impl<T: ImageRestorer + ?Sized> ImageRestorer for Arc<T> {
    async fn restore_image(
        &self,
        request: &RestorationRequest,
        credential: &str,
    ) -> Result<RestoredImage> {
        (**self).restore_image(request, credential).await
    }
}

#[async_trait]
impl<T: CredentialPrompt + ?Sized> CredentialPrompt for Arc<T> {
    async fn open_credential_dialog(&self) -> Result<Option<String>> {
        (**self).open_credential_dialog().await
    }
}

/// Host without a credential dialog
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentialDialog;

#[async_trait]
impl CredentialPrompt for NoCredentialDialog {
    async fn open_credential_dialog(&self) -> Result<Option<String>> {
        Err(Error::CredentialDialogUnavailable)
    }
}
