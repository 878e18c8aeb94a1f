//! Restore command
//!
//! Runs one restoration attempt for a photo on disk and writes the result.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::image::GeminiClient;
use crate::restoration::{
    ControllerOptions, CredentialPrompt, FileUpload, ImageRestorer, Locale, Message,
    RestorationController, StatusKind,
};

/// Options for a single restore run
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    pub output: Option<PathBuf>,
    pub strength: Option<i64>,
    pub model: Option<String>,
}

/// Outcome of a restore run
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    pub output_path: PathBuf,
    pub status: String,
    pub size_bytes: usize,
    pub generation_time_ms: u64,
}

/// A failed restore run with the status line shown to the user
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RestoreFailure {
    pub error: Error,
    /// Localized status text describing the failure
    pub status: String,
}

impl RestoreFailure {
    /// Failure raised outside the controller, rendered as a generic error
    fn unattended(error: Error, locale: Locale) -> Self {
        let status = Message::Failure(error.to_string()).render(locale);
        Self { error, status }
    }

    /// Failure raised while the controller was driving the run
    fn from_controller<R: ImageRestorer, P: CredentialPrompt>(
        controller: &RestorationController<R, P>,
        error: Error,
    ) -> Self {
        let view = controller.view();
        if view.status.kind == StatusKind::Error && !view.status.text.is_empty() {
            Self {
                error,
                status: view.status.text.clone(),
            }
        } else {
            Self::unattended(error, controller.locale())
        }
    }
}

/// Restore a photo with the Gemini client built from `config`
pub async fn restore_file<P: CredentialPrompt>(
    config: &Config,
    prompt: P,
    input: &Path,
    options: RestoreOptions,
) -> std::result::Result<RestoreOutcome, RestoreFailure> {
    let locale = config.ui.locale;
    let client = GeminiClient::from_config(&config.restoration)
        .map_err(|e| RestoreFailure::unattended(e, locale))?;
    let api_key = config
        .restoration
        .resolved_api_key()
        .map_err(|e| RestoreFailure::unattended(Error::ConfigError(e.to_string()), locale))?;
    restore_with(client, prompt, api_key, config, input, options).await
}

/// Restore a photo with an explicit restorer and credential
pub async fn restore_with<R: ImageRestorer, P: CredentialPrompt>(
    restorer: R,
    prompt: P,
    credential: Option<String>,
    config: &Config,
    input: &Path,
    options: RestoreOptions,
) -> std::result::Result<RestoreOutcome, RestoreFailure> {
    let mut controller_options = ControllerOptions::from_config(config);
    if let Some(model) = options.model.clone() {
        controller_options.model = model;
    }

    let mut controller =
        RestorationController::new(restorer, prompt, controller_options).with_credential(credential);

    if let Some(strength) = options.strength {
        controller.set_strength(strength);
    }

    run(&mut controller, input, options.output)
        .await
        .map_err(|e| RestoreFailure::from_controller(&controller, e))
}

async fn run<R: ImageRestorer, P: CredentialPrompt>(
    controller: &mut RestorationController<R, P>,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<RestoreOutcome> {
    let upload = FileUpload::from_path(input).await?;
    controller.accept_file(upload)?;

    // A key picked in the dialog is used for one more attempt
    let image = match controller.restore().await {
        Err(Error::MissingCredential) if controller.has_credential() => {
            controller.restore().await?
        }
        outcome => outcome?,
    };

    let Some(artifact) = controller.download() else {
        return Err(Error::Other("Restored image is unavailable".to_string()));
    };

    let output_path = match output {
        Some(path) => {
            artifact.save_as(&path)?;
            path
        }
        None => artifact.save_into(default_output_dir(input))?,
    };

    info!(
        output = %output_path.display(),
        size_bytes = image.size_bytes(),
        time_ms = image.generation_time_ms,
        "Saved restored photo"
    );

    Ok(RestoreOutcome {
        output_path,
        status: controller.view().status.text.clone(),
        size_bytes: image.size_bytes(),
        generation_time_ms: image.generation_time_ms,
    })
}

/// Directory of the input photo, or the working directory
fn default_output_dir(input: &Path) -> &Path {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
