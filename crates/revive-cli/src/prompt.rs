//! Terminal credential dialog

use std::io::IsTerminal;

use async_trait::async_trait;
use revive_core::restoration::CredentialPrompt;
use revive_core::{Error, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Asks for a Gemini API key on the terminal
///
/// Unavailable when stdin is not a terminal, so scripted runs fail fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalCredentialPrompt;

#[async_trait]
impl CredentialPrompt for TerminalCredentialPrompt {
    async fn open_credential_dialog(&self) -> Result<Option<String>> {
        if !std::io::stdin().is_terminal() {
            return Err(Error::CredentialDialogUnavailable);
        }

        tokio::task::spawn_blocking(read_key)
            .await
            .map_err(|e| Error::Other(format!("Credential prompt failed: {}", e)))?
    }
}

fn read_key() -> Result<Option<String>> {
    let mut editor = DefaultEditor::new().map_err(|_| Error::CredentialDialogUnavailable)?;

    match editor.readline("Gemini API key (empty to cancel): ") {
        Ok(line) if line.trim().is_empty() => Ok(None),
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(Error::Other(format!("Credential prompt failed: {}", e))),
    }
}
