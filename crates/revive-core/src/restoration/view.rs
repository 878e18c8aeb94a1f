//! View model for the restoration page
//!
//! Holds everything a front end needs to draw the page, so the controller
//! can be exercised without a rendering surface.

use serde::{Deserialize, Serialize};

/// Tone of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Info,
    Success,
    Error,
}

/// Status line shown under the controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub status: StatusLine,
    /// Original photo as a `data:` URI
    pub original_preview: Option<String>,
    /// Restored photo as returned by the model
    pub restored_image: Option<String>,
    pub restored_placeholder_visible: bool,
    /// Busy spinner
    pub busy: bool,
    pub restore_enabled: bool,
    pub download_enabled: bool,
    /// Upload area and file input
    pub upload_enabled: bool,
    pub strength_enabled: bool,
    /// Slider value and its label
    pub strength: u8,
}

impl ViewState {
    pub fn new(strength: u8) -> Self {
        Self {
            status: StatusLine::default(),
            original_preview: None,
            restored_image: None,
            restored_placeholder_visible: true,
            busy: false,
            restore_enabled: false,
            download_enabled: false,
            upload_enabled: true,
            strength_enabled: true,
            strength,
        }
    }

    pub fn show_info(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Info, text);
    }

    pub fn show_success(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Success, text);
    }

    pub fn show_error(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Error, text);
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = StatusLine {
            kind,
            text: text.into(),
        };
    }

    /// Toggle the restore trigger, upload area and slider together
    pub fn set_controls_enabled(&mut self, enabled: bool) {
        self.restore_enabled = enabled;
        self.upload_enabled = enabled;
        self.strength_enabled = enabled;
    }

    /// Upload area and slider accept input
    pub fn controls_interactive(&self) -> bool {
        self.upload_enabled && self.strength_enabled && !self.busy
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(crate::image::Strength::default().value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_view() {
        let view = ViewState::default();
        assert!(view.controls_interactive());
        assert!(!view.restore_enabled);
        assert!(!view.download_enabled);
        assert!(view.restored_placeholder_visible);
        assert_eq!(view.strength, 75);
        assert_eq!(view.status.text, "");
    }

    #[test]
    fn test_controls_toggle_together() {
        let mut view = ViewState::default();
        view.set_controls_enabled(false);
        assert!(!view.restore_enabled && !view.upload_enabled && !view.strength_enabled);
        assert!(!view.controls_interactive());

        view.set_controls_enabled(true);
        assert!(view.controls_interactive());
    }

    #[test]
    fn test_status_serialization() {
        let mut view = ViewState::default();
        view.show_error("boom");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"]["kind"], "error");
        assert_eq!(json["status"]["text"], "boom");
    }
}
