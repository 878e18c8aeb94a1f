//! Restoration request and response types

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::restoration::Locale;

use super::models::DEFAULT_MODEL_ID;
use super::prompt::restoration_prompt;

/// Image formats accepted by the restoration model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless)
    #[default]
    Png,
    /// JPEG format (lossy, smaller)
    Jpeg,
    /// WebP format (modern, efficient)
    WebP,
    /// HEIC (phone cameras)
    Heic,
    /// HEIF container
    Heif,
}

impl ImageFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Heic => "heic",
            Self::Heif => "heif",
        }
    }

    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Heic => "image/heic",
            Self::Heif => "image/heif",
        }
    }

    /// Parse from string or file extension
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "heic" => Some(Self::Heic),
            "heif" => Some(Self::Heif),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Map a MIME type back to a format
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        mime.trim()
            .to_lowercase()
            .strip_prefix("image/")
            .and_then(Self::parse)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Whether a declared content type names an image
pub fn is_image_mime(declared: &str) -> bool {
    declared.trim().to_ascii_lowercase().starts_with("image/")
}

/// Restoration strength in percent, always within `MIN..=MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strength(u8);

impl Strength {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    /// Clamp any integer into the slider bounds
    pub fn new(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self(75)
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build a `data:` URI from a MIME type and a base64 payload
pub fn data_uri(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_payload)
}

/// A single restoration attempt, built from the current selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestorationRequest {
    /// Base64 payload of the selected image
    pub image_base64: String,
    /// Declared MIME type of the selected image
    pub mime_type: String,
    /// How aggressively the model may alter the photo
    pub strength: Strength,
    /// Model to use for restoration
    #[serde(default = "default_model")]
    pub model: String,
    /// Language of the instruction sent to the model
    #[serde(default)]
    pub locale: Locale,
}

fn default_model() -> String {
    DEFAULT_MODEL_ID.to_string()
}

impl RestorationRequest {
    pub fn new(
        image_base64: impl Into<String>,
        mime_type: impl Into<String>,
        strength: Strength,
    ) -> Self {
        Self {
            image_base64: image_base64.into(),
            mime_type: mime_type.into(),
            strength,
            model: default_model(),
            locale: Locale::default(),
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the prompt language
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Natural-language instruction parameterized by strength
    pub fn build_prompt(&self) -> String {
        restoration_prompt(self.locale, self.strength)
    }
}

/// Restored image returned by the model
#[derive(Debug, Clone)]
pub struct RestoredImage {
    /// `data:` URI exactly as assembled from the model's answer
    pub data_uri: String,
    /// MIME type reported by the model
    pub mime_type: String,
    /// Decoded image bytes
    pub bytes: Vec<u8>,
    /// Model that produced the image
    pub model_used: String,
    /// Round-trip time in milliseconds
    pub generation_time_ms: u64,
}

impl RestoredImage {
    /// Build from the model's inline data
    pub fn from_inline_data(
        mime_type: &str,
        base64_payload: &str,
        model_used: impl Into<String>,
        generation_time_ms: u64,
    ) -> Result<Self> {
        let bytes = BASE64
            .decode(base64_payload.trim())
            .map_err(|e| Error::RemoteApi(format!("Invalid base64 in image response: {}", e)))?;

        Ok(Self {
            data_uri: data_uri(mime_type, base64_payload.trim()),
            mime_type: mime_type.to_string(),
            bytes,
            model_used: model_used.into(),
            generation_time_ms,
        })
    }

    /// Image format, when the MIME type is a known one
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Get the image size in bytes
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
