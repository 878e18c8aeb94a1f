//! File intake: uploads and the single selected photo

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::{Error, Result};
use crate::image::{ImageFormat, data_uri, is_image_mime};

/// Fallback content type for files nothing can identify
const OCTET_STREAM: &str = "application/octet-stream";

/// A file handed over by the user (picker, drop, request body, or path)
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Original file name, when the source provides one
    pub file_name: Option<String>,
    /// Content type as declared by the source
    pub declared_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: None,
            declared_type: declared_type.into(),
            bytes,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Read a file from disk
    ///
    /// The declared type comes from the extension, then from the content,
    /// then falls back to `application/octet-stream`.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::ImageReadError(format!("{}: {}", path.display(), e)))?;

        let declared_type = ImageFormat::from_path(path)
            .map(|f| f.mime_type().to_string())
            .or_else(|| sniff_mime_type(&bytes))
            .unwrap_or_else(|| OCTET_STREAM.to_string());

        let mut upload = Self::new(declared_type, bytes);
        if let Some(name) = path.file_name() {
            upload.file_name = Some(name.to_string_lossy().into_owned());
        }
        Ok(upload)
    }
}

/// Identify an image from its leading bytes
fn sniff_mime_type(bytes: &[u8]) -> Option<String> {
    ::image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
        .filter(|mime| is_image_mime(mime))
}

/// The photo currently chosen for restoration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    bytes: Vec<u8>,
    base64: String,
    mime_type: String,
    file_name: Option<String>,
}

impl SelectedFile {
    /// Accept an upload whose declared type is an image
    pub fn from_upload(upload: FileUpload) -> Result<Self> {
        if !is_image_mime(&upload.declared_type) {
            return Err(Error::InvalidInput(format!(
                "'{}' is not an image (declared type {})",
                upload.file_name.as_deref().unwrap_or("upload"),
                if upload.declared_type.is_empty() {
                    "<none>"
                } else {
                    upload.declared_type.as_str()
                }
            )));
        }

        Ok(Self {
            base64: BASE64.encode(&upload.bytes),
            mime_type: upload.declared_type.trim().to_string(),
            bytes: upload.bytes,
            file_name: upload.file_name,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base64 payload sent to the model
    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Preview of the original as a `data:` URI
    pub fn preview_data_uri(&self) -> String {
        data_uri(&self.mime_type, &self.base64)
    }

    /// Decode the stored payload back into bytes
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.base64)
            .map_err(|e| Error::Other(format!("Corrupt selection payload: {}", e)))
    }
}
