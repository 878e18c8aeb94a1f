//! User-visible status text
//!
//! Every string shown on the status line comes from here.

use serde::{Deserialize, Serialize};

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Vietnamese
    #[default]
    Vi,
    /// English
    En,
}

impl Locale {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "vi" | "vi-vn" | "vietnamese" => Some(Self::Vi),
            "en" | "en-us" | "en-gb" | "english" => Some(Self::En),
            _ => None,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vi => write!(f, "vi"),
            Self::En => write!(f, "en"),
        }
    }
}

/// Status line messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    FileReady,
    InvalidFile,
    NoFileSelected,
    MissingCredential,
    CredentialDialogUnavailable,
    Restoring,
    RestoreSucceeded,
    RestorationInProgress,
    ModelNotFound,
    InvalidApiKey,
    ModelRefused,
    /// Remote failure text, shown verbatim after a prefix
    Failure(String),
}

impl Message {
    pub fn render(&self, locale: Locale) -> String {
        match locale {
            Locale::Vi => self.render_vi(),
            Locale::En => self.render_en(),
        }
    }

    fn render_vi(&self) -> String {
        match self {
            Self::FileReady => "Ảnh đã tải lên. Sẵn sàng để phục chế.".to_string(),
            Self::InvalidFile => "Vui lòng tải lên một tệp ảnh hợp lệ.".to_string(),
            Self::NoFileSelected => "Vui lòng tải ảnh lên để phục chế.".to_string(),
            Self::MissingCredential => {
                "API key chưa được cấu hình. Vui lòng thêm API key của bạn.".to_string()
            }
            Self::CredentialDialogUnavailable => {
                "Không thể chọn API key. Vui lòng cấu hình biến môi trường API_KEY.".to_string()
            }
            Self::Restoring => {
                "Đang phục chế ảnh... Quá trình này có thể mất một chút thời gian.".to_string()
            }
            Self::RestoreSucceeded => "Phục chế ảnh thành công.".to_string(),
            Self::RestorationInProgress => {
                "Ảnh đang được phục chế. Vui lòng đợi hoàn tất.".to_string()
            }
            Self::ModelNotFound => "Không tìm thấy model. Điều này có thể do API key không hợp lệ \
                 hoặc vấn đề về quyền. Vui lòng kiểm tra lại API key."
                .to_string(),
            Self::InvalidApiKey => {
                "API key của bạn không hợp lệ. Vui lòng thêm một API key hợp lệ.".to_string()
            }
            Self::ModelRefused => {
                "Lỗi: Không có ảnh nào được phục chế. Yêu cầu có thể đã bị chặn.".to_string()
            }
            Self::Failure(detail) if detail.trim().is_empty() => {
                "Lỗi: Đã xảy ra lỗi không xác định.".to_string()
            }
            Self::Failure(detail) => format!("Lỗi: {}", detail),
        }
    }

    fn render_en(&self) -> String {
        match self {
            Self::FileReady => "Photo uploaded. Ready to restore.".to_string(),
            Self::InvalidFile => "Please upload a valid image file.".to_string(),
            Self::NoFileSelected => "Please upload a photo to restore.".to_string(),
            Self::MissingCredential => {
                "API key is not configured. Please add your API key.".to_string()
            }
            Self::CredentialDialogUnavailable => {
                "Cannot select an API key. Please set the API_KEY environment variable."
                    .to_string()
            }
            Self::Restoring => "Restoring photo... This may take a moment.".to_string(),
            Self::RestoreSucceeded => "Photo restored successfully.".to_string(),
            Self::RestorationInProgress => {
                "A photo is already being restored. Please wait for it to finish.".to_string()
            }
            Self::ModelNotFound => "Model not found. This may be caused by an invalid API key \
                 or a permission problem. Please check your API key."
                .to_string(),
            Self::InvalidApiKey => "Your API key is invalid. Please add a valid API key.".to_string(),
            Self::ModelRefused => {
                "Error: No image was restored. The request may have been blocked.".to_string()
            }
            Self::Failure(detail) if detail.trim().is_empty() => {
                "Error: An unknown error occurred.".to_string()
            }
            Self::Failure(detail) => format!("Error: {}", detail),
        }
    }
}
