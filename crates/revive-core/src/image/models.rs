//! Restoration model definitions
//!
//! Gemini models that accept an inline image and answer with an image.

use serde::Serialize;

/// Default model used for restoration
pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-flash-image";

/// Information about an image-capable model
#[derive(Debug, Clone, Serialize)]
pub struct ImageModel {
    /// Model identifier (Gemini API format)
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Brief description of the model
    pub description: &'static str,
    /// Whether the model accepts an input image and returns an edited one
    pub image_to_image: bool,
}

/// Known image models
pub static IMAGE_MODELS: &[ImageModel] = &[
    ImageModel {
        id: "gemini-2.5-flash-image",
        name: "Gemini 2.5 Flash Image",
        description: "Fast image editing model with strong detail recovery.",
        image_to_image: true,
    },
    ImageModel {
        id: "gemini-2.5-flash-image-preview",
        name: "Gemini 2.5 Flash Image (preview)",
        description: "Preview channel of Gemini 2.5 Flash Image.",
        image_to_image: true,
    },
    ImageModel {
        id: "gemini-2.0-flash-preview-image-generation",
        name: "Gemini 2.0 Flash Image Generation",
        description: "Previous generation conversational image model.",
        image_to_image: true,
    },
    ImageModel {
        id: "imagen-4.0-generate-001",
        name: "Imagen 4",
        description: "Text-to-image only; cannot restore an existing photo.",
        image_to_image: false,
    },
];

impl ImageModel {
    /// Get a model by ID
    pub fn by_id(id: &str) -> Option<&'static ImageModel> {
        IMAGE_MODELS.iter().find(|m| m.id == id)
    }

    /// Get the default restoration model
    pub fn default_model() -> &'static ImageModel {
        Self::by_id(DEFAULT_MODEL_ID).unwrap_or(&IMAGE_MODELS[0])
    }

    /// Models able to restore an uploaded photo
    pub fn restoration_capable() -> impl Iterator<Item = &'static ImageModel> {
        IMAGE_MODELS.iter().filter(|m| m.image_to_image)
    }
}
