//! Image restoration module for Revive
//!
//! Talks to Gemini image models: an old photo and a restoration instruction
//! go in, a restored image comes back as a `data:` URI.

mod client;
mod models;
mod prompt;
mod types;

pub use client::{GEMINI_BASE_URL, GeminiClient, GeminiClientBuilder};
pub use models::{DEFAULT_MODEL_ID, IMAGE_MODELS, ImageModel};
pub use prompt::restoration_prompt;
pub use types::{
    ImageFormat, RestorationRequest, RestoredImage, Strength, data_uri, is_image_mime,
};
