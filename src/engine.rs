use crate::error::LabError;
use image::GrayImage;

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the text in a preprocessed image as one flat string
    fn recognize(&self, image: &GrayImage) -> Result<String, LabError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}
