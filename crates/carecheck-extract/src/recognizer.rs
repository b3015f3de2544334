//! Seam between the extractor and an OCR engine

use image::RgbImage;

use crate::error::DocumentError;

/// Turns a page image into text fragments.
///
/// Implementations must not depend on call history: the extractor calls
/// `recognize` once per rotation and expects the same answer for the same image.
pub trait Recognizer {
    /// Recognized text fragments in reading order.
    fn recognize(&self, image: &RgbImage) -> Result<Vec<String>, DocumentError>;
}
