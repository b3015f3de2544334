//! carecheck extract - census, contact and licensor from inspection checklists
//!
//! Reads the first page's text layer and falls back to OCR at four rotations
//! when the text layer yields nothing.
//!
//! # Example
//!
//! ```ignore
//! use carecheck_extract::Extractor;
//!
//! let extractor = Extractor::text_only();
//! let result = extractor.extract(&std::fs::read("checklist.pdf")?);
//! println!("census={:?} via {}", result.fields.census, result.extraction_method);
//! ```

pub mod error;
pub mod extractor;
#[cfg(feature = "ocr")]
pub mod ocr;
pub mod patterns;
pub mod pdf;
pub mod recognizer;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports
pub use error::DocumentError;
pub use extractor::{Extraction, ExtractionMethod, Extractor, Rotation};
#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrEngine};
pub use patterns::{Fields, Mode, extract_fields};
pub use pdf::{PageSource, PdfDocument};
pub use recognizer::Recognizer;
