//! Document processing errors

/// Malformed or unreadable document.
///
/// The extractor never propagates these: they become `error` or `all_failed`
/// results on the checklist.
#[derive(Debug)]
pub enum DocumentError {
    /// The bytes are not a readable PDF
    Parse(String),
    /// Text layer could not be decoded
    Text(String),
    /// Page could not be rasterized
    Render(String),
    /// OCR engine unavailable or recognition failed
    Ocr(String),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "PDF parse error: {e}"),
            Self::Text(e) => write!(f, "text layer error: {e}"),
            Self::Render(e) => write!(f, "render error: {e}"),
            Self::Ocr(e) => write!(f, "OCR error: {e}"),
        }
    }
}

impl std::error::Error for DocumentError {}
