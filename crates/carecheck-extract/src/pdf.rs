//! First-page access for checklist PDFs
//!
//! `lopdf` parses the document and reads the text layer; `hayro` rasterizes
//! the page for OCR.

use std::sync::Arc;

use image::RgbImage;

use crate::error::DocumentError;

/// PDF points per inch
const POINTS_PER_INCH: f32 = 72.0;

/// The parts of a document the extractor looks at.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text layer of the first page. Empty when the page is a scan.
    fn first_page_text(&self) -> Result<String, DocumentError>;

    /// First page rendered at `dpi`.
    fn render_first_page(&self, dpi: u32) -> Result<RgbImage, DocumentError>;
}

/// Parsed PDF held in memory.
pub struct PdfDocument {
    doc: lopdf::Document,
    data: Arc<Vec<u8>>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("bytes", &self.data.len())
            .field("pages", &self.page_count())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Parse `bytes` as a PDF.
    pub fn open(bytes: &[u8]) -> Result<Self, DocumentError> {
        let doc =
            lopdf::Document::load_mem(bytes).map_err(|e| DocumentError::Parse(e.to_string()))?;
        Ok(Self {
            doc,
            data: Arc::new(bytes.to_vec()),
        })
    }

    /// Page number (1-based, as lopdf keys them) of the first page
    fn first_page_number(&self) -> Option<u32> {
        self.doc.get_pages().keys().next().copied()
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn first_page_text(&self) -> Result<String, DocumentError> {
        let Some(page) = self.first_page_number() else {
            return Ok(String::new());
        };
        self.doc
            .extract_text(&[page])
            .map_err(|e| DocumentError::Text(e.to_string()))
    }

    fn render_first_page(&self, dpi: u32) -> Result<RgbImage, DocumentError> {
        use hayro::{InterpreterSettings, Pdf, RenderSettings};

        let pdf = Pdf::new(self.data.clone())
            .map_err(|e| DocumentError::Render(format!("failed to parse PDF: {e:?}")))?;
        let pages = pdf.pages();
        let page = pages
            .get(0)
            .ok_or_else(|| DocumentError::Render("document has no pages".to_string()))?;

        let media_box = page.media_box();
        let width = (media_box.x1 - media_box.x0) as f32;
        let height = (media_box.y1 - media_box.y0) as f32;
        if width <= 0.0 || height <= 0.0 {
            return Err(DocumentError::Render(format!(
                "invalid page size: {width}x{height}"
            )));
        }

        let scale = dpi as f32 / POINTS_PER_INCH;
        let settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            ..Default::default()
        };
        let pixmap = hayro::render(page, &InterpreterSettings::default(), &settings);

        // RGBA -> RGB
        let rgb: Vec<u8> = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        RgbImage::from_raw(u32::from(pixmap.width()), u32::from(pixmap.height()), rgb)
            .ok_or_else(|| DocumentError::Render("pixmap size mismatch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::build_pdf;

    #[test]
    fn open_rejects_garbage() {
        let err = PdfDocument::open(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn page_count_matches() {
        let bytes = build_pdf(&[&["one"], &["two"]]);
        let doc = PdfDocument::open(&bytes).unwrap();
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn empty_document_has_no_pages() {
        let bytes = build_pdf(&[]);
        let doc = PdfDocument::open(&bytes).unwrap();
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.first_page_text().unwrap(), "");
    }

    #[test]
    fn reads_first_page_only() {
        let bytes = build_pdf(&[&["Approved # of Present", "12"], &["second page"]]);
        let doc = PdfDocument::open(&bytes).unwrap();
        let text = doc.first_page_text().unwrap();
        assert!(text.contains("Approved # of Present"));
        assert!(text.contains("12"));
        assert!(!text.contains("second page"));
    }
}
