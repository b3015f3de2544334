//! Checklist extraction: text layer first, OCR at four rotations second
//!
//! ```text
//! START -> TEXT_TRY -> OCR_TRY -> DONE
//!             |                    ^
//!             +--- any field ------+
//! ```
//!
//! Every path ends in an [`Extraction`] with its method tag set; nothing here
//! returns an error to the caller.

use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use image::imageops;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::patterns::{Fields, Mode, extract_fields};
use crate::pdf::{PageSource, PdfDocument};
use crate::recognizer::Recognizer;

/// Rasterization resolution for OCR
pub const DEFAULT_DPI: u32 = 300;

/// Counter-clockwise page rotation tried during OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Search order
    pub const ALL: [Rotation; 4] = [Self::R0, Self::R90, Self::R180, Self::R270];

    pub fn degrees(self) -> u16 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.degrees() == degrees)
    }

    /// Rotate counter-clockwise; the canvas grows to fit.
    pub fn apply(self, image: &RgbImage) -> RgbImage {
        // imageops rotates clockwise
        match self {
            Self::R0 => image.clone(),
            Self::R90 => imageops::rotate270(image),
            Self::R180 => imageops::rotate180(image),
            Self::R270 => imageops::rotate90(image),
        }
    }
}

/// Which path produced an [`Extraction`].
///
/// Serialized as the tags downstream report scripts key on: `text`,
/// `easyocr_rotated_<angle>`, `no_pages`, `all_failed`, `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionMethod {
    /// Text layer produced at least one field
    Text,
    /// OCR at the given rotation
    Ocr(Rotation),
    /// Document has no pages
    NoPages,
    /// Neither path produced any text
    AllFailed,
    /// Document could not be opened
    Error,
}

const OCR_TAG_PREFIX: &str = "easyocr_rotated_";

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Ocr(rotation) => write!(f, "{OCR_TAG_PREFIX}{}", rotation.degrees()),
            Self::NoPages => f.write_str("no_pages"),
            Self::AllFailed => f.write_str("all_failed"),
            Self::Error => f.write_str("error"),
        }
    }
}

impl FromStr for ExtractionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "no_pages" => Ok(Self::NoPages),
            "all_failed" => Ok(Self::AllFailed),
            "error" => Ok(Self::Error),
            _ => s
                .strip_prefix(OCR_TAG_PREFIX)
                .and_then(|deg| deg.parse().ok())
                .and_then(Rotation::from_degrees)
                .map(Self::Ocr)
                .ok_or_else(|| format!("unknown extraction method: {s}")),
        }
    }
}

impl Serialize for ExtractionMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExtractionMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Extracted fields plus the tag of the path that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(flatten)]
    pub fields: Fields,
    pub extraction_method: ExtractionMethod,
}

impl Extraction {
    fn empty(method: ExtractionMethod) -> Self {
        Self {
            fields: Fields::default(),
            extraction_method: method,
        }
    }
}

/// Runs the TEXT_TRY / OCR_TRY sequence over checklist documents.
///
/// Holds the OCR engine handle for the whole run. Without one, pages with no
/// usable text layer end as `all_failed`.
pub struct Extractor {
    recognizer: Option<Box<dyn Recognizer>>,
    dpi: u32,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("ocr", &self.recognizer.is_some())
            .field("dpi", &self.dpi)
            .finish()
    }
}

impl Extractor {
    pub fn new(recognizer: Option<Box<dyn Recognizer>>, dpi: u32) -> Self {
        Self { recognizer, dpi }
    }

    /// Extractor that never attempts OCR.
    pub fn text_only() -> Self {
        Self::new(None, DEFAULT_DPI)
    }

    pub fn has_ocr(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Extract from raw PDF bytes. Never fails: an unreadable document is tagged `error`.
    pub fn extract(&self, bytes: &[u8]) -> Extraction {
        match PdfDocument::open(bytes) {
            Ok(doc) => self.extract_document(&doc),
            Err(e) => {
                log::warn!("Error parsing PDF: {e}");
                Extraction::empty(ExtractionMethod::Error)
            }
        }
    }

    /// Extract from an opened document.
    pub fn extract_document(&self, doc: &dyn PageSource) -> Extraction {
        if doc.page_count() == 0 {
            return Extraction::empty(ExtractionMethod::NoPages);
        }

        // TEXT_TRY
        match doc.first_page_text() {
            Ok(text) if !text.trim().is_empty() => {
                let fields = extract_fields(&text, Mode::Text);
                if !fields.is_empty() {
                    return Extraction {
                        fields,
                        extraction_method: ExtractionMethod::Text,
                    };
                }
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Error reading text layer: {e}");
                return Extraction::empty(ExtractionMethod::Error);
            }
        }

        // OCR_TRY
        log::debug!("Text layer gave nothing, trying OCR");
        let Some(recognizer) = self.recognizer.as_deref() else {
            return Extraction::empty(ExtractionMethod::AllFailed);
        };
        let image = match doc.render_first_page(self.dpi) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("OCR failed: {e}");
                return Extraction::empty(ExtractionMethod::AllFailed);
            }
        };
        search_rotations(&image, recognizer)
    }
}

/// OCR the image at each rotation until one yields a field.
///
/// Stops at the first rotation with any field, even if a later rotation would
/// recognize more text. Without any field, the longest recognized text is
/// re-read and its rotation reported; blank text everywhere is `all_failed`.
pub fn search_rotations(image: &RgbImage, recognizer: &dyn Recognizer) -> Extraction {
    let mut best: Option<(Rotation, String)> = None;

    for rotation in Rotation::ALL {
        let text = match recognizer.recognize(&rotation.apply(image)) {
            Ok(fragments) => fragments.join(" "),
            Err(e) => {
                log::warn!("OCR at {}° failed: {e}", rotation.degrees());
                String::new()
            }
        };

        let fields = extract_fields(&text, Mode::Ocr);
        if !fields.is_empty() {
            log::debug!(
                "OCR extracted {} characters (rotation: {}°)",
                text.chars().count(),
                rotation.degrees()
            );
            return Extraction {
                fields,
                extraction_method: ExtractionMethod::Ocr(rotation),
            };
        }

        let longer = best
            .as_ref()
            .is_none_or(|(_, b)| text.chars().count() > b.chars().count());
        if longer && !text.trim().is_empty() {
            best = Some((rotation, text));
        }
    }

    match best {
        Some((rotation, text)) => {
            log::debug!(
                "OCR found text but no fields; using {}° ({} characters)",
                rotation.degrees(),
                text.chars().count()
            );
            Extraction {
                fields: extract_fields(&text, Mode::Ocr),
                extraction_method: ExtractionMethod::Ocr(rotation),
            }
        }
        None => {
            log::debug!("OCR found no text at any rotation");
            Extraction::empty(ExtractionMethod::AllFailed)
        }
    }
}
