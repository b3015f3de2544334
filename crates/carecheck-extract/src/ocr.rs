//! OCR engine handle backed by `ocrs`.
//!
//! The caller builds one [`OcrEngine`] per run and hands it to the
//! [`Extractor`](crate::Extractor). Model loading is deferred until the first
//! page that actually needs OCR, and happens at most once: the result of the
//! load (success or failure) is kept behind a `OnceLock`.
//!
//! Models are the two `.rten` files published for `ocrs`:
//! `text-detection.rten` and `text-recognition.rten`. Running `ocrs-cli` once
//! downloads them to the user cache directory (`~/.cache/ocrs` on Linux).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use carecheck_core::ConfigError;
use image::RgbImage;
use ocrs::{ImageSource, OcrEngineParams};
use rten::Model;

use crate::error::DocumentError;
use crate::recognizer::Recognizer;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `ocrs` under the platform cache directory. `None` without a home directory.
pub fn default_model_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.cache_dir().join("ocrs"))
}

/// Where to find the model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl OcrConfig {
    /// Expects `text-detection.rten` and `text-recognition.rten` inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Both model files exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (what, path) in [
            ("OCR detection model", &self.detection_model_path),
            ("OCR recognition model", &self.recognition_model_path),
        ] {
            if !path.is_file() {
                return Err(ConfigError::MissingPath {
                    what,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Lazily loaded OCR engine.
pub struct OcrEngine {
    config: OcrConfig,
    engine: OnceLock<Result<ocrs::OcrEngine, String>>,
}

impl std::fmt::Debug for OcrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrEngine")
            .field("config", &self.config)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl OcrEngine {
    /// Handle that loads models from `config` on first use.
    pub fn new(config: OcrConfig) -> Self {
        Self {
            config,
            engine: OnceLock::new(),
        }
    }

    /// Whether the models have been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        matches!(self.engine.get(), Some(Ok(_)))
    }

    fn engine(&self) -> Result<&ocrs::OcrEngine, DocumentError> {
        self.engine
            .get_or_init(|| {
                let loaded = load_engine(&self.config);
                match &loaded {
                    Ok(_) => log::info!("OCR engine initialized"),
                    Err(e) => log::error!("OCR engine unavailable: {e}"),
                }
                loaded
            })
            .as_ref()
            .map_err(|e| DocumentError::Ocr(e.clone()))
    }
}

fn load_engine(config: &OcrConfig) -> Result<ocrs::OcrEngine, String> {
    log::info!(
        "Loading OCR models from {}",
        config
            .detection_model_path
            .parent()
            .unwrap_or(Path::new("."))
            .display()
    );
    let detection_model = Model::load_file(&config.detection_model_path).map_err(|e| {
        format!(
            "failed to load detection model {}: {e}",
            config.detection_model_path.display()
        )
    })?;
    let recognition_model = Model::load_file(&config.recognition_model_path).map_err(|e| {
        format!(
            "failed to load recognition model {}: {e}",
            config.recognition_model_path.display()
        )
    })?;

    ocrs::OcrEngine::new(OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        ..Default::default()
    })
    .map_err(|e| format!("failed to initialize OCR engine: {e}"))
}

impl Recognizer for OcrEngine {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<String>, DocumentError> {
        let engine = self.engine()?;
        let (width, height) = image.dimensions();

        let source = ImageSource::from_bytes(image.as_raw(), (width, height)).map_err(|e| {
            DocumentError::Ocr(format!("bad image source ({width}x{height}): {e}"))
        })?;
        let input = engine
            .prepare_input(source)
            .map_err(|e| DocumentError::Ocr(format!("preprocessing failed: {e}")))?;

        let words = engine
            .detect_words(&input)
            .map_err(|e| DocumentError::Ocr(format!("word detection failed: {e}")))?;
        let lines = engine.find_text_lines(&input, &words);
        let texts = engine
            .recognize_text(&input, &lines)
            .map_err(|e| DocumentError::Ocr(format!("recognition failed: {e}")))?;

        let fragments: Vec<String> = texts
            .iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|text| !text.trim().is_empty())
            .collect();
        log::debug!(
            "OCR {width}x{height}: {} fragments detected",
            fragments.len()
        );
        Ok(fragments)
    }
}
