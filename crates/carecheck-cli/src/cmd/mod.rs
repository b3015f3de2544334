pub mod extract;
pub mod fetch;

use std::path::PathBuf;

use anyhow::Result;
use carecheck_extract::Extractor;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Build the extractor for a run. Missing OCR models are a startup error
/// unless OCR is switched off.
#[cfg(feature = "ocr")]
pub fn build_extractor(config: &Config, no_ocr: bool, models: Option<PathBuf>) -> Result<Extractor> {
    use carecheck_extract::{OcrConfig, OcrEngine};

    if no_ocr || !config.ocr.enabled {
        log::info!("OCR disabled; scanned checklists will be tagged all_failed");
        return Ok(Extractor::text_only());
    }

    let model_dir = models
        .or_else(|| config.ocr.model_dir.clone())
        .or_else(carecheck_extract::ocr::default_model_dir)
        .ok_or(carecheck_core::ConfigError::NoModelDir)?;
    let ocr_config = OcrConfig::from_dir(&model_dir);
    ocr_config.validate()?;

    Ok(Extractor::new(
        Some(Box::new(OcrEngine::new(ocr_config))),
        config.ocr.dpi,
    ))
}

#[cfg(not(feature = "ocr"))]
pub fn build_extractor(config: &Config, no_ocr: bool, models: Option<PathBuf>) -> Result<Extractor> {
    if !no_ocr && config.ocr.enabled {
        log::warn!("Built without the `ocr` feature; only text layers will be read");
    }
    if let Some(dir) = models {
        log::debug!("Ignoring OCR model directory {}", dir.display());
    }
    Ok(Extractor::text_only())
}
