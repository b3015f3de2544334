//! Extract subcommand - re-run checklist extraction over saved PDFs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use carecheck_extract::{Extraction, Extractor};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use serde::Serialize;

use super::build_extractor;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory containing checklist PDFs
    pub dir: PathBuf,

    /// Also write results as a JSON array to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Skip OCR; read text layers only
    #[arg(long)]
    pub no_ocr: bool,

    /// Directory with text-detection.rten and text-recognition.rten
    #[arg(long)]
    pub models: Option<PathBuf>,
}

/// Extraction result for one file on disk
#[derive(Debug, Serialize)]
pub struct FileExtraction {
    pub file: String,
    #[serde(flatten)]
    pub extraction: Extraction,
}

/// `*.pdf` directly inside `dir`, sorted by path
fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }
    let pattern = dir.join("*.pdf");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("Non UTF-8 path: {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .context("Invalid glob pattern")?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn extract_all(paths: &[PathBuf], extractor: &Extractor) -> Vec<FileExtraction> {
    paths
        .iter()
        .map(|path| {
            let extraction = match std::fs::read(path) {
                Ok(bytes) => extractor.extract(&bytes),
                Err(e) => {
                    log::warn!("{}: {e}", path.display());
                    // Unreadable file reports like an unreadable document
                    extractor.extract(&[])
                }
            };
            log::debug!("{}: {}", path.display(), extraction.extraction_method);
            FileExtraction {
                file: path.display().to_string(),
                extraction,
            }
        })
        .collect()
}

fn print_results(results: &[FileExtraction]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            ["File", "Census", "Contact", "Licensor", "Method"]
                .into_iter()
                .map(|h| Cell::new(h).fg(Color::Cyan)),
        );

    let dash = || "-".to_string();
    for r in results {
        let name = Path::new(&r.file)
            .file_name()
            .map_or_else(|| r.file.clone(), |n| n.to_string_lossy().into_owned());
        let fields = &r.extraction.fields;
        table.add_row(vec![
            Cell::new(name),
            Cell::new(fields.census.map_or_else(dash, |c| c.to_string())),
            Cell::new(fields.contact_person.clone().unwrap_or_else(dash)),
            Cell::new(fields.licensor.clone().unwrap_or_else(dash)),
            Cell::new(r.extraction.extraction_method),
        ]);
    }
    eprintln!("\n{table}");
}

pub fn run(args: ExtractArgs, config: &Config) -> Result<()> {
    let extractor = build_extractor(config, args.no_ocr, args.models)?;
    let paths = find_pdfs(&args.dir)?;
    log::info!("Extracting {} PDFs from {}", paths.len(), args.dir.display());

    let results = extract_all(&paths, &extractor);
    print_results(&results);

    if let Some(json_path) = args.json {
        let json = serde_json::to_vec_pretty(&results).context("Failed to serialize results")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        log::info!("Wrote {} results to {}", results.len(), json_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use carecheck_extract::ExtractionMethod;

    use super::*;

    #[test]
    fn finds_only_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.pdf", "notes.txt", "c.pdf.tmp"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let names: Vec<String> = find_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
    }

    #[test]
    fn missing_dir_is_error() {
        assert!(find_pdfs(Path::new("/nonexistent/checklists")).is_err());
    }

    #[test]
    fn garbage_files_are_tagged_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facility_1_checklist_2.pdf");
        std::fs::write(&path, b"<html>").unwrap();
        let results = extract_all(&[path], &Extractor::text_only());
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].extraction.extraction_method,
            ExtractionMethod::Error
        );

        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json[0]["extraction_method"], "error");
        assert!(json[0]["census"].is_null());
        assert!(json[0]["file"].as_str().unwrap().ends_with("checklist_2.pdf"));
    }
}
