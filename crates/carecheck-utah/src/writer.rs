//! Output files with atomic tmp→rename

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{FacilityRecord, Id};

/// Write `bytes` to `path.tmp`, sync, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp_path, path)
}

/// `facility_{facility}_checklist_{checklist}.pdf`
pub fn checklist_filename(facility_id: &Id, checklist_id: &Id) -> String {
    format!("facility_{facility_id}_checklist_{checklist_id}.pdf")
}

/// Save a downloaded checklist into `dir`; returns the saved path.
///
/// IDs that could leave `dir` are refused with `InvalidInput`.
pub fn save_checklist_pdf(
    dir: &Path,
    facility_id: &Id,
    checklist_id: &Id,
    bytes: &[u8],
) -> std::io::Result<PathBuf> {
    if let Some(id) = [facility_id, checklist_id].into_iter().find(|id| !id.is_safe()) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("unsafe ID for file name: {id:?}"),
        ));
    }
    let path = dir.join(checklist_filename(facility_id, checklist_id));
    write_atomic(&path, bytes)?;
    Ok(path)
}

/// Write all facilities as one pretty-printed JSON array.
pub fn write_facilities(path: &Path, facilities: &[FacilityRecord]) -> Result<()> {
    let json = serde_json::to_vec_pretty(facilities).context("Failed to serialize facilities")?;
    write_atomic(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} facilities to {}", facilities.len(), path.display());
    Ok(())
}

/// Read back a file written by [`write_facilities`].
pub fn read_facilities(path: &Path) -> Result<Vec<FacilityRecord>> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Remove `.tmp` leftovers from an interrupted run.
pub fn cleanup_tmp_files(dir: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use carecheck_extract::{Extraction, ExtractionMethod, Fields};
    use serde_json::json;

    use super::*;
    use crate::model::{ChecklistResult, Finding, InspectionRecord};

    fn sample() -> Vec<FacilityRecord> {
        vec![
            FacilityRecord {
                facility_id: Id::Number(222),
                name: "Ranch Two".into(),
                address: "1 Elm, Moab, UT".into(),
                regulation_date: "2019-01-01".into(),
                expiration_date: "2026-01-01".into(),
                conditional: false,
                inspections: vec![InspectionRecord {
                    inspection_date: "2024-02-02".into(),
                    inspection_types: json!(["Annual"]),
                    findings: vec![Finding {
                        rule_number: "R501-1".into(),
                        rule_description: "Ratios".into(),
                        finding_text: "Ratio exceeded in café area".into(),
                    }],
                    checklists: vec![ChecklistResult {
                        checklist_id: Id::Number(9),
                        extraction: Extraction {
                            fields: Fields {
                                census: None,
                                contact_person: None,
                                licensor: Some("Ann Lee".into()),
                            },
                            extraction_method: ExtractionMethod::AllFailed,
                        },
                        pdf_file: "checklists/facility_222_checklist_9.pdf".into(),
                    }],
                }],
            },
            FacilityRecord {
                facility_id: Id::Text("111".into()),
                name: "Ranch One".into(),
                address: String::new(),
                regulation_date: String::new(),
                expiration_date: String::new(),
                conditional: true,
                inspections: vec![],
            },
        ]
    }

    #[test]
    fn facilities_round_trip_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        let facilities = sample();
        write_facilities(&path, &facilities).unwrap();
        assert_eq!(read_facilities(&path).unwrap(), facilities);
        assert!(!dir.path().join("reports.json.tmp").exists());
    }

    #[test]
    fn output_is_pretty_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        write_facilities(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {"));
        assert!(text.contains("Ratio exceeded in café area"));
    }

    #[test]
    fn empty_run_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        write_facilities(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn pdf_saved_under_expected_name() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            save_checklist_pdf(dir.path(), &Id::Number(1), &Id::Number(2), b"%PDF-1.4").unwrap();
        assert_eq!(path, dir.path().join("facility_1_checklist_2.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn pdf_save_fails_without_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(save_checklist_pdf(&missing, &Id::Number(1), &Id::Number(2), b"x").is_err());
    }

    #[test]
    fn pdf_save_refuses_path_escape() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("checklists");
        fs::create_dir_all(dir.join("facility_1_checklist_x")).unwrap();

        let err = save_checklist_pdf(
            &dir,
            &Id::Number(1),
            &Id::Text("x/../../escape".into()),
            b"%PDF-1.4",
        )
        .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(!root.path().join("escape.pdf").exists());
        assert!(!root.path().join("escape.pdf.tmp").exists());
    }

    #[test]
    fn cleanup_removes_only_tmp() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdf.tmp"), b"stale").unwrap();
        fs::write(dir.path().join("b.pdf"), b"ok").unwrap();
        cleanup_tmp_files(dir.path()).unwrap();
        assert!(!dir.path().join("a.pdf.tmp").exists());
        assert!(dir.path().join("b.pdf").exists());
    }
}
