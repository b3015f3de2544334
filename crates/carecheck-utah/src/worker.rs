//! Per-facility work: inspections, findings and checklists

use std::collections::BTreeMap;

use carecheck_core::{Fetch, download_with_retry};
use carecheck_extract::Extractor;
use indicatif::ProgressBar;

use crate::api::{FacilityResponse, Inspection};
use crate::config::Config;
use crate::model::{ChecklistResult, FacilityRecord, Id, InspectionRecord};
use crate::writer::save_checklist_pdf;

/// Checklist counters accumulated across facilities
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChecklistStats {
    pub downloaded: usize,
    pub failed: usize,
    /// Results per extraction method tag
    pub methods: BTreeMap<String, usize>,
}

/// Shared handles for one run
pub struct Worker<'a> {
    pub config: &'a Config,
    pub fetch: &'a dyn Fetch,
    pub extractor: &'a Extractor,
}

impl Worker<'_> {
    /// Build the output record for one facility, downloading and extracting
    /// each of its checklists.
    pub fn process_facility(
        &self,
        facility_id: &Id,
        facility: FacilityResponse,
        stats: &mut ChecklistStats,
        pb: &ProgressBar,
    ) -> FacilityRecord {
        let inspections = facility
            .inspections
            .into_iter()
            .take(self.config.max_inspections)
            .map(|inspection| self.process_inspection(facility_id, inspection, stats, pb))
            .collect();

        FacilityRecord {
            facility_id: facility_id.clone(),
            name: facility.name,
            address: facility.address.formatted(),
            regulation_date: facility.initial_regulation_date,
            expiration_date: facility.expiration_date,
            conditional: facility.conditional,
            inspections,
        }
    }

    fn process_inspection(
        &self,
        facility_id: &Id,
        inspection: Inspection,
        stats: &mut ChecklistStats,
        pb: &ProgressBar,
    ) -> InspectionRecord {
        let total = inspection.checklist_ids.len();
        if total > self.config.max_checklists {
            log::warn!(
                "Facility {facility_id}, inspection {}: {total} checklists, keeping first {}",
                inspection.inspection_date,
                self.config.max_checklists
            );
        } else {
            log::debug!(
                "Facility {facility_id}, inspection {}: {total} checklists",
                inspection.inspection_date
            );
        }

        let mut checklists = Vec::new();
        for checklist_id in inspection
            .checklist_ids
            .iter()
            .take(self.config.max_checklists)
        {
            pb.set_message(format!("{facility_id} / checklist {checklist_id}"));
            match self.process_checklist(facility_id, checklist_id) {
                Some(result) => {
                    stats.downloaded += 1;
                    *stats
                        .methods
                        .entry(result.extraction.extraction_method.to_string())
                        .or_default() += 1;
                    checklists.push(result);
                }
                None => stats.failed += 1,
            }
        }

        InspectionRecord {
            inspection_date: inspection.inspection_date,
            inspection_types: inspection.inspection_types,
            findings: inspection.findings.into_iter().map(Into::into).collect(),
            checklists,
        }
    }

    /// Download, extract and save one checklist. `None` if it could not be
    /// downloaded or saved.
    pub fn process_checklist(&self, facility_id: &Id, checklist_id: &Id) -> Option<ChecklistResult> {
        let url = self.config.checklist_url_for(checklist_id);
        let Some(pdf) = download_with_retry(self.fetch, &url, &self.config.retry) else {
            log::warn!("Checklist {checklist_id}: failed to download after retries");
            return None;
        };

        let extraction = self.extractor.extract(&pdf);

        let path = match save_checklist_pdf(&self.config.checklist_dir, facility_id, checklist_id, &pdf)
        {
            Ok(path) => path,
            Err(e) => {
                log::error!("Checklist {checklist_id}: failed to save PDF: {e}");
                return None;
            }
        };

        log::info!(
            "Checklist {checklist_id}: census={} method={}",
            extraction
                .fields
                .census
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
            extraction.extraction_method
        );

        Some(ChecklistResult {
            checklist_id: checklist_id.clone(),
            extraction,
            pdf_file: path.display().to_string(),
        })
    }
}
