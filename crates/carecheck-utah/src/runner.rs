//! Main runner for the Utah pipeline

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use carecheck_core::{Fetch, ProgressContext};
use carecheck_extract::Extractor;
use chrono::{DateTime, Local};

use crate::config::Config;
use crate::fetcher::fetch_facility;
use crate::worker::{ChecklistStats, Worker};
use crate::writer::{cleanup_tmp_files, write_facilities};

/// Pipeline execution summary
#[derive(Debug, Clone)]
pub struct Summary {
    pub started_at: DateTime<Local>,
    pub facilities_requested: usize,
    pub facilities_written: usize,
    pub facilities_skipped: usize,
    pub checklists_downloaded: usize,
    pub checklists_failed: usize,
    /// Checklist results per extraction method tag
    pub methods: BTreeMap<String, usize>,
    pub elapsed: Duration,
}

/// Run the Utah pipeline: fetch every configured facility in order, process
/// its checklists, then write the aggregated JSON.
///
/// Configuration problems are returned before any request is made. Per-facility
/// and per-checklist failures are logged and skipped.
pub fn run(
    config: &Config,
    fetch: &dyn Fetch,
    extractor: &Extractor,
    progress: &ProgressContext,
) -> Result<Summary> {
    let start = Instant::now();
    let started_at = Local::now();

    config.validate().context("Invalid configuration")?;
    cleanup_tmp_files(&config.checklist_dir)
        .with_context(|| format!("Failed to clean up {}", config.checklist_dir.display()))?;

    let total = config.facility_ids.len();
    log::info!(
        "Starting Utah export ({total} facilities, OCR {})",
        if extractor.has_ocr() { "enabled" } else { "disabled" }
    );

    let worker = Worker {
        config,
        fetch,
        extractor,
    };
    let pb = progress.counter("facilities", total as u64);
    let mut stats = ChecklistStats::default();
    let mut facilities = Vec::with_capacity(total);

    for (idx, facility_id) in config.facility_ids.iter().enumerate() {
        if idx > 0 && !config.request_delay.is_zero() {
            std::thread::sleep(config.request_delay);
        }
        pb.set_message(facility_id.to_string());

        if let Some(facility) = fetch_facility(fetch, config, facility_id) {
            facilities.push(worker.process_facility(facility_id, facility, &mut stats, &pb));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    write_facilities(&config.output_file, &facilities)?;

    let summary = Summary {
        started_at,
        facilities_requested: total,
        facilities_written: facilities.len(),
        facilities_skipped: total - facilities.len(),
        checklists_downloaded: stats.downloaded,
        checklists_failed: stats.failed,
        methods: stats.methods,
        elapsed: start.elapsed(),
    };

    log::info!("=== Utah Pipeline Summary ===");
    log::info!(
        "Facilities: {}/{} written ({} skipped)",
        summary.facilities_written,
        summary.facilities_requested,
        summary.facilities_skipped
    );
    log::info!(
        "Checklists: {} downloaded ({} failed)",
        summary.checklists_downloaded,
        summary.checklists_failed
    );
    for (method, count) in &summary.methods {
        log::info!("  {method}: {count}");
    }
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}
