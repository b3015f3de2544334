//! Fetch subcommand - scrape Utah facilities and their checklists

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use carecheck_core::{HttpFetcher, SharedProgress};
use carecheck_utah::{Id, load_facility_ids};
use clap::Args;

use super::{build_extractor, print_summary};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Facility IDs (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "ids_file")]
    pub ids: Vec<Id>,

    /// File with facility IDs (comma or whitespace separated, # comments)
    #[arg(long)]
    pub ids_file: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of facilities to process
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Skip OCR; checklists without a usable text layer are tagged all_failed
    #[arg(long)]
    pub no_ocr: bool,

    /// Directory with text-detection.rten and text-recognition.rten
    #[arg(long)]
    pub models: Option<PathBuf>,
}

/// Global flags that override the `[http]` section
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpOverrides {
    pub timeout: Option<u64>,
    pub max_attempts: Option<u32>,
}

/// Facility IDs: `--ids`, then `--ids-file`, then the config file.
fn resolve_ids(args: &FetchArgs, config: &Config) -> Result<Vec<Id>> {
    let mut ids = if !args.ids.is_empty() {
        args.ids.clone()
    } else if let Some(path) = args.ids_file.as_ref().or(config.utah.ids_file.as_ref()) {
        load_facility_ids(path)?
    } else {
        config.utah.ids.clone()
    };
    if let Some(limit) = args.limit {
        ids.truncate(limit);
    }
    Ok(ids)
}

fn pipeline_config(
    args: &FetchArgs,
    config: &Config,
    overrides: HttpOverrides,
) -> Result<carecheck_utah::Config> {
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.dir.clone());

    Ok(carecheck_utah::Config {
        facility_ids: resolve_ids(args, config)?,
        facility_url: config.utah.facility_url.clone(),
        checklist_url: config.utah.checklist_url.clone(),
        output_file: config.json_path(&output_dir),
        checklist_dir: config.checklist_path(&output_dir),
        max_inspections: config.utah.max_inspections,
        max_checklists: config.utah.max_checklists,
        request_delay: Duration::from_millis(config.utah.request_delay_ms),
        retry: config.http.retry_policy(overrides.max_attempts),
    })
}

pub fn run(
    args: FetchArgs,
    config: &Config,
    overrides: HttpOverrides,
    progress: &SharedProgress,
) -> Result<()> {
    let ut_config = pipeline_config(&args, config, overrides)?;
    let extractor = build_extractor(config, args.no_ocr, args.models.clone())?;

    let fetcher = HttpFetcher::new(&config.http.http_config(overrides.timeout))
        .context("Failed to build HTTP client")?;

    log::info!(
        "Fetching {} Utah facilities -> {}",
        ut_config.facility_ids.len(),
        ut_config.output_file.display()
    );
    let summary = carecheck_utah::run(&ut_config, &fetcher, &extractor, progress)?;

    let mut rows = vec![
        (
            "Started",
            summary.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        (
            "Facilities",
            format!(
                "{}/{} written ({} skipped)",
                summary.facilities_written,
                summary.facilities_requested,
                summary.facilities_skipped
            ),
        ),
        (
            "Checklists",
            format!(
                "{} downloaded ({} failed)",
                summary.checklists_downloaded, summary.checklists_failed
            ),
        ),
    ];
    for (method, count) in &summary.methods {
        rows.push(("  method", format!("{method}: {count}")));
    }
    rows.push(("Output", ut_config.output_file.display().to_string()));
    rows.push(("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())));
    print_summary("Utah", &rows);

    Ok(())
}
