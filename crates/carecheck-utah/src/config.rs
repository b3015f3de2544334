//! Utah pipeline configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use carecheck_core::{ConfigError, RetryPolicy};

use crate::model::Id;

pub const DEFAULT_FACILITY_URL: &str = "https://ccl.utah.gov/ccl/public/facilities/{id}.json";
pub const DEFAULT_CHECKLIST_URL: &str = "https://ccl.utah.gov/ccl/public/checklist/{id}?dl=1";

/// Runtime configuration for the Utah pipeline
#[derive(Debug, Clone)]
pub struct Config {
    /// Facilities to fetch, in output order
    pub facility_ids: Vec<Id>,
    /// Facility JSON URL; `{id}` is replaced with the facility ID
    pub facility_url: String,
    /// Checklist PDF URL; `{id}` is replaced with the checklist ID
    pub checklist_url: String,
    /// Aggregated JSON output
    pub output_file: PathBuf,
    /// Directory for downloaded checklist PDFs
    pub checklist_dir: PathBuf,
    /// Inspections kept per facility, in upstream order
    pub max_inspections: usize,
    /// Checklists processed per inspection
    pub max_checklists: usize,
    /// Pause between consecutive facilities
    pub request_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facility_ids: Vec::new(),
            facility_url: DEFAULT_FACILITY_URL.to_string(),
            checklist_url: DEFAULT_CHECKLIST_URL.to_string(),
            output_file: PathBuf::from("ut_reports_with_ocr.json"),
            checklist_dir: PathBuf::from("checklists"),
            max_inspections: 100,
            max_checklists: 50,
            request_delay: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Check everything that can be checked without the network, and create
    /// the output directories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.facility_ids.is_empty() {
            return Err(ConfigError::NoFacilityIds);
        }
        for (name, template) in [
            ("facility URL", &self.facility_url),
            ("checklist URL", &self.checklist_url),
        ] {
            if !template.contains("{id}") {
                return Err(ConfigError::UrlTemplate {
                    name,
                    template: template.clone(),
                });
            }
        }

        let output_parent = self
            .output_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty());
        for dir in output_parent.into_iter().chain([self.checklist_dir.as_path()]) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::OutputDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn facility_url_for(&self, id: &Id) -> String {
        render_url(&self.facility_url, id)
    }

    pub fn checklist_url_for(&self, id: &Id) -> String {
        render_url(&self.checklist_url, id)
    }
}

fn render_url(template: &str, id: &Id) -> String {
    template.replace("{id}", &id.to_string())
}

/// Read facility IDs from a file: comma or whitespace separated, `#` starts a comment.
pub fn load_facility_ids(path: &Path) -> Result<Vec<Id>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingPath {
        what: "facility ID file",
        path: path.to_path_buf(),
    })?;

    let mut ids = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let id = token.parse().map_err(|_| ConfigError::InvalidId {
                path: path.to_path_buf(),
                line: idx + 1,
                value: token.to_string(),
            })?;
            ids.push(id);
        }
    }
    Ok(ids)
}
