//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use carecheck_core::{HttpConfig, RetryPolicy};
use carecheck_utah::Id;
use carecheck_utah::config::{DEFAULT_CHECKLIST_URL, DEFAULT_FACILITY_URL};
use serde::Deserialize;

/// Global configuration for carecheck
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub http: HttpSection,
    pub utah: UtahSection,
    pub output: OutputSection,
    pub ocr: OcrSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Total download attempts
    pub max_attempts: u32,
    /// Pause after a read timeout
    pub timeout_delay_secs: u64,
    /// Pause after any other failure
    pub error_delay_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            timeout_secs: HttpConfig::default().timeout.as_secs(),
            max_attempts: retry.max_attempts,
            timeout_delay_secs: retry.timeout_delay.as_secs(),
            error_delay_secs: retry.error_delay.as_secs(),
            user_agent: None,
        }
    }
}

impl HttpSection {
    pub fn http_config(&self, timeout_override: Option<u64>) -> HttpConfig {
        let mut http = HttpConfig {
            timeout: Duration::from_secs(timeout_override.unwrap_or(self.timeout_secs)),
            ..Default::default()
        };
        if let Some(agent) = &self.user_agent {
            http.user_agent = agent.clone();
        }
        http
    }

    pub fn retry_policy(&self, max_attempts_override: Option<u32>) -> RetryPolicy {
        RetryPolicy {
            max_attempts: max_attempts_override.unwrap_or(self.max_attempts).max(1),
            timeout_delay: Duration::from_secs(self.timeout_delay_secs),
            error_delay: Duration::from_secs(self.error_delay_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UtahSection {
    pub facility_url: String,
    pub checklist_url: String,
    /// Facility IDs used when neither `--ids` nor an ID file is given
    pub ids: Vec<Id>,
    pub ids_file: Option<PathBuf>,
    pub max_inspections: usize,
    pub max_checklists: usize,
    /// Pause between facilities
    pub request_delay_ms: u64,
}

impl Default for UtahSection {
    fn default() -> Self {
        let defaults = carecheck_utah::Config::default();
        Self {
            facility_url: DEFAULT_FACILITY_URL.to_string(),
            checklist_url: DEFAULT_CHECKLIST_URL.to_string(),
            ids: Vec::new(),
            ids_file: None,
            max_inspections: defaults.max_inspections,
            max_checklists: defaults.max_checklists,
            request_delay_ms: defaults.request_delay.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
    /// Aggregated JSON, relative to `dir`
    pub json_file: PathBuf,
    /// Checklist PDFs, relative to `dir`
    pub checklist_dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            json_file: PathBuf::from("ut_reports_with_ocr.json"),
            checklist_dir: PathBuf::from("checklists"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrSection {
    pub enabled: bool,
    /// Directory holding the `.rten` models; `${VAR}` is expanded
    #[serde(deserialize_with = "deserialize_env_path")]
    pub model_dir: Option<PathBuf>,
    pub dpi: u32,
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            enabled: true,
            model_dir: std::env::var_os("CARECHECK_OCR_MODELS").map(PathBuf::from),
            dpi: carecheck_extract::extractor::DEFAULT_DPI,
        }
    }
}

/// Deserialize a path that may be an environment variable reference like ${VAR}
fn deserialize_env_path<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)).map(PathBuf::from))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./carecheck.toml (current directory)
    /// 2. ~/.config/carecheck/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("carecheck.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "carecheck") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn json_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.output.json_file)
    }

    pub fn checklist_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.output.checklist_dir)
    }
}
