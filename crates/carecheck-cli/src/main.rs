//! carecheck - childcare inspection checklist scraper
//!
//! Fetches facility inspections from the Utah Child Care Licensing public API,
//! downloads each inspection checklist, and extracts census, contact person
//! and licensor from it, with OCR for scanned forms.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use cmd::fetch::HttpOverrides;
use config::Config;

#[derive(Parser)]
#[command(name = "carecheck")]
#[command(about = "Childcare inspection checklist scraper")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./carecheck.toml or ~/.config/carecheck/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Download attempts per URL, including the first
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch facilities and extract their inspection checklists
    Fetch(cmd::fetch::FetchArgs),
    /// Re-run extraction over a directory of saved checklist PDFs
    Extract(cmd::extract::ExtractArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(carecheck_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug; progress bars show activity
    //   non-TTY: info unless --debug; logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    carecheck_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    let overrides = HttpOverrides {
        timeout: cli.timeout,
        max_attempts: cli.max_attempts,
    };

    match cli.command {
        Command::Fetch(args) => cmd::fetch::run(args, &config, overrides, &progress),
        Command::Extract(args) => cmd::extract::run(args, &config),
        Command::Config => {
            let http = config.http.http_config(overrides.timeout);
            let retry = config.http.retry_policy(overrides.max_attempts);
            let ids = match &config.utah.ids_file {
                Some(path) => format!("file {}", path.display()),
                None => format!("{} in config", config.utah.ids.len()),
            };

            cmd::print_summary(
                "Setting",
                &[
                    ("Facility URL", config.utah.facility_url.clone()),
                    ("Checklist URL", config.utah.checklist_url.clone()),
                    ("Facility IDs", ids),
                    ("Max inspections", config.utah.max_inspections.to_string()),
                    ("Max checklists", config.utah.max_checklists.to_string()),
                    ("Request delay", format!("{}ms", config.utah.request_delay_ms)),
                    ("Output directory", config.output.dir.display().to_string()),
                    ("JSON file", config.output.json_file.display().to_string()),
                    ("Checklist directory", config.output.checklist_dir.display().to_string()),
                    ("Timeout", format!("{}s", http.timeout.as_secs())),
                    ("User agent", http.user_agent),
                    (
                        "Retry",
                        format!(
                            "{} attempts ({}s after timeout, {}s after error)",
                            retry.max_attempts,
                            retry.timeout_delay.as_secs(),
                            retry.error_delay.as_secs()
                        ),
                    ),
                    (
                        "OCR",
                        if cfg!(feature = "ocr") && config.ocr.enabled {
                            format!("enabled ({} dpi)", config.ocr.dpi)
                        } else {
                            "disabled".to_string()
                        },
                    ),
                    (
                        "OCR models",
                        config
                            .ocr
                            .model_dir
                            .as_ref()
                            .map_or_else(|| "default".to_string(), |p| p.display().to_string()),
                    ),
                ],
            );
            Ok(())
        }
    }
}
