//! carecheck Utah - Child Care Licensing inspection pipeline
//!
//! Fetches facility and inspection metadata from the Utah CCL public API,
//! downloads every inspection checklist, extracts census, contact person and
//! licensor from each one, and writes the nested records as a JSON array.
//!
//! # Example
//!
//! ```ignore
//! use carecheck_core::{HttpConfig, HttpFetcher, ProgressContext};
//! use carecheck_extract::Extractor;
//! use carecheck_utah::{Config, Id, run};
//!
//! let config = Config {
//!     facility_ids: vec![Id::Number(96697)],
//!     ..Default::default()
//! };
//! let fetcher = HttpFetcher::new(&HttpConfig::default())?;
//! let summary = run(&config, &fetcher, &Extractor::text_only(), &ProgressContext::new())?;
//! println!("Wrote {} facilities", summary.facilities_written);
//! ```

pub mod api;
pub mod config;
pub mod fetcher;
pub mod model;
pub mod runner;
pub mod worker;
pub mod writer;

// Re-exports
pub use config::{Config, load_facility_ids};
pub use model::{ChecklistResult, FacilityRecord, Finding, Id, InspectionRecord};
pub use runner::{Summary, run};
