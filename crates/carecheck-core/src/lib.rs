//! carecheck core - shared infrastructure for inspection scrapers
//!
//! HTTP transport with a sync facade, fixed-delay retry, error types,
//! logging and progress reporting used by the state pipelines.

pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;

// Re-exports for convenience
pub use error::{ConfigError, FailureKind, FetchError};
pub use http::{Fetch, HttpConfig, HttpFetcher, SHARED_RUNTIME};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress};
pub use retry::{RetryDecision, RetryPolicy, download_with_retry};
