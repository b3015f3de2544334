//! HTTP GET with a per-request timeout.
//!
//! Uses async reqwest internally on a shared tokio runtime, but presents a
//! sync interface: the pipelines are single-threaded batch jobs.

use std::sync::LazyLock;
use std::time::Duration;

use crate::error::FetchError;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw response bodies.
///
/// The production implementation is [`HttpFetcher`]; pipelines take `&dyn Fetch`
/// so they can run against a scripted transport.
pub trait Fetch {
    /// GET `url` and return the full body. Any non-success status is an error.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Transport settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout; a stalled response surfaces as [`FetchError::Timeout`]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("carecheck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Blocking HTTP fetcher backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| FetchError::from_reqwest(&e))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        SHARED_RUNTIME.handle().block_on(async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("error").to_string(),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::from_reqwest(&e))?;
            Ok(body.to_vec())
        })
    }
}
