//! Error types shared by the pipelines

use std::path::PathBuf;

/// How a failed request should be treated by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server stopped sending data in time.
    Timeout,
    /// Anything else: connection errors, non-success status codes, body errors.
    Other,
}

/// Transient transport error from a single HTTP request.
///
/// Never fatal on its own: the retry loop downgrades exhaustion to an absent result.
#[derive(Debug)]
pub enum FetchError {
    /// Read timeout while waiting for the response
    Timeout { message: String },
    /// Server answered with a non-success status
    Status { status: u16, message: String },
    /// Connection, TLS or body transfer failure
    Transport { message: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { message } => write!(f, "timeout: {message}"),
            Self::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Transport { message } => write!(f, "HTTP error: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Classify a reqwest error.
    ///
    /// Connect timeouts count as ordinary transport failures; only a stalled
    /// response is a [`FailureKind::Timeout`].
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        let message = e.to_string();
        if e.is_timeout() && !e.is_connect() {
            Self::Timeout { message }
        } else if let Some(status) = e.status() {
            Self::Status {
                status: status.as_u16(),
                message,
            }
        } else {
            Self::Transport { message }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Status { .. } | Self::Transport { .. } => FailureKind::Other,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Startup configuration problem. Fatal: reported before any network activity.
#[derive(Debug)]
pub enum ConfigError {
    /// No facility IDs configured
    NoFacilityIds,
    /// A required local file or directory does not exist
    MissingPath { what: &'static str, path: PathBuf },
    /// OCR is on but no model directory was given and none can be derived
    NoModelDir,
    /// A facility ID list entry could not be parsed
    InvalidId {
        path: PathBuf,
        line: usize,
        value: String,
    },
    /// A URL template lacks the `{id}` placeholder
    UrlTemplate { name: &'static str, template: String },
    /// Output location cannot be created
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFacilityIds => write!(f, "no facility IDs configured"),
            Self::MissingPath { what, path } => {
                write!(f, "{what} not found: {}", path.display())
            }
            Self::NoModelDir => write!(
                f,
                "no OCR model directory; set --models, [ocr] model_dir or CARECHECK_OCR_MODELS"
            ),
            Self::InvalidId { path, line, value } => write!(
                f,
                "{}:{line}: invalid facility ID {value:?}",
                path.display()
            ),
            Self::UrlTemplate { name, template } => {
                write!(f, "{name} must contain {{id}}: {template}")
            }
            Self::OutputDir { path, source } => {
                write!(f, "cannot create {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OutputDir { source, .. } => Some(source),
            _ => None,
        }
    }
}
