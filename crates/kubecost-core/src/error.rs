//! Shared error type across kubecost crates.

use thiserror::Error;

/// Stable error codes, used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Envelope or record could not be decoded.
    Decode,
    /// A free-form label could not be rendered as text.
    Label,
    /// Upstream fetch failed or returned an unusable result.
    Scrape,
    /// A source exceeded its deadline.
    Timeout,
    /// Invalid configuration.
    Config,
    /// Internal failure (bind, serve).
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Decode => "DECODE",
            ErrorKind::Label => "LABEL",
            ErrorKind::Scrape => "SCRAPE",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, KubecostError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum KubecostError {
    #[error("decode: {0}")]
    Decode(String),
    #[error("label: {0}")]
    Label(String),
    #[error("scrape: {0}")]
    Scrape(String),
    #[error("timed out after {0} ms")]
    Timeout(u64),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl KubecostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KubecostError::Decode(_) => ErrorKind::Decode,
            KubecostError::Label(_) => ErrorKind::Label,
            KubecostError::Scrape(_) => ErrorKind::Scrape,
            KubecostError::Timeout(_) => ErrorKind::Timeout,
            KubecostError::Config(_) => ErrorKind::Config,
            KubecostError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for KubecostError {
    fn from(e: serde_json::Error) -> Self {
        KubecostError::Decode(e.to_string())
    }
}
