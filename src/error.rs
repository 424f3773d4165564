use crate::config::LlmQueryKind;
use thiserror::Error;
use ustr::Ustr;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to send the backend request")]
    RequestError(#[from] reqwest::Error),

    #[error("failed to parse json")]
    ParseError(#[from] serde_json::Error),

    #[error("no usable data for indicator {slug}: {reason}")]
    FetchFailure { slug: Ustr, reason: String },

    #[error("maximum of {max} comparison indicators allowed")]
    CapacityExceeded { max: usize },

    #[error("comparison index {index} is out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0} is already in progress")]
    OperationPending(Ustr),

    #[error("invalid timeframe {0:?}")]
    InvalidTimeframe(String),

    #[error("{0} queries are not enabled for this dashboard")]
    LlmUnavailable(LlmQueryKind),

    #[error("llm backend rejected the query: {0}")]
    LlmRejected(String),

    #[error("backend answered with http status {status}")]
    HttpStatus { status: u16 },

    #[error("no nonce configured and ZC_DMT_NONCE is not set")]
    MissingNonce,

    #[error("no primary indicator loaded")]
    NoPrimarySeries,

    #[error("chart surface failed: {0}")]
    Surface(String),
}

impl Error {
    /// Failures worth another attempt: throttling and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::HttpStatus { status } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    pub(crate) fn fetch_failure(slug: Ustr, reason: impl Into<String>) -> Self {
        Error::FetchFailure {
            slug,
            reason: reason.into(),
        }
    }

    /// This error's message followed by each `source()`, joined with `": "`.
    pub fn with_causes(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
