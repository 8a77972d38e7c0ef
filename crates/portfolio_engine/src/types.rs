use std::fmt;

use portfolio_core::{LoadGeneration, LoadSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: FailureKind,
    pub message: String,
}

impl RemoteError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for RemoteError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    NotConfigured,
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    NotFound,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NotConfigured => write!(f, "backend not configured"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::NotFound => write!(f, "no matching row"),
            FailureKind::TooLarge { max_bytes, .. } => write!(f, "larger than {max_bytes} bytes"),
        }
    }
}

/// What a load reports back to the view, tagged with the generation that started it.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent<R> {
    Rendered {
        generation: LoadGeneration,
        source: LoadSource,
        records: Vec<R>,
    },
    Failed {
        generation: LoadGeneration,
        error: RemoteError,
    },
}

/// How a single load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Live { count: usize },
    Degraded { shown: LoadSource, error: RemoteError },
    Cancelled,
}
