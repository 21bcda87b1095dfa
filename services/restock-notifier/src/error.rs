use thiserror::Error;

pub type RestockResult<T> = Result<T, RestockError>;

/// Failure retrieving the catalog from the commerce backend.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("catalog request failed: {0}")]
    Request(String),
    #[error("catalog request rejected with status {status}; check shop credentials")]
    Unauthorized { status: u16 },
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("catalog response is not valid JSON: {0}")]
    Decode(String),
}

/// The catalog decoded but its shape does not match Catalog/Product/Variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed catalog document at {path}: {reason}")]
pub struct MalformedDocument {
    pub path: String,
    pub reason: String,
}

impl MalformedDocument {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Notification sink failed to accept the low-stock message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("notification rejected with status {status}")]
    Rejected { status: u16 },
}

/// Errors that abort an invocation. Dispatch failures never appear here.
#[derive(Debug, Error)]
pub enum RestockError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Malformed(#[from] MalformedDocument),
}

impl RestockError {
    /// Metric label for the aborted invocation.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            RestockError::Fetch(_) => "fetch_failed",
            RestockError::Malformed(_) => "malformed",
        }
    }
}
