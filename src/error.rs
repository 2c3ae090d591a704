//! Error types for propagation requests.

/// Propagation errors
///
/// A `TleFormat` error is fatal only for the object it was raised for; batch
/// callers keep processing sibling objects. `InvalidRequest` is raised at the
/// request boundary before any orbital math runs.
#[derive(Debug, Clone)]
pub enum PropagationError {
    TleFormat(String),
    InvalidRequest(String),
}

impl std::fmt::Display for PropagationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropagationError::TleFormat(msg) => write!(f, "TLE format error: {}", msg),
            PropagationError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for PropagationError {}
