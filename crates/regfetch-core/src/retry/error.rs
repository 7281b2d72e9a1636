//! Transport error type for retry classification.

use std::fmt;

/// Error returned by a single HTTP exchange (curl failure, HTTP status, or local write).
/// Kept separate from `FetchError` so the retry loop can classify before conversion.
#[derive(Debug)]
pub enum RequestError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Writing the response body to disk failed. Not retried.
    Storage(std::io::Error),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Curl(e) => write!(f, "{}", e),
            RequestError::Http(code) => write!(f, "HTTP {}", code),
            RequestError::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Curl(e) => Some(e),
            RequestError::Storage(e) => Some(e),
            RequestError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for RequestError {
    fn from(e: curl::Error) -> Self {
        RequestError::Curl(e)
    }
}
