//! Error taxonomy for registry lookup and download.
//!
//! The CLI treats every variant as fatal; the variants exist so callers and
//! tests can tell failures apart and so the retry classifier has something
//! to work with before errors collapse into `anyhow` at the top.

use std::path::PathBuf;
use thiserror::Error;

use crate::retry::RequestError;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Reference string is not `entity/project/collection:alias`.
    #[error("invalid artifact reference {input:?}: {reason}")]
    InvalidReference { input: String, reason: &'static str },

    #[error("invalid registry URL {0:?}")]
    InvalidUrl(String),

    /// No API key in the environment or netrc.
    #[error("no API key for {host}: set WANDB_API_KEY or add a netrc entry")]
    MissingCredentials { host: String },

    /// Registry rejected the API key (HTTP 401/403).
    #[error("registry rejected credentials (HTTP {0})")]
    Unauthorized(u32),

    /// Project or artifact alias did not resolve.
    #[error("artifact {0} not found")]
    NotFound(String),

    /// Artifact resolved but has no member with the requested name.
    #[error("artifact {artifact} has no file named {file:?}")]
    MissingFile { artifact: String, file: String },

    /// GraphQL `errors` array in an otherwise successful response.
    #[error("registry query failed: {0}")]
    Graphql(String),

    /// Non-2xx response from the registry or file host.
    #[error("{method} {url} returned HTTP {code}")]
    Http {
        method: &'static str,
        url: String,
        code: u32,
    },

    /// libcurl failure (connect, DNS, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// Downloaded byte count differs from the size the registry reported.
    #[error("size mismatch for {file}: expected {expected} bytes, got {received}")]
    SizeMismatch {
        file: String,
        expected: u64,
        received: u64,
    },

    /// Member name would escape the output directory.
    #[error("refusing to write {name:?} outside {}", root.display())]
    UnsafePath { name: String, root: PathBuf },

    #[error("could not hash {}: {reason}", path.display())]
    Checksum { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Response body was not the JSON shape we expect.
    #[error("could not decode registry response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;

impl FetchError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        FetchError::Io {
            context: context.into(),
            source,
        }
    }

    /// Map a transport-level failure from `method url` into the taxonomy.
    pub(crate) fn from_request(method: &'static str, url: &str, e: RequestError) -> Self {
        match e {
            RequestError::Http(code @ (401 | 403)) => FetchError::Unauthorized(code),
            RequestError::Http(code) => FetchError::Http {
                method,
                url: url.to_string(),
                code,
            },
            RequestError::Curl(source) => FetchError::Transport {
                url: url.to_string(),
                source,
            },
            RequestError::Storage(source) => FetchError::io(format!("write {}", url), source),
        }
    }
}
