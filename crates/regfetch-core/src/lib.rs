pub mod config;
pub mod logging;

pub mod artifact_ref;
pub mod checksum;
pub mod credentials;
pub mod download;
pub mod error;
pub mod fetch;
pub mod http;
pub mod registry;
pub mod retry;

pub use artifact_ref::ArtifactRef;
pub use error::{FetchError, Result};
pub use fetch::{fetch, FetchEvent, FetchOutcome, FetchRequest};
pub use registry::{ArtifactFile, ArtifactInfo, RegistryClient};
