//! Retry and backoff policy for registry requests.
//!
//! Classifies transport failures (timeouts, throttling, connection resets,
//! 5xx) and computes capped exponential backoff. The default policy makes a
//! single attempt; `[retry]` in config.toml raises the attempt budget.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::RequestError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
