//! libcurl transfers: JSON POST for registry queries, streamed GET for files.
//!
//! Both run on the calling thread and return `RequestError` so the retry
//! loop can classify failures before they become `FetchError`s.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::time::Duration;

use curl::easy::{Easy, List};

use crate::config::FetchConfig;
use crate::retry::{RequestError, RetryPolicy};

const USER_AGENT: &str = concat!("regfetch/", env!("CARGO_PKG_VERSION"));

/// Timeouts and retry budget shared by every request of one run.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    pub connect_timeout: Duration,
    /// Whole-request timeout for metadata queries.
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for TransferOptions {
    fn default() -> Self {
        TransferOptions::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for TransferOptions {
    fn from(cfg: &FetchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
            retry: cfg
                .retry
                .as_ref()
                .map(RetryPolicy::from)
                .unwrap_or_default(),
        }
    }
}

/// HTTP basic credentials. The registry expects user `api` and the API key as password.
#[derive(Clone, Copy)]
pub struct BasicAuth<'a> {
    pub user: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for BasicAuth<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn base_handle(url: &str, auth: Option<&BasicAuth<'_>>, opts: &TransferOptions) -> Result<Easy, RequestError> {
    let mut easy = Easy::new();
    easy.url(url)?;
    easy.useragent(USER_AGENT)?;
    easy.connect_timeout(opts.connect_timeout)?;
    if let Some(auth) = auth {
        easy.username(auth.user)?;
        easy.password(auth.password)?;
    }
    Ok(easy)
}

fn check_status(easy: &mut Easy) -> Result<(), RequestError> {
    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(RequestError::Http(code));
    }
    Ok(())
}

/// POST `body` as JSON and return the response body.
pub fn post_json(
    url: &str,
    auth: &BasicAuth<'_>,
    body: &[u8],
    opts: &TransferOptions,
) -> Result<Vec<u8>, RequestError> {
    let mut easy = base_handle(url, Some(auth), opts)?;
    easy.timeout(opts.request_timeout)?;
    easy.post(true)?;
    easy.post_fields_copy(body)?;

    let mut list = List::new();
    list.append("Content-Type: application/json")?;
    list.append("Accept: application/json")?;
    // No 100-continue round trip for small bodies.
    list.append("Expect:")?;
    easy.http_headers(list)?;

    let mut response = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            response.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    check_status(&mut easy)?;
    Ok(response)
}

/// GET `url` into `file`, truncating it first. Returns the number of bytes written.
///
/// Follows redirects; libcurl does not forward credentials to a different host.
/// Aborts when throughput stays under 1 KiB/s for a minute instead of using a total timeout.
pub fn get_to_file(
    url: &str,
    auth: Option<&BasicAuth<'_>>,
    file: &mut File,
    opts: &TransferOptions,
) -> Result<u64, RequestError> {
    file.set_len(0).map_err(RequestError::Storage)?;
    file.seek(SeekFrom::Start(0)).map_err(RequestError::Storage)?;

    let mut easy = base_handle(url, auth, opts)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;

    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(RequestError::Storage(e));
    }
    performed?;
    check_status(&mut easy)?;
    Ok(written)
}
