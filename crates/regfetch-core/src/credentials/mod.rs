//! API key resolution.
//!
//! Looks in the same places the registry's own tooling does: the
//! `WANDB_API_KEY` environment variable first, then the netrc entry for the
//! API host.

mod netrc;

pub use netrc::lookup as netrc_lookup;

use std::fs;
use std::path::PathBuf;

use crate::error::{FetchError, Result};

pub const API_KEY_ENV: &str = "WANDB_API_KEY";

/// Resolve the API key for `host` from the process environment and netrc file.
pub fn resolve_api_key(host: &str) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV).ok();
    let netrc_text = netrc_path().and_then(|p| match fs::read_to_string(&p) {
        Ok(text) => {
            tracing::debug!("read netrc from {}", p.display());
            Some(text)
        }
        Err(e) => {
            tracing::debug!("no usable netrc at {}: {}", p.display(), e);
            None
        }
    });
    resolve_from(env_key, netrc_text.as_deref(), host)
}

/// Pure resolution step: environment value wins, then netrc, else an error.
pub fn resolve_from(env_key: Option<String>, netrc_text: Option<&str>, host: &str) -> Result<String> {
    if let Some(key) = env_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        tracing::debug!("using API key from {}", API_KEY_ENV);
        return Ok(key);
    }
    if let Some(key) = netrc_text.and_then(|text| netrc::lookup(text, host)) {
        tracing::debug!("using API key from netrc entry for {}", host);
        return Ok(key);
    }
    Err(FetchError::MissingCredentials {
        host: host.to_string(),
    })
}

/// `$NETRC`, else `~/.netrc`.
fn netrc_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os("NETRC").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(p));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".netrc"))
}
