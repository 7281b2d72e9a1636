//! Single-file download into the output directory.
//!
//! The body is streamed into `<dest>.part` and renamed onto `dest` only after
//! the transfer succeeded and the size matches what the registry reported,
//! so a failed run leaves no file behind.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use crate::checksum;
use crate::error::{FetchError, Result};
use crate::http::{self, BasicAuth, TransferOptions};
use crate::retry::run_with_retry;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `model.onnx` → `model.onnx.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Local path for artifact member `name` under `root`.
///
/// Member names use `/` separators and may be nested; absolute names and
/// `..` components are rejected so nothing lands outside `root`.
pub fn local_path(root: &Path, name: &str) -> Result<PathBuf> {
    let unsafe_path = || FetchError::UnsafePath {
        name: name.to_string(),
        root: root.to_path_buf(),
    };
    let mut out = root.to_path_buf();
    let mut pushed = false;
    for part in name.split('/').filter(|p| !p.is_empty()) {
        match Path::new(part).components().next() {
            Some(Component::Normal(c)) if Path::new(part).components().count() == 1 => {
                out.push(c);
                pushed = true;
            }
            Some(Component::CurDir) => {}
            _ => return Err(unsafe_path()),
        }
    }
    if name.starts_with('/') || !pushed {
        return Err(unsafe_path());
    }
    Ok(out)
}

/// A file that made it onto its final path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub bytes: u64,
    /// SHA-256 of the bytes, computed before the rename.
    pub sha256: String,
}

/// Download `url` to `dest`.
///
/// `expected_len`, when known, must match the received byte count. Every
/// check (size, hash) runs against the temp file, so `dest` only appears
/// once nothing else can fail.
pub fn download_to(
    url: &str,
    dest: &Path,
    auth: Option<&BasicAuth<'_>>,
    expected_len: Option<u64>,
    opts: &TransferOptions,
) -> Result<Downloaded> {
    let tmp = temp_path(dest);
    let result = download_via_temp(url, dest, &tmp, auth, expected_len, opts);
    if result.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            tracing::warn!("could not remove {}: {}", tmp.display(), e);
        }
    }
    result
}

fn download_via_temp(
    url: &str,
    dest: &Path,
    tmp: &Path,
    auth: Option<&BasicAuth<'_>>,
    expected_len: Option<u64>,
    opts: &TransferOptions,
) -> Result<Downloaded> {
    let mut file =
        File::create(tmp).map_err(|e| FetchError::io(format!("create {}", tmp.display()), e))?;

    tracing::debug!(url, dest = %dest.display(), "starting download");
    let written = run_with_retry(&opts.retry, || http::get_to_file(url, auth, &mut file, opts))
        .map_err(|e| FetchError::from_request("GET", redact_query(url), e))?;

    if let Some(expected) = expected_len {
        if written != expected {
            return Err(FetchError::SizeMismatch {
                file: dest.display().to_string(),
                expected,
                received: written,
            });
        }
    }

    file.sync_all()
        .map_err(|e| FetchError::io(format!("sync {}", tmp.display()), e))?;
    drop(file);
    let sha256 = checksum::sha256_path(tmp).map_err(|e| FetchError::Checksum {
        path: tmp.to_path_buf(),
        reason: format!("{:#}", e),
    })?;

    fs::rename(tmp, dest).map_err(|e| {
        FetchError::io(
            format!("rename {} -> {}", tmp.display(), dest.display()),
            e,
        )
    })?;
    tracing::info!(bytes = written, %sha256, "downloaded {}", dest.display());
    Ok(Downloaded {
        bytes: written,
        sha256,
    })
}

/// Signed URLs carry credentials in the query string; keep them out of error messages.
fn redact_query(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}
