//! The fetch procedure: resolve alias, ensure output dir, download one file.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact_ref::ArtifactRef;
use crate::config::FetchConfig;
use crate::download;
use crate::error::{FetchError, Result};
use crate::registry::{ArtifactFile, ArtifactInfo, RegistryClient};

/// Written next to the model when metadata output is on; the inference page reads `version`.
pub const METADATA_FILENAME: &str = "model_metadata.json";

/// What to fetch and where to put it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub reference: ArtifactRef,
    pub filename: String,
    pub output_dir: PathBuf,
    pub write_metadata: bool,
}

impl FetchRequest {
    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self {
            reference: cfg.reference(),
            filename: cfg.filename.clone(),
            output_dir: cfg.resolved_output_dir(),
            write_metadata: cfg.write_metadata,
        }
    }
}

/// Progress notifications, in order. The CLI turns these into status lines.
#[derive(Debug)]
pub enum FetchEvent<'a> {
    Resolving { reference: &'a ArtifactRef },
    Found { artifact: &'a ArtifactInfo },
    Downloading { filename: &'a str, dest: &'a Path },
    Saved { path: &'a Path, bytes: u64 },
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub artifact: ArtifactInfo,
    pub file: ArtifactFile,
    pub path: PathBuf,
    pub bytes_written: u64,
    pub sha256: String,
    pub metadata_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ModelMetadata<'a> {
    version: String,
    artifact: &'a str,
    id: &'a str,
    alias: &'a str,
    file: &'a str,
    sha256: &'a str,
    size_bytes: u64,
}

/// Run the whole procedure. Any error is terminal; on error no file is left at the target path.
///
/// The file is hashed before it is renamed into place. If the metadata file
/// cannot be written afterwards, the freshly saved file is removed again.
pub fn fetch<F>(client: &RegistryClient, req: &FetchRequest, mut on_event: F) -> Result<FetchOutcome>
where
    F: FnMut(FetchEvent<'_>),
{
    on_event(FetchEvent::Resolving {
        reference: &req.reference,
    });
    let artifact = client.artifact(&req.reference)?;
    on_event(FetchEvent::Found {
        artifact: &artifact,
    });

    ensure_dir(&req.output_dir)?;
    let dest = download::local_path(&req.output_dir, &req.filename)?;
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    on_event(FetchEvent::Downloading {
        filename: &req.filename,
        dest: &dest,
    });
    let file = client.file(&artifact, &req.filename)?;
    let auth = client.auth_for(&file.download_url);
    let download::Downloaded {
        bytes: bytes_written,
        sha256,
    } = download::download_to(
        &file.download_url,
        &dest,
        auth.as_ref(),
        file.size_bytes,
        client.options(),
    )?;
    tracing::info!(artifact = %artifact.name, %sha256, "saved {}", dest.display());

    let metadata_path = if req.write_metadata {
        match write_metadata(req, &artifact, &file, &sha256, bytes_written) {
            Ok(path) => Some(path),
            Err(e) => {
                discard(&dest);
                return Err(e);
            }
        }
    } else {
        None
    };

    on_event(FetchEvent::Saved {
        path: &dest,
        bytes: bytes_written,
    });

    Ok(FetchOutcome {
        artifact,
        file,
        path: dest,
        bytes_written,
        sha256,
        metadata_path,
    })
}

/// Remove a file this run already put in place; the run is failing anyway.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!("could not remove {}: {}", path.display(), e);
    }
}

/// Create `dir` (and parents) if absent; an existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| FetchError::io(format!("create {}", dir.display()), e))
}

fn write_metadata(
    req: &FetchRequest,
    artifact: &ArtifactInfo,
    file: &ArtifactFile,
    sha256: &str,
    size_bytes: u64,
) -> Result<PathBuf> {
    let meta = ModelMetadata {
        version: artifact
            .version()
            .unwrap_or_else(|| req.reference.alias.clone()),
        artifact: &artifact.name,
        id: &artifact.id,
        alias: &req.reference.alias,
        file: &file.name,
        sha256,
        size_bytes,
    };
    let path = req.output_dir.join(METADATA_FILENAME);
    let json = serde_json::to_vec_pretty(&meta)?;
    fs::write(&path, json).map_err(|e| FetchError::io(format!("write {}", path.display()), e))?;
    tracing::debug!("wrote {}", path.display());
    Ok(path)
}
