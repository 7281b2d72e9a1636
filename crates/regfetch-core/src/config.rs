use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact_ref::ArtifactRef;

/// Hosted registry API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.wandb.ai";

/// Environment variable that overrides `base_url` (same name the registry's own tooling reads).
pub const BASE_URL_ENV: &str = "WANDB_BASE_URL";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Configuration loaded from `~/.config/regfetch/config.toml`.
///
/// Every field has a default, so the file may set only what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Registry owner (user or team).
    pub entity: String,
    /// Registry name.
    pub project: String,
    /// Collection inside the registry.
    pub collection: String,
    /// Alias pointing at the version to fetch.
    pub alias: String,
    /// Member file to download from the artifact.
    pub filename: String,
    /// Registry API endpoint; `/graphql` is appended.
    pub base_url: String,
    /// Output directory; `None` means `<workspace>/assets`.
    pub output_dir: Option<PathBuf>,
    /// Write `model_metadata.json` next to the downloaded file.
    pub write_metadata: bool,
    pub connect_timeout_secs: u64,
    /// Total timeout for metadata queries. Downloads use a low-speed abort instead.
    pub request_timeout_secs: u64,
    /// Optional retry policy; if missing, a single attempt is made.
    pub retry: Option<RetryConfig>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            entity: "daniele5".to_string(),
            project: "model-registry".to_string(),
            collection: "thumbnail-classifier".to_string(),
            alias: "production".to_string(),
            filename: "model.onnx".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: None,
            write_metadata: false,
            connect_timeout_secs: 30,
            request_timeout_secs: 60,
            retry: None,
        }
    }
}

impl FetchConfig {
    /// Fully-qualified reference `entity/project/collection:alias`.
    pub fn reference(&self) -> ArtifactRef {
        ArtifactRef::new(&self.entity, &self.project, &self.collection, &self.alias)
    }

    /// Directory the file is written into.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_assets_dir)
    }

    /// Apply environment overrides. Takes the values rather than reading the
    /// process environment so callers (and tests) decide where they come from.
    pub fn apply_env_overrides(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!("base_url overridden by {}: {}", BASE_URL_ENV, url);
            self.base_url = url.trim().to_string();
        }
    }
}

/// `assets/` at the workspace root, next to the sources of this tool.
pub fn default_assets_dir() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .ancestors()
        .nth(2)
        .unwrap_or(manifest)
        .join("assets")
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("regfetch")?;
    Ok(xdg_dirs
        .get_config_home()
        .join("regfetch")
        .join("config.toml"))
}

/// Load configuration from disk if present, otherwise built-in defaults.
/// The file is never created; `WANDB_BASE_URL` is applied on top.
pub fn load_or_default() -> Result<FetchConfig> {
    let path = config_path()?;
    let mut cfg = load_from_path(&path)?.unwrap_or_default();
    cfg.apply_env_overrides(std::env::var(BASE_URL_ENV).ok());
    Ok(cfg)
}

/// Parse config at `path`; `Ok(None)` if the file does not exist.
pub fn load_from_path(path: &Path) -> Result<Option<FetchConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    tracing::info!("loaded config from {}", path.display());
    Ok(Some(cfg))
}
