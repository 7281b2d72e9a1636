//! Registry API client.
//!
//! Talks to `<base_url>/graphql` with HTTP basic auth (`api:<key>`). Two
//! queries are enough: resolve `collection:alias` inside a project to an
//! artifact version, then look up one member file of that version.

mod query;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::artifact_ref::ArtifactRef;
use crate::config::FetchConfig;
use crate::credentials;
use crate::error::{FetchError, Result};
use crate::http::{self, BasicAuth, TransferOptions};
use crate::retry::run_with_retry;

use query::{
    ArtifactByNameData, ArtifactByNameVars, ArtifactFilesData, ArtifactFilesVars, Request,
    Response, ARTIFACT_BY_NAME, ARTIFACT_FILES,
};

const AUTH_USER: &str = "api";

/// Resolved artifact version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// Opaque registry ID.
    pub id: String,
    /// `collection:vN`.
    pub name: String,
    pub version_index: Option<u32>,
    pub digest: Option<String>,
    pub state: Option<String>,
    pub size: Option<u64>,
    pub type_name: Option<String>,
    pub aliases: Vec<String>,
}

impl ArtifactInfo {
    /// `vN` when the registry reported a version index.
    pub fn version(&self) -> Option<String> {
        self.version_index.map(|i| format!("v{}", i))
    }
}

/// One member file of an artifact version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Path of the member inside the artifact (may contain `/`).
    pub name: String,
    pub download_url: String,
    pub size_bytes: Option<u64>,
    pub digest: Option<String>,
}

/// Blocking client for one registry endpoint.
pub struct RegistryClient {
    graphql_url: String,
    origin: url::Url,
    api_key: String,
    options: TransferOptions,
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("graphql_url", &self.graphql_url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RegistryClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, options: TransferOptions) -> Result<Self> {
        let graphql_url = format!("{}/graphql", base_url.trim().trim_end_matches('/'));
        let origin = url::Url::parse(&graphql_url)
            .ok()
            .filter(|u| u.host_str().is_some())
            .ok_or_else(|| FetchError::InvalidUrl(base_url.to_string()))?;
        Ok(Self {
            graphql_url,
            origin,
            api_key: api_key.into(),
            options,
        })
    }

    /// Client for `cfg.base_url`, with the API key taken from the environment or netrc.
    pub fn from_config(cfg: &FetchConfig) -> Result<Self> {
        let options = TransferOptions::from(cfg);
        let mut client = Self::new(&cfg.base_url, String::new(), options)?;
        client.api_key = credentials::resolve_api_key(client.host())?;
        Ok(client)
    }

    /// API host, used to pick the netrc entry.
    pub fn host(&self) -> &str {
        self.origin.host_str().unwrap_or_default()
    }

    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    fn auth(&self) -> BasicAuth<'_> {
        BasicAuth {
            user: AUTH_USER,
            password: &self.api_key,
        }
    }

    /// Credentials for downloading `url`: only when it points back at the API origin.
    /// Signed storage URLs on other hosts must not see the API key.
    pub fn auth_for(&self, url: &str) -> Option<BasicAuth<'_>> {
        let target = url::Url::parse(url).ok()?;
        let same_origin = target.scheme() == self.origin.scheme()
            && target.host_str() == self.origin.host_str()
            && target.port_or_known_default() == self.origin.port_or_known_default();
        same_origin.then(|| self.auth())
    }

    /// Resolve `entity/project/collection:alias` to an artifact version.
    pub fn artifact(&self, reference: &ArtifactRef) -> Result<ArtifactInfo> {
        let name = reference.versioned_name();
        let data: ArtifactByNameData = self.query(
            ARTIFACT_BY_NAME,
            ArtifactByNameVars {
                entity_name: &reference.entity,
                project_name: &reference.project,
                name: &name,
            },
        )?;
        let node = data
            .project
            .and_then(|p| p.artifact)
            .ok_or_else(|| FetchError::NotFound(reference.to_string()))?;

        let sequence = node
            .artifact_sequence
            .map(|s| s.name)
            .unwrap_or_else(|| reference.collection.clone());
        let name = match node.version_index {
            Some(i) => format!("{}:v{}", sequence, i),
            None => format!("{}:{}", sequence, reference.alias),
        };
        tracing::debug!(id = %node.id, %name, "resolved {}", reference);

        Ok(ArtifactInfo {
            id: node.id,
            name,
            version_index: node.version_index,
            digest: node.digest,
            state: node.state,
            size: node.size,
            type_name: node.artifact_type.map(|t| t.name),
            aliases: node.aliases.into_iter().map(|a| a.alias).collect(),
        })
    }

    /// Look up member `file_name` of `artifact`.
    pub fn file(&self, artifact: &ArtifactInfo, file_name: &str) -> Result<ArtifactFile> {
        let missing = || FetchError::MissingFile {
            artifact: artifact.name.clone(),
            file: file_name.to_string(),
        };
        let data: ArtifactFilesData = self.query(
            ARTIFACT_FILES,
            ArtifactFilesVars {
                id: &artifact.id,
                file_names: [file_name],
            },
        )?;
        let artifact_node = data
            .artifact
            .ok_or_else(|| FetchError::NotFound(artifact.name.clone()))?;

        // The names filter is advisory on some server versions; match exactly.
        let node = artifact_node
            .files
            .edges
            .into_iter()
            .filter_map(|e| e.node)
            .find(|n| n.name == file_name)
            .ok_or_else(missing)?;
        let download_url = node
            .direct_url
            .or(node.url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| FetchError::Graphql(format!("no download URL for {}", node.name)))?;

        Ok(ArtifactFile {
            name: node.name,
            download_url,
            size_bytes: node.size_bytes,
            digest: node.digest,
        })
    }

    fn query<V, D>(&self, document: &str, variables: V) -> Result<D>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        let body = serde_json::to_vec(&Request {
            query: document,
            variables,
        })?;
        let auth = self.auth();
        let bytes = run_with_retry(&self.options.retry, || {
            http::post_json(&self.graphql_url, &auth, &body, &self.options)
        })
        .map_err(|e| FetchError::from_request("POST", &self.graphql_url, e))?;

        let response: Response<D> = serde_json::from_slice(&bytes)?;
        if !response.errors.is_empty() {
            let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(FetchError::Graphql(messages.join("; ")));
        }
        response
            .data
            .ok_or_else(|| FetchError::Graphql("response carried no data".to_string()))
    }
}
