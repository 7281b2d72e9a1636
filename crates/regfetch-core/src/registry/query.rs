//! GraphQL documents and response shapes for the registry API.

use serde::{Deserialize, Serialize};

pub(super) const ARTIFACT_BY_NAME: &str = r#"query ArtifactByName($entityName: String!, $projectName: String!, $name: String!) {
  project(name: $projectName, entityName: $entityName) {
    artifact(name: $name) {
      id
      digest
      state
      size
      versionIndex
      artifactType { name }
      artifactSequence { name }
      aliases { alias }
    }
  }
}"#;

pub(super) const ARTIFACT_FILES: &str = r#"query ArtifactFiles($id: ID!, $fileNames: [String!]) {
  artifact(id: $id) {
    files(names: $fileNames) {
      edges {
        node { name directUrl url sizeBytes digest }
      }
    }
  }
}"#;

#[derive(Debug, Serialize)]
pub(super) struct Request<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ArtifactByNameVars<'a> {
    pub entity_name: &'a str,
    pub project_name: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ArtifactFilesVars<'a> {
    pub id: &'a str,
    pub file_names: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub(super) struct Response<D> {
    pub data: Option<D>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEntry {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArtifactByNameData {
    pub project: Option<ProjectNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProjectNode {
    pub artifact: Option<ArtifactNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ArtifactNode {
    pub id: String,
    pub digest: Option<String>,
    pub state: Option<String>,
    pub size: Option<u64>,
    pub version_index: Option<u32>,
    pub artifact_type: Option<NamedNode>,
    pub artifact_sequence: Option<NamedNode>,
    #[serde(default)]
    pub aliases: Vec<AliasNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NamedNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AliasNode {
    pub alias: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArtifactFilesData {
    pub artifact: Option<FilesArtifactNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FilesArtifactNode {
    pub files: FileConnection,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileConnection {
    #[serde(default)]
    pub edges: Vec<FileEdge>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileEdge {
    pub node: Option<FileNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FileNode {
    pub name: String,
    pub direct_url: Option<String>,
    pub url: Option<String>,
    pub size_bytes: Option<u64>,
    pub digest: Option<String>,
}
