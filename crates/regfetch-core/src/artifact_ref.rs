//! Fully-qualified artifact references: `entity/project/collection:alias`.

use std::fmt;
use std::str::FromStr;

use crate::error::FetchError;

/// Points at one artifact version through an alias (or a `vN` version tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub entity: String,
    pub project: String,
    pub collection: String,
    pub alias: String,
}

impl ArtifactRef {
    pub fn new(entity: &str, project: &str, collection: &str, alias: &str) -> Self {
        Self {
            entity: entity.to_string(),
            project: project.to_string(),
            collection: collection.to_string(),
            alias: alias.to_string(),
        }
    }

    /// `collection:alias`, the name the registry resolves within a project.
    pub fn versioned_name(&self) -> String {
        format!("{}:{}", self.collection, self.alias)
    }

    /// Same artifact, different alias.
    pub fn with_alias(&self, alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}:{}",
            self.entity, self.project, self.collection, self.alias
        )
    }
}

impl FromStr for ArtifactRef {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| FetchError::InvalidReference {
            input: s.to_string(),
            reason,
        };

        let (path, alias) = s.rsplit_once(':').ok_or_else(|| invalid("missing ':alias'"))?;
        let parts: Vec<&str> = path.split('/').map(str::trim).collect();
        let [entity, project, collection] = parts[..] else {
            return Err(invalid("expected entity/project/collection"));
        };
        let alias = alias.trim();
        let components = [entity, project, collection, alias];
        if components.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty component"));
        }
        if components.iter().any(|p| p.contains(char::is_whitespace)) {
            return Err(invalid("whitespace inside component"));
        }
        if alias.contains('/') || collection.contains(':') {
            return Err(invalid("misplaced separator"));
        }
        Ok(Self::new(entity, project, collection, alias))
    }
}
