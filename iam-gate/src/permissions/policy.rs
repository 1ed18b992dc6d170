use http::Method;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Failed to read policy file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse policy file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Permission matrix: `METHOD + route template` => allowed permission tokens.
///
/// ```yaml
/// permissions:
///   "GET/api/v1/admin/actionLog": ["view:log", "admin"]
///   "POST/api/v1/admin/auth-services/{id}/activate": ["admin:activate"]
/// ```
///
/// Built once at startup and never changed afterwards.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PermissionPolicy {
    #[serde(default)]
    permissions: HashMap<String, Vec<String>>,
}

impl PermissionPolicy {
    pub fn new<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let permissions = entries
            .into_iter()
            .map(|(key, allowed)| (key.into(), allowed.into_iter().map(Into::into).collect()))
            .collect();
        Self { permissions }
    }

    /// Load the permission matrix from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let policy: PermissionPolicy =
            serde_yaml::from_str(&contents).map_err(|source| PolicyError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        log::info!(
            "Loaded permission policy from {} with {} route(s)",
            path.display(),
            policy.len()
        );
        Ok(policy)
    }

    /// Allowed tokens for the exact `method` + `path` key
    pub fn allowed(&self, method: &Method, path: &str) -> Option<&[String]> {
        self.permissions
            .get(&policy_key(method, path))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

/// Policy key of a route, e.g. `GET/api/v1/admin/actionLog`
pub fn policy_key(method: &Method, path: &str) -> String {
    format!("{}{}", method.as_str(), path)
}
