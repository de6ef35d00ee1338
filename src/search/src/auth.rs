//! Registry credentials from a containers-style `auth.json`.
//!
//! The file maps registry hosts to base64-encoded `user:password` pairs:
//!
//! ```json
//! { "auths": { "quay.io": { "auth": "dXNlcjpwYXNz" } } }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quarry_core::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

/// Per-registry auth entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AuthEntry {
    #[serde(default)]
    auth: String,
}

/// Auth file format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthFileContents {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
}

/// Read-only view of a registry authentication file.
#[derive(Debug, Clone)]
pub struct AuthFile {
    path: PathBuf,
}

impl AuthFile {
    /// Open the auth file at `path`. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the auth file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get credentials for a registry. Returns `(username, password)`.
    pub fn get(&self, registry: &str) -> Result<Option<(String, String)>> {
        let file = self.load()?;
        let entry = registry_keys(registry)
            .iter()
            .find_map(|key| file.auths.get(key));

        match entry {
            Some(entry) if !entry.auth.is_empty() => decode_auth(&entry.auth).map(Some),
            _ => Ok(None),
        }
    }

    /// Load the auth file from disk. Returns empty if not found.
    fn load(&self) -> Result<AuthFileContents> {
        if !self.path.exists() {
            return Ok(AuthFileContents::default());
        }
        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            SearchError::Config(format!(
                "Failed to read auth file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            SearchError::Config(format!(
                "Failed to parse auth file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// Keys a registry may be stored under, most specific first.
fn registry_keys(registry: &str) -> Vec<String> {
    let r = registry.trim().to_lowercase();
    let mut keys = vec![r.clone(), format!("https://{r}")];
    if matches!(r.as_str(), "docker.io" | "index.docker.io" | "registry-1.docker.io") {
        keys.extend([
            "docker.io".to_string(),
            "index.docker.io".to_string(),
            "https://index.docker.io/v1/".to_string(),
        ]);
    }
    keys
}

fn decode_auth(encoded: &str) -> Result<(String, String)> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SearchError::Config(format!("Invalid auth entry encoding: {}", e)))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|e| SearchError::Config(format!("Invalid auth entry encoding: {}", e)))?;
    decoded
        .split_once(':')
        .map(|(u, p)| (u.to_string(), p.to_string()))
        .ok_or_else(|| SearchError::Config("Auth entry is not user:password".to_string()))
}
