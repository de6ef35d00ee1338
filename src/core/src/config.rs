use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};

/// Environment variable overriding the registries configuration path.
pub const REGISTRIES_CONFIG_ENV: &str = "REGISTRIES_CONFIG_PATH";

/// System-wide registries configuration.
pub const SYSTEM_REGISTRIES_CONFIG: &str = "/etc/containers/registries.conf";

/// Environment variable overriding the authentication file path.
pub const REGISTRY_AUTH_FILE_ENV: &str = "REGISTRY_AUTH_FILE";

/// Registries configuration, in the containers `registries.conf` layout:
///
/// ```toml
/// [registries.search]
/// registries = ["docker.io", "quay.io"]
///
/// [registries.insecure]
/// registries = ["localhost:5000"]
///
/// [registries.block]
/// registries = []
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistriesConfig {
    #[serde(default)]
    pub registries: RegistryTables,
}

/// Per-purpose registry lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryTables {
    /// Registries searched when the term names none
    #[serde(default)]
    pub search: RegistryList,

    /// Registries reached without TLS verification
    #[serde(default)]
    pub insecure: RegistryList,

    /// Registries never contacted
    #[serde(default)]
    pub block: RegistryList,
}

/// A list of registry hosts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryList {
    #[serde(default)]
    pub registries: Vec<String>,
}

impl RegistriesConfig {
    /// Path of the configuration file, honoring `REGISTRIES_CONFIG_PATH`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(REGISTRIES_CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SYSTEM_REGISTRIES_CONFIG))
    }

    /// Load the configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path())
    }

    /// Load the configuration from `path`. A missing file yields an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No registries configuration found");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| {
            SearchError::Config(format!(
                "Failed to read registries configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&data)
    }

    /// Parse configuration from TOML text.
    pub fn parse(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    /// Registries to search, in configured order, with blocked ones removed.
    pub fn search_registries(&self) -> Vec<String> {
        self.registries
            .search
            .registries
            .iter()
            .filter(|r| !self.is_blocked(r))
            .cloned()
            .collect()
    }

    /// Whether a registry is listed as insecure.
    pub fn is_insecure(&self, registry: &str) -> bool {
        self.registries.insecure.registries.iter().any(|r| r == registry)
    }

    /// Whether a registry is blocked.
    pub fn is_blocked(&self, registry: &str) -> bool {
        self.registries.block.registries.iter().any(|r| r == registry)
    }
}

/// Resolve the registry authentication file.
///
/// Order: explicit path, `REGISTRY_AUTH_FILE`, `$XDG_RUNTIME_DIR/containers/auth.json`,
/// then `<config dir>/containers/auth.json`.
pub fn auth_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    resolve_auth_file(
        explicit,
        std::env::var_os(REGISTRY_AUTH_FILE_ENV).map(PathBuf::from),
        std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from),
        dirs::config_dir(),
    )
}

fn resolve_auth_file(
    explicit: Option<&Path>,
    env_override: Option<PathBuf>,
    runtime_dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_override {
        return Some(path);
    }
    runtime_dir
        .or(config_dir)
        .map(|dir| dir.join("containers").join("auth.json"))
}
