//! Search options, filters and result records.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of results requested from, and shown for, each registry.
pub const DEFAULT_LIMIT: usize = 25;

/// Marker shown for official/automated images.
pub const FLAG_MARKER: &str = "[OK]";

/// TLS verification setting for registry connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlsVerify {
    /// Verify certificates
    Enabled,
    /// Skip certificate verification
    Disabled,
    /// Not set by the user; registry configuration decides
    #[default]
    Default,
}

impl TlsVerify {
    /// Build from an optional command-line flag value.
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => TlsVerify::Enabled,
            Some(false) => TlsVerify::Disabled,
            None => TlsVerify::Default,
        }
    }
}

/// Per-invocation search configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Raw filter expressions, in the order given
    pub filters: Vec<String>,

    /// Maximum results per registry (None = default cap)
    pub limit: Option<usize>,

    /// Truncate long descriptions
    pub truncate: bool,

    /// Path of the registry authentication file
    pub auth_file: Option<PathBuf>,

    /// TLS verification setting
    pub tls_verify: TlsVerify,

    /// Output template
    pub format: String,
}

impl SearchOptions {
    /// Limit passed to registries as a hint for how many results to return.
    pub fn query_limit(&self) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_LIMIT,
        }
    }
}

/// Parsed filter conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Minimum star count (inclusive)
    pub stars: u64,

    /// Required official flag, if any
    pub is_official: Option<bool>,

    /// Required automated flag, if any
    pub is_automated: Option<bool>,
}

impl FilterSet {
    /// Check whether a registry result satisfies every condition.
    pub fn matches(&self, result: &RawResult) -> bool {
        self.matches_stars(result) && self.matches_official(result) && self.matches_automated(result)
    }

    fn matches_stars(&self, result: &RawResult) -> bool {
        result.star_count >= self.stars
    }

    fn matches_official(&self, result: &RawResult) -> bool {
        self.is_official.map_or(true, |want| result.is_official == want)
    }

    fn matches_automated(&self, result: &RawResult) -> bool {
        self.is_automated.map_or(true, |want| result.is_automated == want)
    }
}

/// A single entry returned by a registry search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    /// Repository name, possibly namespaced (e.g. "library/alpine")
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub star_count: u64,

    #[serde(default)]
    pub is_official: bool,

    #[serde(default)]
    pub is_automated: bool,
}

/// A search result ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayRecord {
    pub index: String,
    pub name: String,
    pub description: String,
    pub stars: u64,
    pub official: String,
    pub automated: String,
}

impl DisplayRecord {
    /// Template field names and their table headers, in default column order.
    pub const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("Index", "INDEX"),
        ("Name", "NAME"),
        ("Description", "DESCRIPTION"),
        ("Stars", "STARS"),
        ("Official", "OFFICIAL"),
        ("Automated", "AUTOMATED"),
    ];

    /// Header label for a template field name.
    pub fn header(field: &str) -> Option<&'static str> {
        Self::FIELDS
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, header)| *header)
    }

    /// Value of a template field, by name.
    pub fn field(&self, field: &str) -> Option<String> {
        let value = match field {
            "Index" => self.index.clone(),
            "Name" => self.name.clone(),
            "Description" => self.description.clone(),
            "Stars" => self.stars.to_string(),
            "Official" => self.official.clone(),
            "Automated" => self.automated.clone(),
            _ => return None,
        };
        Some(value)
    }
}
