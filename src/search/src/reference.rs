//! Search term parsing and registry resolution.
//!
//! A term may carry a registry prefix (`quay.io/etcd`), or name only a
//! registry (`registry.fedoraproject.org/`), in which case the whole
//! catalog of that registry is searched.

use quarry_core::config::RegistriesConfig;
use quarry_core::error::{Result, SearchError};

/// Split a search term into an optional registry and the remaining term.
///
/// - `registry.example.com/` → (`registry.example.com`, ``)
/// - `quay.io/coreos/etcd` → (`quay.io`, `coreos/etcd`)
/// - `localhost/app` → (`localhost`, `app`)
/// - `library/alpine` → (none, `library/alpine`)
///
/// A bare `/` names no registry and is rejected.
pub fn split_registry(term: &str) -> Result<(Option<String>, String)> {
    let term = term.trim();

    if let Some(registry) = term.strip_suffix('/') {
        if registry.is_empty() {
            return Err(SearchError::Usage(format!(
                "invalid search term {:?}: empty registry name",
                term
            )));
        }
        return Ok((Some(registry.to_string()), String::new()));
    }

    // First component is a registry when it looks like a hostname
    // (contains a dot or colon, or is "localhost")
    if let Some((first, rest)) = term.split_once('/') {
        if first.contains('.') || first.contains(':') || first == "localhost" {
            return Ok((Some(first.to_string()), rest.to_string()));
        }
    }

    Ok((None, term.to_string()))
}

/// Registries to search: the term's registry if it named one, else the configured list.
pub fn resolve_registries(
    registry: Option<&str>,
    config: &RegistriesConfig,
) -> Result<Vec<String>> {
    if let Some(registry) = registry {
        if config.is_blocked(registry) {
            return Err(SearchError::NoRegistries(format!(
                "registry {:?} is blocked",
                registry
            )));
        }
        return Ok(vec![registry.to_string()]);
    }

    let registries = config.search_registries();
    if registries.is_empty() {
        return Err(SearchError::NoRegistries(
            "no search registries configured; add [registries.search] to the registries configuration or prefix the term with a registry".to_string(),
        ));
    }
    Ok(registries)
}
