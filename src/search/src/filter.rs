//! Search filter parsing.
//!
//! Filters are given as `key` or `key=value`:
//! - `stars=<n>` keeps results with at least `n` stars
//! - `is-official[=false]` keeps (non-)official images
//! - `is-automated[=false]` keeps (non-)automated images
//!
//! When a key is repeated, the last occurrence wins.

use quarry_core::error::{Result, SearchError};
use quarry_core::search::FilterSet;

/// Parse filter expressions into a [`FilterSet`].
pub fn parse_filters(expressions: &[String]) -> Result<FilterSet> {
    let mut filters = FilterSet::default();

    for expr in expressions {
        let (key, value) = match expr.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (expr.as_str(), None),
        };

        match key {
            "stars" => {
                let value = value.ok_or_else(|| {
                    SearchError::FilterParse(format!(
                        "invalid `stars` filter {:?}, should be stars=<value>",
                        expr
                    ))
                })?;
                filters.stars = value.parse().map_err(|e| {
                    SearchError::FilterParse(format!(
                        "incorrect value type for stars filter {:?}: {}",
                        expr, e
                    ))
                })?;
            }
            "is-official" => filters.is_official = Some(flag_value(value)),
            "is-automated" => filters.is_automated = Some(flag_value(value)),
            _ => {
                return Err(SearchError::FilterParse(format!(
                    "invalid filter type {:?}",
                    expr
                )))
            }
        }
    }

    Ok(filters)
}

/// Only the literal `false` clears a flag filter.
fn flag_value(value: Option<&str>) -> bool {
    value != Some("false")
}
