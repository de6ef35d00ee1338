//! Multi-registry search aggregation.
//!
//! Registries are queried concurrently, but results are always assembled
//! in registry order, and within a registry in the order it returned them.
//! A caller-supplied limit caps each registry's contribution separately;
//! it is not a limit on the combined output.

use std::sync::Arc;

use futures::future::join_all;
use quarry_core::error::{Result, SearchError};
use quarry_core::search::{DisplayRecord, FilterSet, RawResult, SearchOptions, DEFAULT_LIMIT};

use super::client::SearchClient;
use super::executor::QueryExecutor;
use super::projector::{index_label, project};

/// Searches a set of registries and merges their results.
#[derive(Clone)]
pub struct SearchAggregator {
    executor: QueryExecutor,
}

impl SearchAggregator {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self {
            executor: QueryExecutor::new(client),
        }
    }

    /// Search every registry for `term` and return display records in registry order.
    pub async fn search(
        &self,
        term: &str,
        registries: &[String],
        options: &SearchOptions,
        filters: &FilterSet,
    ) -> Result<Vec<DisplayRecord>> {
        if registries.is_empty() {
            return Err(SearchError::NoRegistries(
                "no registries given to search".to_string(),
            ));
        }

        let query_limit = options.query_limit();
        let per_registry = join_all(
            registries
                .iter()
                .map(|registry| self.executor.query(registry, term, query_limit)),
        )
        .await;

        let mut records = Vec::new();
        for (registry, results) in registries.iter().zip(per_registry) {
            let index = index_label(registry);
            let cap = result_cap(results.len(), options.limit);

            records.extend(
                results
                    .iter()
                    .take(cap)
                    .filter(|result| accepts(options, filters, result))
                    .map(|result| project(result, registry, &index, options.truncate)),
            );
        }

        tracing::debug!(term, registries = registries.len(), results = records.len(), "Search complete");
        Ok(records)
    }
}

/// Number of a registry's results considered for output.
fn result_cap(available: usize, limit: Option<usize>) -> usize {
    match limit {
        Some(limit) if limit > 0 && limit < available => limit,
        _ => available.min(DEFAULT_LIMIT),
    }
}

/// Filters only apply when the user supplied filter expressions.
fn accepts(options: &SearchOptions, filters: &FilterSet, result: &RawResult) -> bool {
    options.filters.is_empty() || filters.matches(result)
}
