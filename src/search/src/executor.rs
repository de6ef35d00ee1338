//! Per-registry query execution.
//!
//! A failing registry is logged and contributes no results; it never
//! fails the search as a whole.

use std::sync::Arc;

use quarry_core::error::Result;
use quarry_core::search::RawResult;

use super::client::SearchClient;

/// Runs one search request per registry through a [`SearchClient`].
#[derive(Clone)]
pub struct QueryExecutor {
    client: Arc<dyn SearchClient>,
}

impl QueryExecutor {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }

    /// Search one registry, propagating its failure.
    pub async fn try_query(&self, registry: &str, term: &str, limit: usize) -> Result<Vec<RawResult>> {
        self.client.search(registry, term, limit).await
    }

    /// Search one registry. Failures are logged and yield no results.
    pub async fn query(&self, registry: &str, term: &str, limit: usize) -> Vec<RawResult> {
        match self.try_query(registry, term, limit).await {
            Ok(results) => {
                tracing::debug!(registry, count = results.len(), "Registry search complete");
                results
            }
            Err(e) => {
                tracing::error!(registry, error = %e, "Error searching registry");
                Vec::new()
            }
        }
    }
}
