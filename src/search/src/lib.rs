//! Quarry Search - multi-registry image search engine.
//!
//! Queries every target registry concurrently, filters and caps each
//! registry's results, and projects them into display records in
//! registry order.

pub mod aggregator;
pub mod auth;
pub mod client;
pub mod executor;
pub mod filter;
pub mod projector;
pub mod reference;

// Re-export common types
pub use aggregator::SearchAggregator;
pub use auth::AuthFile;
pub use client::{FallbackClient, HttpClientConfig, RegistryAuth, SearchClient, V1SearchClient, V2CatalogClient};
pub use executor::QueryExecutor;
pub use filter::parse_filters;
pub use projector::{index_label, project};
pub use reference::{resolve_registries, split_registry};
