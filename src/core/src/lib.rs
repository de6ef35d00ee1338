//! Quarry Core - Foundational Types
//!
//! Search options, filter and result records, registry configuration and
//! the error type shared by the search engine and the CLI.

pub mod config;
pub mod error;
pub mod search;

// Re-export commonly used types
pub use config::{auth_file_path, RegistriesConfig};
pub use error::{Result, SearchError};
pub use search::{DisplayRecord, FilterSet, RawResult, SearchOptions, TlsVerify};

/// Quarry version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
