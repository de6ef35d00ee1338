//! `quarry search` command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use quarry_core::config::{auth_file_path, RegistriesConfig};
use quarry_core::error::SearchError;
use quarry_core::search::{SearchOptions, TlsVerify};
use quarry_search::{
    parse_filters, resolve_registries, split_registry, FallbackClient, HttpClientConfig,
    SearchAggregator,
};

use crate::output;

#[derive(Args)]
pub struct SearchArgs {
    /// Search term (e.g., "alpine", "quay.io/etcd", "registry.fedoraproject.org/")
    pub terms: Vec<String>,

    /// Filter output: stars=<n>, is-official[=false], is-automated[=false]
    #[arg(short, long = "filter", value_delimiter = ',')]
    pub filters: Vec<String>,

    /// Limit the number of results per registry
    #[arg(long)]
    pub limit: Option<usize>,

    /// Do not truncate descriptions
    #[arg(long)]
    pub no_trunc: bool,

    /// Format output using placeholders: {{.Index}}, {{.Name}}, {{.Description}},
    /// {{.Stars}}, {{.Official}}, {{.Automated}}; prefix with "table" for columns,
    /// or use "json"
    #[arg(long)]
    pub format: Option<String>,

    /// Path of the authentication file (default: $XDG_RUNTIME_DIR/containers/auth.json,
    /// overridden by REGISTRY_AUTH_FILE)
    #[arg(long)]
    pub authfile: Option<PathBuf>,

    /// Require HTTPS and verify certificates when contacting registries
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub tls_verify: Option<bool>,
}

impl SearchArgs {
    /// The single search term.
    pub fn term(&self) -> Result<&str, SearchError> {
        match self.terms.as_slice() {
            [term] => Ok(term),
            [] => Err(SearchError::Usage(
                "no argument given, requires exactly 1 argument".to_string(),
            )),
            _ => Err(SearchError::Usage(
                "too many arguments, requires exactly 1".to_string(),
            )),
        }
    }

    /// Search options for this invocation.
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            filters: self.filters.clone(),
            limit: self.limit,
            truncate: !self.no_trunc,
            auth_file: auth_file_path(self.authfile.as_deref()),
            tls_verify: TlsVerify::from_flag(self.tls_verify),
            format: output::search_format(self.format.as_deref()),
        }
    }
}

pub async fn execute(args: SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (registry, term) = split_registry(args.term()?)?;
    let options = args.options();

    let config = RegistriesConfig::load_default()?;
    let registries = resolve_registries(registry.as_deref(), &config)?;
    let filters = parse_filters(&options.filters)?;
    tracing::debug!(term = %term, registries = ?registries, "Searching registries");

    let http = HttpClientConfig::new(options.tls_verify, options.auth_file.as_deref())
        .with_registries_config(config);
    let aggregator = SearchAggregator::new(Arc::new(FallbackClient::http(http)?));

    let records = aggregator
        .search(&term, &registries, &options, &filters)
        .await?;
    if records.is_empty() {
        return Ok(());
    }

    print!("{}", output::render_records(&records, &options.format)?);
    Ok(())
}
