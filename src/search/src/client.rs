//! Registry search clients.
//!
//! [`SearchClient`] is the single capability the search engine needs from a
//! registry. Protocol variants implement it:
//!
//! - [`V1SearchClient`] — `GET /v1/search?q=<term>&n=<limit>` (Docker Hub and
//!   other v1-compatible indexes)
//! - [`V2CatalogClient`] — `GET /v2/_catalog`, filtered by the term
//! - [`FallbackClient`] — tries one client, then another

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use quarry_core::config::RegistriesConfig;
use quarry_core::error::{Result, SearchError};
use quarry_core::search::{RawResult, TlsVerify};
use serde::Deserialize;

use super::auth::AuthFile;

/// Per-request timeout for registry calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Docker Hub is searched through its v1 index host.
const DOCKER_HUB: &str = "docker.io";
const DOCKER_HUB_INDEX: &str = "index.docker.io";

/// Searches a single registry.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Search `registry` for `term`, asking for at most `limit` results.
    async fn search(&self, registry: &str, term: &str, limit: usize) -> Result<Vec<RawResult>>;
}

/// Authentication credentials for a container registry.
#[derive(Debug, Clone)]
pub struct RegistryAuth {
    username: Option<String>,
    password: Option<String>,
}

impl RegistryAuth {
    /// Create anonymous authentication (no credentials).
    pub fn anonymous() -> Self {
        Self {
            username: None,
            password: None,
        }
    }

    /// Create basic authentication with username and password.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Look up credentials for `registry` in the auth file, falling back to anonymous.
    ///
    /// An unreadable auth file is logged and treated as empty.
    pub fn from_auth_file(auth_file: Option<&AuthFile>, registry: &str) -> Self {
        let Some(file) = auth_file else {
            return Self::anonymous();
        };
        match file.get(registry) {
            Ok(Some((username, password))) => Self::basic(username, password),
            Ok(None) => Self::anonymous(),
            Err(e) => {
                tracing::warn!(
                    path = %file.path().display(),
                    error = %e,
                    "Ignoring unreadable auth file"
                );
                Self::anonymous()
            }
        }
    }

    /// Whether credentials are present.
    pub fn is_anonymous(&self) -> bool {
        self.username.is_none() || self.password.is_none()
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => request.basic_auth(u, Some(p)),
            _ => request,
        }
    }
}

/// Connection settings shared by the HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// TLS verification requested by the user
    pub tls_verify: TlsVerify,
    /// Registry authentication file
    pub auth_file: Option<AuthFile>,
    /// Registries configuration (insecure registries)
    pub registries: RegistriesConfig,
}

impl HttpClientConfig {
    /// Create a config from the user's TLS setting and auth file path.
    pub fn new(tls_verify: TlsVerify, auth_file: Option<&Path>) -> Self {
        Self {
            tls_verify,
            auth_file: auth_file.map(AuthFile::new),
            registries: RegistriesConfig::default(),
        }
    }

    /// Use the registries configuration to decide TLS when the user did not choose explicitly.
    pub fn with_registries_config(mut self, registries: RegistriesConfig) -> Self {
        self.registries = registries;
        self
    }

    /// Whether certificate verification is skipped for `registry`.
    ///
    /// Such registries may also be reached over plain HTTP.
    pub fn skip_tls_verify(&self, registry: &str) -> bool {
        match self.tls_verify {
            TlsVerify::Enabled => false,
            TlsVerify::Disabled => true,
            TlsVerify::Default => self.registries.is_insecure(registry),
        }
    }
}

/// HTTP plumbing shared by the protocol clients.
#[derive(Clone)]
struct RegistryHttp {
    secure: reqwest::Client,
    insecure: reqwest::Client,
    config: HttpClientConfig,
}

impl RegistryHttp {
    fn new(config: HttpClientConfig) -> Result<Self> {
        let secure = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchError::Other(format!("Failed to create HTTP client: {}", e)))?;
        let insecure = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| SearchError::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            secure,
            insecure,
            config,
        })
    }

    /// Fetch a registry endpoint and decode its JSON body.
    ///
    /// Registries with TLS verification skipped are retried over plain HTTP
    /// when the HTTPS request cannot be sent.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        registry: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let insecure = self.config.skip_tls_verify(registry);
        let client = if insecure { &self.insecure } else { &self.secure };
        let auth = RegistryAuth::from_auth_file(self.config.auth_file.as_ref(), registry);

        let url = endpoint_url("https", registry, path);
        let response = match self.send(client, &auth, registry, &url, query).await {
            Ok(response) => response,
            Err(e) if insecure => {
                tracing::debug!(registry, error = %e, "HTTPS request failed, retrying over HTTP");
                let url = endpoint_url("http", registry, path);
                self.send(client, &auth, registry, &url, query)
                    .await
                    .map_err(|e| registry_error(registry, format!("Request to {} failed: {}", url, e)))?
            }
            Err(e) => {
                return Err(registry_error(
                    registry,
                    format!("Request to {} failed: {}", url, e),
                ))
            }
        };

        let url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            return Err(registry_error(
                registry,
                format!("{} returned status {}", url, status),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| registry_error(registry, format!("Invalid response from {}: {}", url, e)))
    }

    async fn send(
        &self,
        client: &reqwest::Client,
        auth: &RegistryAuth,
        registry: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        tracing::debug!(
            registry,
            url,
            authenticated = !auth.is_anonymous(),
            "Querying registry"
        );
        auth.apply(client.get(url).query(query)).send().await
    }
}

/// Client for the v1 search endpoint.
#[derive(Clone)]
pub struct V1SearchClient {
    http: RegistryHttp,
}

#[derive(Debug, Deserialize)]
struct V1SearchResponse {
    #[serde(default)]
    results: Vec<RawResult>,
}

impl V1SearchClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Ok(Self {
            http: RegistryHttp::new(config)?,
        })
    }
}

#[async_trait]
impl SearchClient for V1SearchClient {
    async fn search(&self, registry: &str, term: &str, limit: usize) -> Result<Vec<RawResult>> {
        let response: V1SearchResponse = self
            .http
            .get_json(
                registry,
                "/v1/search",
                &[("q", term.to_string()), ("n", limit.to_string())],
            )
            .await?;
        Ok(response.results)
    }
}

/// Client for the v2 catalog endpoint.
///
/// The catalog has no search, so repositories are matched by substring.
#[derive(Clone)]
pub struct V2CatalogClient {
    http: RegistryHttp,
}

#[derive(Debug, Deserialize)]
struct V2CatalogResponse {
    #[serde(default)]
    repositories: Vec<String>,
}

impl V2CatalogClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Ok(Self {
            http: RegistryHttp::new(config)?,
        })
    }
}

#[async_trait]
impl SearchClient for V2CatalogClient {
    async fn search(&self, registry: &str, term: &str, limit: usize) -> Result<Vec<RawResult>> {
        let response: V2CatalogResponse =
            self.http.get_json(registry, "/v2/_catalog", &[]).await?;
        Ok(catalog_results(response.repositories, term, limit))
    }
}

fn catalog_results(repositories: Vec<String>, term: &str, limit: usize) -> Vec<RawResult> {
    repositories
        .into_iter()
        .filter(|repo| repo.contains(term))
        .take(limit)
        .map(|name| RawResult {
            name,
            ..Default::default()
        })
        .collect()
}

/// Tries a primary client, then a secondary one if the primary fails.
pub struct FallbackClient {
    primary: Box<dyn SearchClient>,
    secondary: Box<dyn SearchClient>,
}

impl FallbackClient {
    pub fn new(primary: Box<dyn SearchClient>, secondary: Box<dyn SearchClient>) -> Self {
        Self { primary, secondary }
    }

    /// v1 search with v2 catalog fallback, over HTTPS.
    pub fn http(config: HttpClientConfig) -> Result<Self> {
        Ok(Self::new(
            Box::new(V1SearchClient::new(config.clone())?),
            Box::new(V2CatalogClient::new(config)?),
        ))
    }
}

#[async_trait]
impl SearchClient for FallbackClient {
    async fn search(&self, registry: &str, term: &str, limit: usize) -> Result<Vec<RawResult>> {
        match self.primary.search(registry, term, limit).await {
            Ok(results) => Ok(results),
            Err(e) => {
                tracing::debug!(registry, error = %e, "Primary search failed, trying fallback");
                self.secondary.search(registry, term, limit).await
            }
        }
    }
}

/// URL of a registry API path.
fn endpoint_url(scheme: &str, registry: &str, path: &str) -> String {
    format!("{}://{}{}", scheme, endpoint_host(registry), path)
}

/// Host that actually serves a registry's API.
fn endpoint_host(registry: &str) -> &str {
    if registry == DOCKER_HUB {
        DOCKER_HUB_INDEX
    } else {
        registry
    }
}

fn registry_error(registry: &str, message: String) -> SearchError {
    SearchError::Registry {
        registry: registry.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedClient {
        results: Option<Vec<RawResult>>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchClient for FixedClient {
        async fn search(&self, registry: &str, _term: &str, _limit: usize) -> Result<Vec<RawResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .clone()
                .ok_or_else(|| registry_error(registry, "unavailable".to_string()))
        }
    }

    fn named(name: &str) -> RawResult {
        RawResult {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_host() {
        assert_eq!(endpoint_host("docker.io"), "index.docker.io");
        assert_eq!(endpoint_host("quay.io"), "quay.io");
    }

    #[test]
    fn test_registry_auth_anonymous() {
        let auth = RegistryAuth::anonymous();
        assert!(auth.is_anonymous());
        assert!(RegistryAuth::from_auth_file(None, "quay.io").is_anonymous());
    }

    #[test]
    fn test_registry_auth_basic() {
        let auth = RegistryAuth::basic("user", "pass");
        assert_eq!(auth.username, Some("user".to_string()));
        assert_eq!(auth.password, Some("pass".to_string()));
        assert!(!auth.is_anonymous());
    }

    #[test]
    fn test_registry_auth_from_auth_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("auth.json");
        // "user:pass"
        std::fs::write(&path, r#"{"auths": {"quay.io": {"auth": "dXNlcjpwYXNz"}}}"#).unwrap();
        let file = AuthFile::new(&path);

        let auth = RegistryAuth::from_auth_file(Some(&file), "quay.io");
        assert_eq!(auth.username.as_deref(), Some("user"));
        assert_eq!(auth.password.as_deref(), Some("pass"));
        assert!(RegistryAuth::from_auth_file(Some(&file), "ghcr.io").is_anonymous());
    }

    #[test]
    fn test_registry_auth_unreadable_file_is_anonymous() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "garbage").unwrap();
        let file = AuthFile::new(&path);
        assert!(RegistryAuth::from_auth_file(Some(&file), "quay.io").is_anonymous());
    }

    #[test]
    fn test_skip_tls_verify() {
        let insecure =
            RegistriesConfig::parse("[registries.insecure]\nregistries = ['localhost:5000']\n")
                .unwrap();
        let config = HttpClientConfig::new(TlsVerify::Default, None)
            .with_registries_config(insecure.clone());
        assert!(config.skip_tls_verify("localhost:5000"));
        assert!(!config.skip_tls_verify("quay.io"));

        let config =
            HttpClientConfig::new(TlsVerify::Enabled, None).with_registries_config(insecure);
        assert!(!config.skip_tls_verify("localhost:5000"));

        let config = HttpClientConfig::new(TlsVerify::Disabled, None);
        assert!(config.skip_tls_verify("quay.io"));
    }

    #[test]
    fn test_v1_response_parsing() {
        let json = r#"{
            "num_results": 2,
            "query": "alpine",
            "results": [
                {"name": "alpine", "description": "tiny", "star_count": 9000, "is_official": true, "is_automated": false},
                {"name": "someone/alpine-tools", "description": "", "star_count": 3, "is_official": false, "is_automated": true}
            ]
        }"#;
        let response: V1SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].name, "alpine");
        assert!(response.results[1].is_automated);
    }

    #[test]
    fn test_catalog_results_filter_and_limit() {
        let repos = vec![
            "fedora".to_string(),
            "fedora-minimal".to_string(),
            "centos".to_string(),
            "fedora-toolbox".to_string(),
        ];
        let results = catalog_results(repos.clone(), "fedora", 2);
        assert_eq!(results, vec![named("fedora"), named("fedora-minimal")]);

        let all = catalog_results(repos, "", 25);
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_fallback_uses_primary_when_it_succeeds() {
        let secondary_calls = Arc::new(AtomicUsize::new(0));
        let client = FallbackClient::new(
            Box::new(FixedClient {
                results: Some(vec![named("v1")]),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(FixedClient {
                results: Some(vec![named("v2")]),
                calls: secondary_calls.clone(),
            }),
        );
        let results = client.search("quay.io", "x", 25).await.unwrap();
        assert_eq!(results, vec![named("v1")]);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_primary_failure() {
        let client = FallbackClient::new(
            Box::new(FixedClient {
                results: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(FixedClient {
                results: Some(vec![named("v2")]),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        let results = client.search("quay.io", "x", 25).await.unwrap();
        assert_eq!(results, vec![named("v2")]);
    }

    #[tokio::test]
    async fn test_fallback_both_fail() {
        let client = FallbackClient::new(
            Box::new(FixedClient {
                results: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(FixedClient {
                results: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        let err = client.search("quay.io", "x", 25).await.unwrap_err();
        assert!(matches!(err, SearchError::Registry { .. }));
    }

    /// Serve `body` as JSON over plain HTTP to every connection; returns the port.
    async fn plain_http_registry(body: &'static str) -> u16 {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        port
    }

    const PLAIN_V1_BODY: &str =
        r#"{"results": [{"name": "team/app", "description": "local", "star_count": 2}]}"#;

    #[tokio::test]
    async fn test_insecure_registry_falls_back_to_plain_http() {
        let port = plain_http_registry(PLAIN_V1_BODY).await;
        let registry = format!("127.0.0.1:{port}");

        let client = FallbackClient::http(HttpClientConfig::new(TlsVerify::Disabled, None)).unwrap();
        let results = client.search(&registry, "app", 25).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "team/app");
        assert_eq!(results[0].star_count, 2);
    }

    #[tokio::test]
    async fn test_configured_insecure_registry_uses_plain_http() {
        let port = plain_http_registry(PLAIN_V1_BODY).await;
        let registry = format!("127.0.0.1:{port}");
        let config = RegistriesConfig::parse(&format!(
            "[registries.insecure]\nregistries = ['{registry}']\n"
        ))
        .unwrap();

        let client = V1SearchClient::new(
            HttpClientConfig::new(TlsVerify::Default, None).with_registries_config(config),
        )
        .unwrap();
        let results = client.search(&registry, "app", 25).await.unwrap();
        assert_eq!(results[0].name, "team/app");
    }

    #[tokio::test]
    async fn test_verified_registry_never_uses_plain_http() {
        let port = plain_http_registry(PLAIN_V1_BODY).await;
        let registry = format!("127.0.0.1:{port}");

        let client = V1SearchClient::new(HttpClientConfig::new(TlsVerify::Enabled, None)).unwrap();
        let err = client.search(&registry, "app", 25).await.unwrap_err();
        assert!(err.to_string().contains("https://"));
    }
}
