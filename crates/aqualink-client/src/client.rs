//! AquaLink HTTP client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use aqualink_core::{AccountId, StatusFilter};
use aqualink_store::{keys, Store};

use crate::cache::{ResponseCache, DEFAULT_CACHE_TTL};
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::probe::{AlwaysOnline, NetworkProbe};
use crate::retry::{RetryPolicy, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_RETRIES};
use crate::server::{
    ServerSelector, ServerTarget, DEFAULT_HEALTH_PATH, DEFAULT_HEALTH_TIMEOUT,
    DEFAULT_RECHECK_INTERVAL,
};
use crate::types::{BillDetailsResponse, BillsResponse, ClientDataResponse, ConsumptionResponse};

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// AquaLink portal API client.
///
/// Cheap to clone: clones share the active-server selection and the cache.
#[derive(Clone)]
pub struct AquaLinkClient {
    http: Client,
    servers: Arc<ServerSelector>,
    cache: ResponseCache,
    probe: Arc<dyn NetworkProbe>,
    retry: RetryPolicy,
}

/// Why a single run against one server failed.
#[derive(Debug)]
enum Failure {
    /// Every attempt timed out.
    Timeout,
    /// Transport failure other than a timeout.
    Network(reqwest::Error),
    /// Non-2xx HTTP status.
    Status(StatusCode),
    /// A response arrived but was rejected.
    Rejected(ApiError),
}

/// Which failure moved the call onto the backup server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escalation {
    ServerError,
    Timeout,
}

impl AquaLinkClient {
    /// Create a client with default options, always-online reachability and
    /// the given cache store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the HTTP client cannot be built
    /// or the URL is not http(s).
    pub fn new(primary_url: impl Into<String>, store: Arc<dyn Store>) -> Result<Self, ApiError> {
        Self::with_options(
            ClientOptions::new(primary_url),
            store,
            Arc::new(AlwaysOnline),
        )
    }

    /// Create a client with custom options and reachability probe.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the HTTP client cannot be built
    /// or a server URL is not http(s).
    pub fn with_options(
        options: ClientOptions,
        store: Arc<dyn Store>,
        probe: Arc<dyn NetworkProbe>,
    ) -> Result<Self, ApiError> {
        validate_url(&options.primary_url)?;
        if let Some(backup) = &options.backup_url {
            validate_url(backup)?;
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let servers = ServerSelector::new(&options.primary_url, options.backup_url.as_deref())
            .with_health_path(options.health_path)
            .with_health_timeout(options.health_timeout)
            .with_recheck_interval(options.recheck_interval);

        Ok(Self {
            http,
            servers: Arc::new(servers),
            cache: ResponseCache::new(store, options.cache_ttl),
            probe,
            retry: RetryPolicy::new(options.max_retries, options.initial_backoff),
        })
    }

    /// The server requests currently go to.
    #[must_use]
    pub fn active_server(&self) -> ServerTarget {
        self.servers.active()
    }

    /// The response cache.
    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch basic customer data.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails and no fallback applies.
    pub async fn client_data(&self, account: &AccountId) -> Result<ClientDataResponse, ApiError> {
        self.execute(&Endpoint::ClientData {
            account: account.clone(),
        })
        .await
    }

    /// Fetch the bill list, optionally limited and filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails and no fallback applies.
    pub async fn bills(
        &self,
        account: &AccountId,
        limit: Option<u32>,
        status: Option<StatusFilter>,
    ) -> Result<BillsResponse, ApiError> {
        self.execute(&Endpoint::Bills {
            account: account.clone(),
            limit,
            status,
        })
        .await
    }

    /// Fetch one bill installment, including PIX data when offered.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails and no fallback applies.
    pub async fn bill_details(
        &self,
        account: &AccountId,
        bill_id: &str,
        installment: u32,
    ) -> Result<BillDetailsResponse, ApiError> {
        self.execute(&Endpoint::BillDetail {
            account: account.clone(),
            bill_id: bill_id.to_string(),
            installment,
        })
        .await
    }

    /// Fetch the consumption history, optionally limited to the last months.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails and no fallback applies.
    pub async fn consumption(
        &self,
        account: &AccountId,
        limit: Option<u32>,
    ) -> Result<ConsumptionResponse, ApiError> {
        self.execute(&Endpoint::Consumption {
            account: account.clone(),
            limit,
        })
        .await
    }

    /// Run one logical request through connectivity check, server
    /// selection, retry, failover and cache fallback.
    ///
    /// At most one switch to the backup happens per call.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails and no fallback applies.
    pub async fn execute<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, ApiError> {
        let path = endpoint.path();
        let key = keys::cache_key(&path);

        if !self.probe.is_online().await {
            tracing::debug!(endpoint = endpoint.name(), "Offline, answering from cache");
            return self
                .cached(&key)
                .ok_or(ApiError::Unavailable { offline: true });
        }

        let mut target = self.servers.resolve(&self.http).await;
        let mut escalation = None;

        loop {
            let failure = match self.run(target, &path, &key).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            if escalation == Some(Escalation::Timeout) {
                tracing::warn!(
                    endpoint = endpoint.name(),
                    ?failure,
                    "Backup failed after primary timeout, restoring primary"
                );
                self.servers.set_active(ServerTarget::Primary);
                return Err(ApiError::Timeout);
            }

            match failure {
                Failure::Status(status)
                    if status.is_server_error()
                        && target == ServerTarget::Primary
                        && escalation.is_none() =>
                {
                    if !self
                        .servers
                        .is_reachable(&self.http, ServerTarget::Backup)
                        .await
                    {
                        return Err(ApiError::from_status(status.as_u16()));
                    }
                    tracing::warn!(
                        endpoint = endpoint.name(),
                        status = status.as_u16(),
                        "Primary server error, failing over to backup"
                    );
                    self.servers.set_active(ServerTarget::Backup);
                    target = ServerTarget::Backup;
                    escalation = Some(Escalation::ServerError);
                }
                Failure::Status(status) => return Err(ApiError::from_status(status.as_u16())),
                Failure::Timeout
                    if target == ServerTarget::Primary
                        && escalation.is_none()
                        && self.servers.has_backup() =>
                {
                    tracing::warn!(
                        endpoint = endpoint.name(),
                        "Primary timed out, trying backup"
                    );
                    self.servers.set_active(ServerTarget::Backup);
                    target = ServerTarget::Backup;
                    escalation = Some(Escalation::Timeout);
                }
                Failure::Timeout => return Err(ApiError::Timeout),
                Failure::Network(e) => {
                    tracing::warn!(endpoint = endpoint.name(), error = %e, "Request failed");
                    return self
                        .cached(&key)
                        .ok_or(ApiError::Unavailable { offline: false });
                }
                Failure::Rejected(e) => return Err(e),
            }
        }
    }

    /// One full run against `target`: request with timeout retries, then
    /// validate, decode and cache the body.
    async fn run<T: DeserializeOwned>(
        &self,
        target: ServerTarget,
        path: &str,
        key: &str,
    ) -> Result<T, Failure> {
        let Some(base) = self.servers.base_url(target) else {
            return Err(Failure::Rejected(ApiError::Configuration(format!(
                "no URL configured for {target} server"
            ))));
        };
        let url = format!("{base}{path}");

        let (status, body) = self.send_with_retry(&url).await?;
        if !status.is_success() {
            return Err(Failure::Status(status));
        }

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            Failure::Rejected(ApiError::MalformedResponse(format!("invalid JSON: {e}")))
        })?;

        let decoded = accept(&value).map_err(Failure::Rejected)?;
        self.cache.put(key, &value);
        Ok(decoded)
    }

    /// GET `url`, retrying timed-out attempts with exponential backoff.
    async fn send_with_retry(&self, url: &str) -> Result<(StatusCode, Vec<u8>), Failure> {
        let mut delays = self.retry.delays();
        let mut attempt = 1u32;

        loop {
            tracing::debug!(url, attempt, "Sending request");

            match self.fetch_once(url).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_timeout() => {
                    let Some(delay) = delays.next() else {
                        tracing::warn!(url, attempt, "Request timed out, retries exhausted");
                        return Err(Failure::Timeout);
                    };
                    tracing::warn!(
                        url,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Request timed out, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(Failure::Network(e)),
            }
        }
    }

    /// A single attempt; the client timeout bounds the whole exchange,
    /// body included.
    async fn fetch_once(&self, url: &str) -> Result<(StatusCode, Vec<u8>), reqwest::Error> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }

    /// A fresh cached response for `key` that still decodes.
    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => {
                tracing::debug!(key, "Serving cached response");
                Some(decoded)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Cached response no longer decodes");
                self.cache.remove(key);
                None
            }
        }
    }
}

impl std::fmt::Debug for AquaLinkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AquaLinkClient")
            .field("servers", &self.servers)
            .field("cache", &self.cache)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Check the envelope and decode it.
///
/// `success: false` is a server-side failure; a missing flag or a payload of
/// the wrong shape is malformed.
fn accept<T: DeserializeOwned>(value: &Value) -> Result<T, ApiError> {
    match value.get("success").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => {
            return Err(ApiError::ServerError {
                status: ApiError::GENERIC_STATUS,
            })
        }
        None => {
            return Err(ApiError::MalformedResponse(
                "missing boolean `success` field".into(),
            ))
        }
    }

    T::deserialize(value).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

fn validate_url(url: &str) -> Result<(), ApiError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ApiError::Configuration(format!(
            "server URL must be http(s): {url}"
        )))
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Primary server base URL.
    pub primary_url: String,
    /// Backup server base URL (optional).
    pub backup_url: Option<String>,
    /// Per-attempt request timeout (default: 10s).
    pub timeout: Duration,
    /// Retries after a timed-out attempt (default: 3).
    pub max_retries: u32,
    /// Delay before the first retry; doubles each retry (default: 1s).
    pub initial_backoff: Duration,
    /// Health check path on both servers (default: `/api/health`).
    pub health_path: String,
    /// Timeout of a single health check (default: 5s).
    pub health_timeout: Duration,
    /// Minimum interval between health re-checks (default: 30 minutes).
    pub recheck_interval: Duration,
    /// Lifetime of cached responses (default: 24 hours).
    pub cache_ttl: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            primary_url: "http://localhost:3000".to_string(),
            backup_url: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            recheck_interval: DEFAULT_RECHECK_INTERVAL,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl ClientOptions {
    /// Options for the given primary server, defaults elsewhere.
    #[must_use]
    pub fn new(primary_url: impl Into<String>) -> Self {
        Self {
            primary_url: primary_url.into(),
            ..Self::default()
        }
    }

    /// Set the backup server.
    #[must_use]
    pub fn with_backup_url(mut self, url: impl Into<String>) -> Self {
        self.backup_url = Some(url.into());
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry budget and initial backoff.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }

    /// Set the health check path.
    #[must_use]
    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Set the health check timeout.
    #[must_use]
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the health re-check interval.
    #[must_use]
    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }

    /// Set the cache lifetime.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}
