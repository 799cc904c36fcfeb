//! Primary/backup server selection.
//!
//! Exactly one server is active at a time. The selection is re-evaluated by
//! health check at most once per re-check interval; between checks the
//! client fails over by setting the active server directly.

use std::fmt;
use std::sync::RwLock;
use std::time::Duration;

use reqwest::Client;
use tokio::time::Instant;

/// Default interval between health re-checks.
pub const DEFAULT_RECHECK_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Default timeout for a single health check.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default health check path.
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";

/// One of the two configured API servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerTarget {
    /// The preferred server.
    Primary,
    /// The fallback server.
    Backup,
}

impl fmt::Display for ServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Backup => f.write_str("backup"),
        }
    }
}

#[derive(Debug)]
struct SelectorState {
    active: ServerTarget,
    last_check: Option<Instant>,
}

/// Tracks which server is active and health-checks the pair.
#[derive(Debug)]
pub struct ServerSelector {
    primary: String,
    backup: Option<String>,
    health_path: String,
    health_timeout: Duration,
    recheck_interval: Duration,
    state: RwLock<SelectorState>,
}

impl ServerSelector {
    /// Create a selector starting on the primary server.
    ///
    /// Trailing slashes are trimmed from both URLs.
    #[must_use]
    pub fn new(primary: &str, backup: Option<&str>) -> Self {
        Self {
            primary: primary.trim_end_matches('/').to_string(),
            backup: backup.map(|url| url.trim_end_matches('/').to_string()),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            recheck_interval: DEFAULT_RECHECK_INTERVAL,
            state: RwLock::new(SelectorState {
                active: ServerTarget::Primary,
                last_check: None,
            }),
        }
    }

    /// Set the health check path.
    #[must_use]
    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Set the timeout for a single health check.
    #[must_use]
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the minimum interval between health re-checks.
    #[must_use]
    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }

    /// Base URL of `target`, or `None` for an unconfigured backup.
    #[must_use]
    pub fn base_url(&self, target: ServerTarget) -> Option<&str> {
        match target {
            ServerTarget::Primary => Some(&self.primary),
            ServerTarget::Backup => self.backup.as_deref(),
        }
    }

    /// Whether a backup server is configured.
    #[must_use]
    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// The currently active server.
    #[must_use]
    pub fn active(&self) -> ServerTarget {
        self.state
            .read()
            .map(|state| state.active)
            .unwrap_or(ServerTarget::Primary)
    }

    /// Make `target` the active server.
    pub fn set_active(&self, target: ServerTarget) {
        if let Ok(mut state) = self.state.write() {
            if state.active != target {
                tracing::info!(from = %state.active, to = %target, "Switching active server");
            }
            state.active = target;
        }
    }

    /// Return the active server, re-running the health checks first if the
    /// re-check interval has elapsed.
    ///
    /// The primary is preferred whenever it answers. If neither server
    /// answers, the active server is left unchanged.
    pub async fn resolve(&self, http: &Client) -> ServerTarget {
        if !self.claim_check() {
            return self.active();
        }

        if self.is_reachable(http, ServerTarget::Primary).await {
            self.set_active(ServerTarget::Primary);
            return ServerTarget::Primary;
        }

        if self.is_reachable(http, ServerTarget::Backup).await {
            self.set_active(ServerTarget::Backup);
            return ServerTarget::Backup;
        }

        let active = self.active();
        tracing::warn!(active = %active, "No server passed its health check");
        active
    }

    /// Health-check `target`: reachable iff it answers 2xx within the
    /// health timeout.
    pub async fn is_reachable(&self, http: &Client, target: ServerTarget) -> bool {
        let Some(base) = self.base_url(target) else {
            return false;
        };
        let url = format!("{base}{}", self.health_path);

        match http.get(&url).timeout(self.health_timeout).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(server = %target, status = %response.status(), "Health check failed");
                false
            }
            Err(e) => {
                tracing::debug!(server = %target, error = %e, "Health check failed");
                false
            }
        }
    }

    /// Mark a health check as started if one is due.
    ///
    /// The check time is stamped before probing. Callers that lose the race
    /// reuse the current selection.
    fn claim_check(&self) -> bool {
        let Ok(mut state) = self.state.write() else {
            return false;
        };

        let due = state
            .last_check
            .map_or(true, |at| at.elapsed() >= self.recheck_interval);
        if due {
            state.last_check = Some(Instant::now());
        }
        due
    }
}
