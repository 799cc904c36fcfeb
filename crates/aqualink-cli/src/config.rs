//! CLI configuration.

use std::path::PathBuf;
use std::time::Duration;

use aqualink_client::ClientOptions;

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Primary API server (default: `http://localhost:3000`).
    pub primary_url: String,

    /// Backup API server (optional).
    pub backup_url: Option<String>,

    /// Directory for the response cache and session (default: `~/.aqualink`).
    pub data_dir: PathBuf,

    /// Per-attempt request timeout in seconds.
    pub timeout_seconds: u64,

    /// Retries after a timed-out attempt.
    pub max_retries: u32,

    /// `host:port` to connect to when checking connectivity (optional).
    pub probe_addr: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            primary_url: std::env::var("AQUALINK_PRIMARY_URL").unwrap_or(defaults.primary_url),
            backup_url: std::env::var("AQUALINK_BACKUP_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            data_dir: std::env::var("AQUALINK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            timeout_seconds: std::env::var("AQUALINK_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_seconds),
            max_retries: std::env::var("AQUALINK_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            probe_addr: std::env::var("AQUALINK_PROBE_ADDR").ok(),
        }
    }

    /// Client options for this configuration.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::new(&self.primary_url)
            .with_timeout(Duration::from_secs(self.timeout_seconds));
        options.max_retries = self.max_retries;
        if let Some(backup) = &self.backup_url {
            options = options.with_backup_url(backup);
        }
        options
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        let data_dir = std::env::var_os("HOME")
            .map_or_else(|| PathBuf::from(".aqualink"), |home| PathBuf::from(home).join(".aqualink"));

        Self {
            primary_url: "http://localhost:3000".into(),
            backup_url: None,
            data_dir,
            timeout_seconds: 10,
            max_retries: 3,
            probe_addr: None,
        }
    }
}
