//! Command line definition and command execution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use aqualink_client::{
    login, restore_session, AlwaysOnline, ApiError, AquaLinkClient, LoginError, ManualProbe,
    NetworkProbe, SessionStore, TcpProbe,
};
use aqualink_core::{AccountId, StatusFilter};
use aqualink_store::{MemoryStore, Store, StoreError};

use crate::config::CliConfig;
use crate::render;

/// Timeout for the TCP connectivity probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// AquaLink customer portal client.
#[derive(Debug, Parser)]
#[command(name = "aqualink", version, about)]
pub struct Cli {
    /// Primary API server URL.
    #[arg(long, global = true)]
    pub primary: Option<String>,

    /// Backup API server URL.
    #[arg(long, global = true)]
    pub backup: Option<String>,

    /// Directory for the response cache and session.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Answer from the local cache only.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Keep cache and session in memory for this run only.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Print the raw JSON response instead of formatted text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with an account number (matrícula).
    Login {
        /// Account number; separators are ignored.
        matricula: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the customer profile.
    Profile,
    /// List bills.
    Bills {
        /// Maximum number of bills.
        #[arg(long)]
        limit: Option<u32>,
        /// Status filter: aberto, pago or todos.
        #[arg(long)]
        status: Option<StatusFilter>,
    },
    /// Show one bill installment with its PIX code.
    Bill {
        /// Bill identifier.
        id: String,
        /// Installment number.
        parcela: u32,
    },
    /// Show consumption history and statistics.
    Consumption {
        /// Number of months.
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Errors surfaced to the command line.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A command needs a session and there is none.
    #[error("not logged in; run `aqualink login <matricula>` first")]
    NotLoggedIn,

    /// Login failed.
    #[error("login failed: {0}")]
    Login(#[from] LoginError),

    /// An API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The local store could not be opened.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Output could not be encoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Cli {
    /// Apply command line overrides on top of the environment configuration.
    #[must_use]
    pub fn apply(&self, mut config: CliConfig) -> CliConfig {
        if let Some(primary) = &self.primary {
            config.primary_url.clone_from(primary);
        }
        if let Some(backup) = &self.backup {
            config.backup_url = Some(backup.clone());
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir.clone_from(dir);
        }
        config
    }

    /// Connectivity probe for this invocation.
    #[must_use]
    pub fn probe(&self, config: &CliConfig) -> Arc<dyn NetworkProbe> {
        if self.offline {
            return Arc::new(ManualProbe::new(false));
        }
        match &config.probe_addr {
            Some(addr) => Arc::new(TcpProbe::new(addr.clone(), PROBE_TIMEOUT)),
            None => Arc::new(AlwaysOnline),
        }
    }

    /// Run the command and return what should be printed.
    ///
    /// # Errors
    ///
    /// Returns a [`CliError`] if the store cannot be opened, there is no
    /// session for a command that needs one, or the API call fails.
    pub async fn run(&self, config: &CliConfig) -> Result<String, CliError> {
        let store = open_store(config, self.ephemeral)?;
        let session = SessionStore::new(store.clone());
        let client =
            AquaLinkClient::with_options(config.client_options(), store, self.probe(config))?;

        match &self.command {
            Command::Login { matricula } => {
                let customer = login(&client, &session, matricula).await?;
                self.output(&customer, || render::customer(&customer))
            }
            Command::Logout => {
                session.clear();
                Ok("Sessão encerrada.\n".to_string())
            }
            Command::Profile => {
                let customer = if self.offline {
                    session.customer()
                } else {
                    restore_session(&client, &session).await
                };
                let customer = customer.ok_or(CliError::NotLoggedIn)?;
                self.output(&customer, || render::customer(&customer))
            }
            Command::Bills { limit, status } => {
                let account = require_account(&session)?;
                let response = client.bills(&account, *limit, *status).await?;
                self.output(&response, || render::bills(&response))
            }
            Command::Bill { id, parcela } => {
                let account = require_account(&session)?;
                let response = client.bill_details(&account, id, *parcela).await?;
                self.output(&response, || render::bill_detail(&response.bill))
            }
            Command::Consumption { limit } => {
                let account = require_account(&session)?;
                let response = client.consumption(&account, *limit).await?;
                self.output(&response, || render::consumption(&response))
            }
        }
    }

    fn output<T: serde::Serialize>(
        &self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<String, CliError> {
        if self.json {
            Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
        } else {
            Ok(text())
        }
    }
}

fn require_account(session: &SessionStore) -> Result<AccountId, CliError> {
    session.account_id().ok_or(CliError::NotLoggedIn)
}

/// Open the persistent store under the configured data directory.
///
/// # Errors
///
/// Returns a [`StoreError`] if the directory or database cannot be opened.
pub fn open_store(config: &CliConfig, ephemeral: bool) -> Result<Arc<dyn Store>, StoreError> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }

    #[cfg(feature = "rocksdb-backend")]
    {
        let path = config.data_dir.join("rocksdb");
        tracing::debug!(path = %path.display(), "Opening RocksDB store");
        return Ok(Arc::new(aqualink_store::RocksStore::open(path)?));
    }

    #[cfg(not(feature = "rocksdb-backend"))]
    {
        tracing::debug!(path = %config.data_dir.display(), "Opening file store");
        Ok(Arc::new(aqualink_store::FileStore::open(&config.data_dir)?))
    }
}
