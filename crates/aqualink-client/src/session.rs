//! Logged-in session persistence and the login flow.
//!
//! The session is the customer's account number, the customer profile
//! returned at login, and the login time. Sessions older than the configured
//! lifetime are treated as logged out.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use aqualink_core::{AccountId, Customer, IdError};
use aqualink_store::Store;

use crate::client::AquaLinkClient;
use crate::error::ApiError;

/// Store key holding the account number.
pub const ACCOUNT_KEY: &str = "aqualink:matricula";
/// Store key holding the customer profile (JSON).
pub const CUSTOMER_KEY: &str = "aqualink:user_data";
/// Store key holding the login time (RFC 3339).
pub const LAST_LOGIN_KEY: &str = "aqualink:last_login";

/// Default session lifetime.
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Errors that can occur during login.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The account number was empty after normalization.
    #[error("account number must not be empty")]
    EmptyAccount,

    /// The server does not know this account.
    #[error("account not found")]
    NotFound,

    /// The server refused access to this account.
    #[error("access denied")]
    Unauthorized,

    /// The server failed.
    #[error("server error: HTTP {status}")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// Any other API failure.
    #[error(transparent)]
    Api(ApiError),
}

impl From<IdError> for LoginError {
    fn from(_: IdError) -> Self {
        Self::EmptyAccount
    }
}

impl From<ApiError> for LoginError {
    fn from(e: ApiError) -> Self {
        match e.status() {
            404 => Self::NotFound,
            401 | 403 => Self::Unauthorized,
            status if status >= 500 && matches!(e, ApiError::ServerError { .. }) => {
                Self::Server { status }
            }
            _ => Self::Api(e),
        }
    }
}

/// Persistent session over a [`Store`].
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn Store>,
    lifetime: chrono::Duration,
}

impl SessionStore {
    /// Create a session store with the default 30-day lifetime.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_lifetime(store, DEFAULT_SESSION_LIFETIME)
    }

    /// Create a session store with a custom lifetime.
    #[must_use]
    pub fn with_lifetime(store: Arc<dyn Store>, lifetime: Duration) -> Self {
        let lifetime = chrono::Duration::from_std(lifetime).unwrap_or(chrono::TimeDelta::MAX);
        Self { store, lifetime }
    }

    /// The logged-in account, if any.
    ///
    /// An expired session, or one with no recorded login time, is cleared
    /// and reported as logged out.
    #[must_use]
    pub fn account_id(&self) -> Option<AccountId> {
        let account = self.read_string(ACCOUNT_KEY)?;
        let Some(last_login) = self.last_login() else {
            tracing::debug!("Session has no login time, clearing");
            self.clear();
            return None;
        };

        if Utc::now().signed_duration_since(last_login) > self.lifetime {
            tracing::info!(%last_login, "Session expired, logging out");
            self.clear();
            return None;
        }

        match AccountId::parse(&account) {
            Ok(id) => Some(id),
            Err(_) => {
                self.clear();
                None
            }
        }
    }

    /// Record `account` as logged in now.
    pub fn set_account_id(&self, account: &AccountId) {
        self.write(ACCOUNT_KEY, account.as_str().as_bytes());
        self.write(LAST_LOGIN_KEY, Utc::now().to_rfc3339().as_bytes());
    }

    /// The customer profile stored at login.
    #[must_use]
    pub fn customer(&self) -> Option<Customer> {
        let bytes = self.read(CUSTOMER_KEY)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| tracing::warn!(error = %e, "Stored customer data is unreadable"))
            .ok()
    }

    /// Store the customer profile.
    pub fn set_customer(&self, customer: &Customer) {
        match serde_json::to_vec(customer) {
            Ok(bytes) => self.write(CUSTOMER_KEY, &bytes),
            Err(e) => tracing::warn!(error = %e, "Failed to encode customer data"),
        }
    }

    /// When the current session logged in.
    #[must_use]
    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        let raw = self.read_string(LAST_LOGIN_KEY)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
    }

    /// Log out.
    pub fn clear(&self) {
        for key in [ACCOUNT_KEY, CUSTOMER_KEY, LAST_LOGIN_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to clear session key");
            }
        }
    }

    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.store
            .get(key)
            .map_err(|e| tracing::warn!(key, error = %e, "Failed to read session key"))
            .ok()
            .flatten()
    }

    fn read_string(&self, key: &str) -> Option<String> {
        String::from_utf8(self.read(key)?).ok()
    }

    fn write(&self, key: &str, value: &[u8]) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "Failed to write session key");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// Log in with a raw account number.
///
/// The input is normalized, validated against the server by fetching the
/// customer's data, and on success the account, the profile and the login
/// time are stored.
///
/// # Errors
///
/// Returns a [`LoginError`] if the account number is empty or the server
/// rejects it. The session is left untouched on failure.
pub async fn login(
    client: &AquaLinkClient,
    session: &SessionStore,
    raw_account: &str,
) -> Result<Customer, LoginError> {
    let account = AccountId::parse(raw_account)?;
    tracing::debug!(%account, "Logging in");

    let response = client.client_data(&account).await?;

    session.set_account_id(&account);
    session.set_customer(&response.customer);
    tracing::info!(%account, "Logged in");

    Ok(response.customer)
}

/// Re-validate a stored session against the server.
///
/// Returns the refreshed customer, or `None` if there is no session or the
/// server no longer accepts it, in which case the session is cleared.
pub async fn restore_session(client: &AquaLinkClient, session: &SessionStore) -> Option<Customer> {
    let account = session.account_id()?;

    match login(client, session, account.as_str()).await {
        Ok(customer) => Some(customer),
        Err(e) => {
            tracing::info!(%account, error = %e, "Stored session rejected, logging out");
            session.clear();
            None
        }
    }
}
