//! AquaLink API client.
//!
//! This crate talks to the water utility's customer portal API. Every call
//! goes through the same resilience pipeline:
//!
//! 1. If the device is offline, answer from the response cache or fail.
//! 2. Pick the active server (primary or backup), health-checking the pair
//!    at most once per re-check interval.
//! 3. Send the request with a per-attempt timeout, retrying timeouts with
//!    exponential backoff.
//! 4. Fail over to the backup on a primary 5xx or timeout.
//! 5. On network failure, fall back to a fresh cached response.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use aqualink_client::{AquaLinkClient, ClientOptions, AlwaysOnline};
//! use aqualink_core::{AccountId, StatusFilter};
//! use aqualink_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AquaLinkClient::with_options(
//!     ClientOptions::new("http://api.example.com:3000")
//!         .with_backup_url("http://backup.example.com:3000"),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(AlwaysOnline),
//! )?;
//!
//! let account = AccountId::parse("000012345")?;
//! let open = client.bills(&account, Some(5), Some(StatusFilter::Aberto)).await?;
//! println!("{} open bills", open.bills.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cache;
mod client;
mod endpoint;
mod error;
mod probe;
mod retry;
mod server;
mod session;
mod types;

pub use cache::{CacheEntry, ResponseCache, DEFAULT_CACHE_TTL};
pub use client::{AquaLinkClient, ClientOptions, DEFAULT_TIMEOUT};
pub use endpoint::Endpoint;
pub use error::ApiError;
pub use probe::{AlwaysOnline, ManualProbe, NetworkProbe, TcpProbe};
pub use retry::RetryPolicy;
pub use server::{ServerSelector, ServerTarget};
pub use session::{
    login, restore_session, LoginError, SessionStore, ACCOUNT_KEY, CUSTOMER_KEY,
    DEFAULT_SESSION_LIFETIME, LAST_LOGIN_KEY,
};
pub use types::*;
