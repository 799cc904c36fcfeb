//! AquaLink command line front-end.
//!
//! Wires configuration, persistence, the connectivity probe, the session
//! store and the API client together and renders results for a terminal.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod commands;
pub mod config;
pub mod render;

pub use commands::{open_store, Cli, CliError, Command};
pub use config::CliConfig;
