//! Core types and utilities for AquaLink.
//!
//! This crate provides the foundational types shared by the API client and the
//! command line front-end:
//!
//! - **Identifiers**: `AccountId` (the customer's matrícula)
//! - **Customers**: `Customer`
//! - **Bills**: `Bill`, `BillDetail`, `BillStatus`, `StatusFilter`, `PixPayment`
//! - **Consumption**: `ConsumptionRecord`, `ConsumptionStats`, `LastReading`
//! - **Formatting**: pt-BR currency, date and document helpers
//!
//! Field names on the wire are Portuguese camelCase; the Rust structs keep
//! snake_case names and rename on (de)serialization.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bill;
pub mod consumption;
pub mod customer;
pub mod format;
pub mod ids;

pub use bill::{Bill, BillDetail, BillStatus, ChargeBreakdown, MeterReading, PixPayment, StatusFilter};
pub use consumption::{ConsumptionRecord, ConsumptionStats, LastReading};
pub use customer::Customer;
pub use format::{format_currency, format_date, mask_document};
pub use ids::{AccountId, IdError};
