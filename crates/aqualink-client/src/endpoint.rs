//! Endpoint paths of the portal's mobile API.

use std::fmt::Write;

use aqualink_core::{AccountId, StatusFilter};

const CLIENTS: &str = "/api/mobile/clientes";

/// A logical API operation, resolved to a path plus optional query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Basic customer data.
    ClientData {
        /// Customer account.
        account: AccountId,
    },
    /// Bill list.
    Bills {
        /// Customer account.
        account: AccountId,
        /// Maximum number of bills.
        limit: Option<u32>,
        /// Status filter.
        status: Option<StatusFilter>,
    },
    /// A single bill installment.
    BillDetail {
        /// Customer account.
        account: AccountId,
        /// Bill code.
        bill_id: String,
        /// Installment number.
        installment: u32,
    },
    /// Consumption history.
    Consumption {
        /// Customer account.
        account: AccountId,
        /// Maximum number of months.
        limit: Option<u32>,
    },
}

impl Endpoint {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ClientData { .. } => "client_data",
            Self::Bills { .. } => "bills",
            Self::BillDetail { .. } => "bill_detail",
            Self::Consumption { .. } => "consumption",
        }
    }

    /// Path and query string, relative to a server base URL.
    ///
    /// A limit of zero is treated as "no limit" and omitted.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::ClientData { account } => format!("{CLIENTS}/{account}/dados-basicos"),
            Self::Bills {
                account,
                limit,
                status,
            } => {
                let mut path = format!("{CLIENTS}/{account}/faturas");
                let mut query = Vec::new();
                if let Some(limit) = limit.filter(|l| *l > 0) {
                    query.push(format!("limit={limit}"));
                }
                if let Some(status) = status {
                    query.push(format!("status={status}"));
                }
                if !query.is_empty() {
                    path.push('?');
                    path.push_str(&query.join("&"));
                }
                path
            }
            Self::BillDetail {
                account,
                bill_id,
                installment,
            } => format!(
                "{CLIENTS}/{account}/faturas/{}/{installment}",
                encode_segment(bill_id)
            ),
            Self::Consumption { account, limit } => {
                let mut path = format!("{CLIENTS}/{account}/consumo");
                if let Some(limit) = limit.filter(|l| *l > 0) {
                    write!(&mut path, "?limite={limit}").ok();
                }
                path
            }
        }
    }
}

/// Percent-encode a path segment, leaving RFC 3986 unreserved bytes as-is.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            write!(&mut out, "%{byte:02X}").ok();
        }
    }
    out
}
