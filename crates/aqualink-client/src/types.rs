//! Response envelopes for the portal API.
//!
//! Every response is an object with a boolean `success` and a
//! resource-specific payload. Decoding is strict: a payload that does not
//! match these shapes is a malformed response, not something to search for.

use serde::{Deserialize, Serialize};

use aqualink_core::{Bill, BillDetail, ConsumptionRecord, ConsumptionStats, Customer, LastReading};

/// Response of the `dados-basicos` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDataResponse {
    /// Success flag.
    pub success: bool,
    /// Customer data.
    #[serde(rename = "cliente")]
    pub customer: Customer,
}

/// Response of the `faturas` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillsResponse {
    /// Success flag.
    pub success: bool,
    /// Number of bills in this page.
    #[serde(default)]
    pub count: u32,
    /// Total number of bills for the account.
    #[serde(default)]
    pub total: u32,
    /// The bills.
    #[serde(rename = "faturas")]
    pub bills: Vec<Bill>,
}

/// Response of the `faturas/{id}/{parcela}` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDetailsResponse {
    /// Success flag.
    pub success: bool,
    /// The bill.
    #[serde(rename = "fatura")]
    pub bill: BillDetail,
}

/// Response of the `consumo` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionResponse {
    /// Success flag.
    pub success: bool,
    /// Monthly history.
    #[serde(rename = "consumo")]
    pub history: Vec<ConsumptionRecord>,
    /// Server-computed statistics, when provided.
    #[serde(
        rename = "estatisticas",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stats: Option<ConsumptionStats>,
    /// Latest meter reading, when provided.
    #[serde(
        rename = "ultimaLeitura",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_reading: Option<LastReading>,
    /// Informational message from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConsumptionResponse {
    /// Statistics for the history: the server's if present, otherwise
    /// computed from the series.
    #[must_use]
    pub fn statistics(&self) -> ConsumptionStats {
        self.stats
            .unwrap_or_else(|| ConsumptionStats::from_history(&self.history))
    }
}
