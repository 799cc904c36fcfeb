//! Customer profile data.

use serde::{Deserialize, Serialize};

/// Basic customer data returned by the `dados-basicos` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Account number, as reported by the server.
    #[serde(rename = "matricula")]
    pub account: String,
    /// Customer name.
    #[serde(rename = "nome")]
    pub name: String,
    /// Service address.
    #[serde(rename = "endereco")]
    pub address: String,
    /// Tax document (CPF/CNPJ), usually already partially masked upstream.
    #[serde(rename = "documento")]
    pub document: String,
}
