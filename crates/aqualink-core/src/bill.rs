//! Bill (fatura) records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment status of a single bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Not yet paid.
    Aberto,
    /// Paid.
    Pago,
}

impl BillStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aberto => "aberto",
            Self::Pago => "pago",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status filter accepted by the bill list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Only open bills.
    Aberto,
    /// Only paid bills.
    Pago,
    /// Every bill.
    #[default]
    Todos,
}

impl StatusFilter {
    /// Query string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aberto => "aberto",
            Self::Pago => "pago",
            Self::Todos => "todos",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aberto" => Ok(Self::Aberto),
            "pago" => Ok(Self::Pago),
            "todos" => Ok(Self::Todos),
            other => Err(format!("unknown bill status filter: {other}")),
        }
    }
}

/// A bill as listed by the `faturas` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Bill code.
    pub id: String,
    /// Installment number.
    #[serde(rename = "parcela")]
    pub installment: u32,
    /// Account the bill belongs to.
    #[serde(rename = "matricula")]
    pub account: String,
    /// Amount due, in reais.
    #[serde(rename = "valor")]
    pub amount: f64,
    /// Due date (`dd/mm/yyyy`).
    #[serde(rename = "dataVencimento")]
    pub due_date: String,
    /// Issue date (`dd/mm/yyyy`).
    #[serde(rename = "dataEmissao")]
    pub issue_date: String,
    /// Payment status.
    pub status: BillStatus,
    /// Reference period (`mm/yyyy`).
    #[serde(rename = "referencia")]
    pub reference: String,
}

impl Bill {
    /// Whether the bill is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == BillStatus::Aberto
    }
}

/// Meter reading attached to a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// Consumed volume in cubic meters.
    #[serde(rename = "metros")]
    pub cubic_meters: f64,
    /// Previous meter reading.
    #[serde(rename = "leituraAnterior")]
    pub previous: f64,
    /// Current meter reading.
    #[serde(rename = "leituraAtual")]
    pub current: f64,
    /// Reading date (`dd/mm/yyyy`).
    #[serde(rename = "dataLeitura")]
    pub read_on: String,
}

/// Breakdown of the billed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    /// Water charge.
    #[serde(rename = "valorAgua")]
    pub water: f64,
    /// Sewage charge.
    #[serde(rename = "valorEsgoto")]
    pub sewage: f64,
    /// Other services.
    #[serde(rename = "valorServicos")]
    pub services: f64,
}

impl ChargeBreakdown {
    /// Sum of all charges.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.water + self.sewage + self.services
    }
}

/// PIX payment data for a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixPayment {
    /// Payload encoded in the QR code.
    #[serde(rename = "qrCode")]
    pub qr_code: String,
    /// Copy-and-paste payment key.
    #[serde(rename = "chaveCopiaCola")]
    pub copy_paste: String,
    /// Whether PIX payment is currently accepted for this bill.
    #[serde(rename = "disponivel")]
    pub available: bool,
}

/// Full bill detail, as returned by `faturas/{id}/{parcela}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDetail {
    /// The listing fields.
    #[serde(flatten)]
    pub bill: Bill,
    /// Free-text description.
    #[serde(rename = "descricao")]
    pub description: String,
    /// Meter reading for the billed period.
    #[serde(rename = "consumo")]
    pub reading: MeterReading,
    /// Charge breakdown.
    #[serde(rename = "detalhamento")]
    pub charges: ChargeBreakdown,
    /// PIX payment data, when offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix: Option<PixPayment>,
}

impl BillDetail {
    /// The PIX copy-and-paste code, if PIX is available for this bill.
    #[must_use]
    pub fn pix_code(&self) -> Option<&str> {
        self.pix
            .as_ref()
            .filter(|pix| pix.available)
            .map(|pix| pix.copy_paste.as_str())
    }
}
