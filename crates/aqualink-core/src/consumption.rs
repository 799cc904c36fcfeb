//! Consumption history and statistics.

use serde::{Deserialize, Serialize};

/// Consumption for a single billing month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Month (`"05"`).
    #[serde(rename = "mes")]
    pub month: String,
    /// Year (`"2023"`).
    #[serde(rename = "ano")]
    pub year: String,
    /// Reference period (`"05/2023"`).
    #[serde(rename = "referencia")]
    pub reference: String,
    /// Consumed volume in cubic meters.
    #[serde(rename = "consumo")]
    pub volume: f64,
}

/// Summary statistics over a consumption series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionStats {
    /// Mean monthly consumption.
    #[serde(rename = "medio")]
    pub average: f64,
    /// Consumption of the latest entry in the series.
    #[serde(rename = "atual")]
    pub current: f64,
}

impl ConsumptionStats {
    /// Compute statistics from a history series.
    ///
    /// `current` is the volume of the last element of the series as the
    /// server ordered it. An empty series yields zeros.
    #[must_use]
    pub fn from_history(history: &[ConsumptionRecord]) -> Self {
        let Some(last) = history.last() else {
            return Self {
                average: 0.0,
                current: 0.0,
            };
        };

        let sum: f64 = history.iter().map(|r| r.volume).sum();
        #[allow(clippy::cast_precision_loss)]
        let average = sum / history.len() as f64;

        Self {
            average,
            current: last.volume,
        }
    }
}

/// The most recent meter reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastReading {
    /// Volume consumed since the previous reading.
    #[serde(rename = "valor")]
    pub volume: f64,
    /// Reading date (`dd/mm/yyyy`).
    #[serde(rename = "data")]
    pub date: String,
    /// Previous meter value.
    #[serde(rename = "leituraAnterior")]
    pub previous: f64,
    /// Current meter value.
    #[serde(rename = "leituraAtual")]
    pub current: f64,
}
