//! Plain-text rendering of portal data.

use std::fmt::Write;

use aqualink_client::{BillsResponse, ConsumptionResponse};
use aqualink_core::{format_currency, format_date, mask_document, BillDetail, Customer};

/// Render the customer profile.
#[must_use]
pub fn customer(customer: &Customer) -> String {
    format!(
        "{}\nMatrícula: {}\nDocumento: {}\nEndereço:  {}\n",
        customer.name,
        customer.account,
        mask_document(&customer.document),
        customer.address,
    )
}

/// Render a bill list, one line per bill.
#[must_use]
pub fn bills(response: &BillsResponse) -> String {
    if response.bills.is_empty() {
        return "Nenhuma fatura encontrada.\n".to_string();
    }

    let mut out = String::new();
    for bill in &response.bills {
        let _ = writeln!(
            out,
            "{:<10} {:>3}  {:<8}  {:>14}  vence {}  {}",
            bill.id,
            bill.installment,
            bill.reference,
            format_currency(bill.amount),
            format_date(&bill.due_date),
            bill.status,
        );
    }
    if response.total > response.count {
        let _ = writeln!(out, "({} de {} faturas)", response.count, response.total);
    }
    out
}

/// Render one bill with its charges and payment code.
#[must_use]
pub fn bill_detail(detail: &BillDetail) -> String {
    let bill = &detail.bill;
    let mut out = String::new();

    let _ = writeln!(out, "Fatura {}/{} ({})", bill.id, bill.installment, bill.reference);
    let _ = writeln!(out, "{}", detail.description);
    let _ = writeln!(out, "Emissão:    {}", format_date(&bill.issue_date));
    let _ = writeln!(out, "Vencimento: {}", format_date(&bill.due_date));
    let _ = writeln!(out, "Situação:   {}", bill.status);
    let _ = writeln!(
        out,
        "Consumo:    {} m³ (leitura {} -> {} em {})",
        detail.reading.cubic_meters,
        detail.reading.previous,
        detail.reading.current,
        format_date(&detail.reading.read_on),
    );
    let _ = writeln!(out, "  Água:     {}", format_currency(detail.charges.water));
    let _ = writeln!(out, "  Esgoto:   {}", format_currency(detail.charges.sewage));
    let _ = writeln!(out, "  Serviços: {}", format_currency(detail.charges.services));
    let _ = writeln!(out, "Total:      {}", format_currency(bill.amount));

    if bill.is_open() {
        match detail.pix_code() {
            Some(code) => {
                let _ = writeln!(out, "PIX copia e cola:\n{code}");
            }
            None => {
                let _ = writeln!(out, "PIX indisponível para esta fatura.");
            }
        }
    }
    out
}

/// Render the consumption history with its statistics.
#[must_use]
pub fn consumption(response: &ConsumptionResponse) -> String {
    let mut out = String::new();

    for record in &response.history {
        let _ = writeln!(out, "{:<8} {:>8.1} m³", record.reference, record.volume);
    }

    let stats = response.statistics();
    let _ = writeln!(out, "Média: {:.1} m³  Atual: {:.1} m³", stats.average, stats.current);

    if let Some(reading) = &response.last_reading {
        let _ = writeln!(
            out,
            "Última leitura: {} ({} m³)",
            format_date(&reading.date),
            reading.volume,
        );
    }
    if let Some(message) = &response.message {
        let _ = writeln!(out, "{message}");
    }
    out
}
