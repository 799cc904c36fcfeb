//! pt-BR display helpers.

/// Month names used by [`format_date`].
const MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Format an amount in reais as Brazilian currency, e.g. `R$ 1.234,50`.
#[must_use]
pub fn format_currency(value: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let cents = (value.abs() * 100.0).round() as u64;
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac:02}")
}

/// Format a `dd/mm/yyyy` date as `dd de <Mês> de yyyy`.
///
/// Input that does not have that shape is returned unchanged.
#[must_use]
pub fn format_date(date: &str) -> String {
    let mut parts = date.split('/');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return date.to_string();
    };

    match month.parse::<usize>() {
        Ok(m @ 1..=12) => format!("{day} de {} de {year}", MONTHS[m - 1]),
        _ => date.to_string(),
    }
}

/// Mask a CPF (11 digits) or CNPJ (14 digits).
///
/// Anything else, including documents the server already masked, is
/// returned unchanged.
#[must_use]
pub fn mask_document(document: &str) -> String {
    if !document.chars().all(|c| c.is_ascii_digit()) {
        return document.to_string();
    }

    match document.len() {
        11 => format!("{}.***.{}-**", &document[..3], &document[6..9]),
        14 => format!("{}.***.***/****-**", &document[..2]),
        _ => document.to_string(),
    }
}
