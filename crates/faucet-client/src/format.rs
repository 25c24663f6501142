//! Display formatting for amounts, balances and timestamps

use crate::types::{FaucetInfo, TokenAmount};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a server timestamp (RFC 3339, or a naive ISO-8601 time taken as UTC)
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Token amount truncated to an integer with thousands separators.
/// Missing amounts render as `0`; non-numeric text is returned verbatim.
pub fn format_token_amount(amount: Option<&TokenAmount>) -> String {
    let numeric = match amount {
        None => return "0".to_string(),
        Some(TokenAmount::Number(value)) => Some(*value),
        Some(TokenAmount::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
    };

    match (numeric, amount) {
        (Some(value), _) if value.is_finite() => group_thousands(value.trunc() as i128),
        (_, Some(TokenAmount::Text(text))) => text.clone(),
        (_, Some(TokenAmount::Number(value))) => value.to_string(),
        (_, None) => "0".to_string(),
    }
}

/// Faucet balance with two decimals and the token symbol, `-` when unparseable
pub fn format_balance(info: &FaucetInfo) -> String {
    match info.balance() {
        Some(balance) => format!("{:.2} {}", balance, info.token_symbol),
        None => "-".to_string(),
    }
}

/// Human-readable timestamp (UTC), `-` when empty or unparseable
pub fn format_time(value: &str) -> String {
    match parse_timestamp(value) {
        Some(time) => time.format("%m/%d/%Y, %I:%M %p").to_string(),
        None => "-".to_string(),
    }
}

fn group_thousands(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
